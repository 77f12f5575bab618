//! Identity-unique, change-notifying list.
//!
//! # Responsibility
//! - Hold the canonical, insertion-ordered set of persons or classes.
//! - Reject any mutation that would put two equal identity keys side by side.
//! - Notify subscribers synchronously after every successful mutation.
//!
//! # Invariants
//! - No two elements share an identity key.
//! - Failed mutations leave the list untouched and fire no notification.
//! - Listeners run inside the mutating call, in subscription order.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use uuid::Uuid;

/// Element contract for [`UniqueList`].
pub trait Identified {
    type Key: Eq + Clone + Debug + Display;

    /// Key deciding whether two elements are "the same" entity.
    fn identity_key(&self) -> &Self::Key;

    /// Generated id, stable across identity edits.
    fn entity_id(&self) -> Uuid;
}

/// Container-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListError<K> {
    Duplicate(K),
    NotFound(K),
}

impl<K: Display> Display for ListError<K> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Duplicate(key) => write!(f, "an entry named `{key}` already exists"),
            Self::NotFound(key) => write!(f, "no entry named `{key}`"),
        }
    }
}

impl<K: Debug + Display> Error for ListError<K> {}

/// Mutation reported to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListChange {
    Added { index: usize },
    Updated { index: usize },
    Removed { index: usize },
    /// Whole content replaced.
    Reset,
}

/// Handle returned by [`UniqueList::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Box<dyn FnMut(&ListChange, &[T])>;

pub struct UniqueList<T: Identified> {
    items: Vec<T>,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_subscription: u64,
}

impl<T: Identified> Default for UniqueList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }
}

impl<T: Identified> UniqueList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Read-only view of the current content.
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.position(key).is_some()
    }

    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| item.identity_key() == key)
    }

    pub fn get_by_id(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.entity_id() == id)
    }

    pub fn position(&self, key: &T::Key) -> Option<usize> {
        self.items.iter().position(|item| item.identity_key() == key)
    }

    /// Appends an element whose identity key is not yet present.
    pub fn add(&mut self, item: T) -> Result<usize, ListError<T::Key>> {
        if self.contains(item.identity_key()) {
            return Err(ListError::Duplicate(item.identity_key().clone()));
        }
        self.items.push(item);
        let index = self.items.len() - 1;
        self.notify(ListChange::Added { index });
        Ok(index)
    }

    /// Replaces the element identified by `target` with `edited`, in place.
    ///
    /// `edited` may keep or change the identity key, but must not collide with
    /// a different element.
    pub fn set(&mut self, target: &T::Key, edited: T) -> Result<usize, ListError<T::Key>> {
        let index = self
            .position(target)
            .ok_or_else(|| ListError::NotFound(target.clone()))?;
        if let Some(other) = self.position(edited.identity_key()) {
            if other != index {
                return Err(ListError::Duplicate(edited.identity_key().clone()));
            }
        }
        self.items[index] = edited;
        self.notify(ListChange::Updated { index });
        Ok(index)
    }

    pub fn remove(&mut self, key: &T::Key) -> Result<T, ListError<T::Key>> {
        let index = self
            .position(key)
            .ok_or_else(|| ListError::NotFound(key.clone()))?;
        let removed = self.items.remove(index);
        self.notify(ListChange::Removed { index });
        Ok(removed)
    }

    /// Replaces the whole content. All-or-nothing: a duplicate inside `items`
    /// rejects the call and keeps the current content.
    pub fn replace_all(&mut self, items: Vec<T>) -> Result<(), ListError<T::Key>> {
        if let Some(duplicate) = first_duplicate(&items) {
            return Err(ListError::Duplicate(duplicate));
        }
        self.items = items;
        self.notify(ListChange::Reset);
        Ok(())
    }

    /// Registers a listener called after every successful mutation.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&ListChange, &[T]) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was registered under `id`.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Consumes the list, dropping its listeners.
    pub(crate) fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Mutates the element with `id` in place and reports it as updated.
    ///
    /// The closure must not change the identity key.
    pub(crate) fn update_by_id<R>(&mut self, id: Uuid, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let index = self.items.iter().position(|item| item.entity_id() == id)?;
        let result = f(&mut self.items[index]);
        self.notify(ListChange::Updated { index });
        Some(result)
    }

    fn notify(&mut self, change: ListChange) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change, &self.items);
        }
    }
}

impl<T: Identified + Debug> Debug for UniqueList<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UniqueList")
            .field("items", &self.items)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<'a, T: Identified> IntoIterator for &'a UniqueList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn first_duplicate<T: Identified>(items: &[T]) -> Option<T::Key> {
    items.iter().enumerate().find_map(|(index, item)| {
        items[..index]
            .iter()
            .any(|earlier| earlier.identity_key() == item.identity_key())
            .then(|| item.identity_key().clone())
    })
}
