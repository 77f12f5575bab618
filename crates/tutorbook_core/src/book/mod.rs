//! Address book: the canonical people/class graph.
//!
//! # Responsibility
//! - Own the unique person and class collections.
//! - Be the only writer of relationship edges (see `relations`) and of
//!   session attendance (see `sessions`).
//!
//! # Invariants
//! - Identity keys are unique per collection.
//! - Every student/parent, student/class and tutor/class edge is
//!   stored on both ends, or on neither.
//! - Every public mutation validates first and writes second, so an error
//!   leaves the graph unchanged.

pub mod error;
mod relations;
mod sessions;
pub mod unique_list;

use crate::book::error::{BookError, BookResult};
use crate::book::unique_list::{Identified, ListChange, SubscriptionId, UniqueList};
use crate::model::attendance::Attendance;
use crate::model::name::{ClassName, PersonName};
use crate::model::person::{Person, PersonId, PersonProfile, Role};
use crate::model::session::SessionDetails;
use crate::model::tuition_class::{ClassId, TuitionClass};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

impl Identified for Person {
    type Key = PersonName;

    fn identity_key(&self) -> &PersonName {
        self.name()
    }

    fn entity_id(&self) -> Uuid {
        self.id()
    }
}

impl Identified for TuitionClass {
    type Key = ClassName;

    fn identity_key(&self) -> &ClassName {
        self.name()
    }

    fn entity_id(&self) -> Uuid {
        self.id()
    }
}

/// In-memory people/class graph.
///
/// Equality compares the graph by identity keys: persons (role and every
/// profile field), classes, all relationship edges, sessions and attendance.
/// Generated ids and insertion order of edge lists are ignored.
#[derive(Debug, Default)]
pub struct AddressBook {
    persons: UniqueList<Person>,
    classes: UniqueList<TuitionClass>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of all persons in insertion order.
    pub fn persons(&self) -> &UniqueList<Person> {
        &self.persons
    }

    /// Read-only view of all classes in insertion order.
    pub fn classes(&self) -> &UniqueList<TuitionClass> {
        &self.classes
    }

    pub fn person(&self, name: &PersonName) -> Option<&Person> {
        self.persons.get(name)
    }

    pub fn person_by_id(&self, id: PersonId) -> Option<&Person> {
        self.persons.get_by_id(id)
    }

    pub fn class(&self, name: &ClassName) -> Option<&TuitionClass> {
        self.classes.get(name)
    }

    pub fn class_by_id(&self, id: ClassId) -> Option<&TuitionClass> {
        self.classes.get_by_id(id)
    }

    pub fn has_person(&self, name: &PersonName) -> bool {
        self.persons.contains(name)
    }

    pub fn has_class(&self, name: &ClassName) -> bool {
        self.classes.contains(name)
    }

    /// Adds a new person with a fresh id and no edges.
    pub fn add_person(&mut self, role: Role, profile: PersonProfile) -> BookResult<PersonId> {
        let person = Person::new(role, profile);
        let id = person.id();
        self.persons.add(person)?;
        Ok(id)
    }

    /// Adds a new, empty class.
    pub fn add_class(&mut self, name: ClassName) -> BookResult<ClassId> {
        let class = TuitionClass::new(name);
        let id = class.id();
        self.classes.add(class)?;
        Ok(id)
    }

    /// Replaces the whole content with another book's graph.
    ///
    /// Subscribers of both collections receive `ListChange::Reset`.
    pub fn reset_data(&mut self, other: AddressBook) {
        let AddressBook { persons, classes } = other;
        // `other` already holds unique keys, so neither replace can fail.
        let _ = self.persons.replace_all(persons.into_items());
        let _ = self.classes.replace_all(classes.into_items());
    }

    pub fn subscribe_persons(
        &mut self,
        listener: impl FnMut(&ListChange, &[Person]) + 'static,
    ) -> SubscriptionId {
        self.persons.subscribe(listener)
    }

    pub fn subscribe_classes(
        &mut self,
        listener: impl FnMut(&ListChange, &[TuitionClass]) + 'static,
    ) -> SubscriptionId {
        self.classes.subscribe(listener)
    }

    pub fn unsubscribe_persons(&mut self, id: SubscriptionId) -> bool {
        self.persons.unsubscribe(id)
    }

    pub fn unsubscribe_classes(&mut self, id: SubscriptionId) -> bool {
        self.classes.unsubscribe(id)
    }

    /// Persons whose name contains any keyword as a whole word, ignoring case.
    pub fn find_persons(&self, keywords: &[&str]) -> Vec<&Person> {
        let keywords = keywords
            .iter()
            .map(|keyword| keyword.trim().to_lowercase())
            .filter(|keyword| !keyword.is_empty())
            .collect::<Vec<_>>();
        self.persons
            .iter()
            .filter(|person| {
                let name = person.name().as_str().to_lowercase();
                name.split_whitespace()
                    .any(|word| keywords.iter().any(|keyword| keyword == word))
            })
            .collect()
    }

    /// Students on the class roster, resolved to entities.
    pub fn students_of(&self, class: &ClassName) -> BookResult<Vec<&Person>> {
        let class = self.require_class(class)?;
        Ok(class
            .students()
            .iter()
            .filter_map(|id| self.persons.get_by_id(*id))
            .collect())
    }

    /// Classes a student attends or a tutor teaches, resolved to entities.
    pub fn classes_of(&self, person: &PersonName) -> BookResult<Vec<&TuitionClass>> {
        let person = self
            .persons
            .get(person)
            .ok_or_else(|| BookError::PersonNotFound(person.clone()))?;
        Ok(person
            .classes()
            .iter()
            .filter_map(|id| self.classes.get_by_id(*id))
            .collect())
    }

    fn require_class(&self, name: &ClassName) -> BookResult<&TuitionClass> {
        self.classes
            .get(name)
            .ok_or_else(|| BookError::ClassNotFound(name.clone()))
    }

    /// Looks up a person and checks their role.
    fn require_role(&self, name: &PersonName, expected: Role) -> BookResult<&Person> {
        let person = self
            .persons
            .get(name)
            .ok_or_else(|| BookError::PersonNotFound(name.clone()))?;
        if person.role() != expected {
            return Err(BookError::RoleMismatch {
                name: name.clone(),
                expected,
                actual: person.role(),
            });
        }
        Ok(person)
    }

    fn person_key(&self, id: PersonId) -> String {
        self.persons
            .get_by_id(id)
            .map(|person| person.name().as_str().to_string())
            .unwrap_or_else(|| format!("#{id}"))
    }

    fn class_key(&self, id: ClassId) -> String {
        self.classes
            .get_by_id(id)
            .map(|class| class.name().key().to_string())
            .unwrap_or_else(|| format!("#{id}"))
    }

    fn snapshot(&self) -> GraphSnapshot {
        let names = |ids: &[Uuid], key: &dyn Fn(Uuid) -> String| -> BTreeSet<String> {
            ids.iter().map(|id| key(*id)).collect()
        };
        let person_key = |id| self.person_key(id);
        let class_key = |id| self.class_key(id);

        let persons = self
            .persons
            .iter()
            .map(|person| {
                let snapshot = PersonSnapshot {
                    role: person.role(),
                    profile: person.profile().clone(),
                    parents: names(person.parents(), &person_key),
                    children: names(person.children(), &person_key),
                    classes: names(person.classes(), &class_key),
                };
                (person.name().as_str().to_string(), snapshot)
            })
            .collect();

        let classes = self
            .classes
            .iter()
            .map(|class| {
                let sessions = class
                    .sessions()
                    .iter()
                    .map(|session| {
                        let attendance = session
                            .attendance()
                            .entries()
                            .map(|(student, record)| (self.person_key(student), *record))
                            .collect();
                        (session.details().clone(), attendance)
                    })
                    .collect();
                let snapshot = ClassSnapshot {
                    display: class.name().as_str().to_string(),
                    tutor: class.tutor().map(|id| self.person_key(id)),
                    students: names(class.students(), &person_key),
                    sessions,
                };
                (class.name().key().to_string(), snapshot)
            })
            .collect();

        GraphSnapshot { persons, classes }
    }
}

impl PartialEq for AddressBook {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

#[derive(Debug, PartialEq)]
struct GraphSnapshot {
    persons: BTreeMap<String, PersonSnapshot>,
    classes: BTreeMap<String, ClassSnapshot>,
}

#[derive(Debug, PartialEq)]
struct PersonSnapshot {
    role: Role,
    profile: PersonProfile,
    parents: BTreeSet<String>,
    children: BTreeSet<String>,
    classes: BTreeSet<String>,
}

#[derive(Debug, PartialEq)]
struct ClassSnapshot {
    display: String,
    tutor: Option<String>,
    students: BTreeSet<String>,
    sessions: Vec<(SessionDetails, BTreeMap<String, Attendance>)>,
}
