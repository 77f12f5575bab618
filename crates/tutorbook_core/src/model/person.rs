//! Person domain model.
//!
//! # Responsibility
//! - Define the role-tagged person entity shared by students, tutors and
//!   parents.
//! - Hold role-specific relationship edges as id lists.
//!
//! # Invariants
//! - `id` is generated once and never reused for another person.
//! - Role is fixed at creation; role changes replace the entity.
//! - Edge lists never contain the same id twice.
//! - Edges are only written by `AddressBook`; callers get read-only slices.

use crate::model::contact::{Address, Email, Phone, Tag};
use crate::model::name::PersonName;
use crate::model::tuition_class::ClassId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a person inside one address book.
pub type PersonId = Uuid;

/// Role tag of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Tutor,
    Parent,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Tutor => "tutor",
            Self::Parent => "parent",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contact data of a person. `name` is the identity key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonProfile {
    pub name: PersonName,
    pub phone: Phone,
    pub email: Email,
    pub address: Address,
    pub tags: BTreeSet<Tag>,
}

impl PersonProfile {
    pub fn new(
        name: PersonName,
        phone: Phone,
        email: Email,
        address: Address,
        tags: impl IntoIterator<Item = Tag>,
    ) -> Self {
        Self {
            name,
            phone,
            email,
            address,
            tags: tags.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum RoleLinks {
    Student {
        parents: Vec<PersonId>,
        classes: Vec<ClassId>,
    },
    Tutor {
        classes: Vec<ClassId>,
    },
    Parent {
        children: Vec<PersonId>,
    },
}

impl RoleLinks {
    fn empty(role: Role) -> Self {
        match role {
            Role::Student => Self::Student {
                parents: Vec::new(),
                classes: Vec::new(),
            },
            Role::Tutor => Self::Tutor {
                classes: Vec::new(),
            },
            Role::Parent => Self::Parent {
                children: Vec::new(),
            },
        }
    }
}

/// Person entity.
///
/// Equality compares role and every profile field; `id` and edges are not
/// part of it. Use [`Person::is_same_person`] for identity comparison.
#[derive(Debug, Clone)]
pub struct Person {
    id: PersonId,
    profile: PersonProfile,
    links: RoleLinks,
}

impl Person {
    /// Creates a person with a generated id and no relationships.
    pub(crate) fn new(role: Role, profile: PersonProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile,
            links: RoleLinks::empty(role),
        }
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn role(&self) -> Role {
        match self.links {
            RoleLinks::Student { .. } => Role::Student,
            RoleLinks::Tutor { .. } => Role::Tutor,
            RoleLinks::Parent { .. } => Role::Parent,
        }
    }

    pub fn profile(&self) -> &PersonProfile {
        &self.profile
    }

    pub fn name(&self) -> &PersonName {
        &self.profile.name
    }

    /// Identity comparison: name only, regardless of role.
    pub fn is_same_person(&self, other: &Person) -> bool {
        self.profile.name == other.profile.name
    }

    /// Parents of a student. Empty for other roles.
    pub fn parents(&self) -> &[PersonId] {
        match &self.links {
            RoleLinks::Student { parents, .. } => parents,
            _ => &[],
        }
    }

    /// Children of a parent. Empty for other roles.
    pub fn children(&self) -> &[PersonId] {
        match &self.links {
            RoleLinks::Parent { children } => children,
            _ => &[],
        }
    }

    /// Classes a student is enrolled in, or a tutor teaches. Empty for parents.
    pub fn classes(&self) -> &[ClassId] {
        match &self.links {
            RoleLinks::Student { classes, .. } | RoleLinks::Tutor { classes } => classes,
            RoleLinks::Parent { .. } => &[],
        }
    }

    pub(crate) fn set_profile(&mut self, profile: PersonProfile) {
        self.profile = profile;
    }

    pub(crate) fn add_parent(&mut self, parent: PersonId) -> bool {
        match &mut self.links {
            RoleLinks::Student { parents, .. } => push_unique(parents, parent),
            _ => false,
        }
    }

    pub(crate) fn remove_parent(&mut self, parent: PersonId) -> bool {
        match &mut self.links {
            RoleLinks::Student { parents, .. } => remove_id(parents, parent),
            _ => false,
        }
    }

    pub(crate) fn add_child(&mut self, child: PersonId) -> bool {
        match &mut self.links {
            RoleLinks::Parent { children } => push_unique(children, child),
            _ => false,
        }
    }

    pub(crate) fn remove_child(&mut self, child: PersonId) -> bool {
        match &mut self.links {
            RoleLinks::Parent { children } => remove_id(children, child),
            _ => false,
        }
    }

    pub(crate) fn add_class(&mut self, class: ClassId) -> bool {
        match &mut self.links {
            RoleLinks::Student { classes, .. } | RoleLinks::Tutor { classes } => {
                push_unique(classes, class)
            }
            RoleLinks::Parent { .. } => false,
        }
    }

    pub(crate) fn remove_class(&mut self, class: ClassId) -> bool {
        match &mut self.links {
            RoleLinks::Student { classes, .. } | RoleLinks::Tutor { classes } => {
                remove_id(classes, class)
            }
            RoleLinks::Parent { .. } => false,
        }
    }
}

impl PartialEq for Person {
    fn eq(&self, other: &Self) -> bool {
        self.role() == other.role() && self.profile == other.profile
    }
}

impl Eq for Person {}

impl Display for Person {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}); Phone: {}; Email: {}; Address: {}; Tags: ",
            self.profile.name,
            self.role(),
            self.profile.phone.as_str(),
            self.profile.email.as_str(),
            self.profile.address.as_str()
        )?;
        for tag in &self.profile.tags {
            write!(f, "{tag}")?;
        }
        Ok(())
    }
}

fn push_unique(ids: &mut Vec<Uuid>, id: Uuid) -> bool {
    if ids.contains(&id) {
        return false;
    }
    ids.push(id);
    true
}

fn remove_id(ids: &mut Vec<Uuid>, id: Uuid) -> bool {
    let before = ids.len();
    ids.retain(|existing| *existing != id);
    ids.len() != before
}
