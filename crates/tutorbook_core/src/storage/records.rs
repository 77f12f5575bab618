//! Flat file records and the save-side flattening.
//!
//! # Responsibility
//! - Define the serde shape of the book file.
//! - Flatten a live `AddressBook` into records (pure, no I/O).
//!
//! # Invariants
//! - Relationships are written by identity key (person name, class name).
//! - `presentStudents` / `absentStudents` are derived from the live ledger;
//!   unmarked entries are written as absent.
//! - Optional extension fields are omitted when empty so files stay readable
//!   by the legacy encoding.

use crate::book::AddressBook;
use crate::model::person::{Person, Role};
use crate::model::session::{format_session_date_time, ClassSession};
use crate::model::tuition_class::TuitionClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level file record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookFile {
    #[serde(default)]
    pub persons: Vec<PersonRecord>,
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Serialized as `type` to match the file schema.
    #[serde(rename = "type")]
    pub role: Role,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Student names; only meaningful for parents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

/// Person reference inside a class record: a full record or a bare name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersonRef {
    Name(String),
    Record(PersonRecord),
}

impl PersonRef {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Record(record) => &record.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tutor: Option<PersonRef>,
    #[serde(default)]
    pub students: Vec<PersonRef>,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub session_name: String,
    pub date_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default)]
    pub present_students: Vec<String>,
    #[serde(default)]
    pub absent_students: Vec<String>,
    /// Student name -> time of the latest mark.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub marked_at: BTreeMap<String, String>,
}

impl BookFile {
    /// Flattens a book into file records.
    pub fn from_book(book: &AddressBook) -> Self {
        let persons = book
            .persons()
            .iter()
            .map(|person| person_record(book, person, true))
            .collect();
        let classes = book
            .classes()
            .iter()
            .map(|class| class_record(book, class))
            .collect();
        Self { persons, classes }
    }
}

fn person_record(book: &AddressBook, person: &Person, with_children: bool) -> PersonRecord {
    let profile = person.profile();
    let children = if with_children {
        person
            .children()
            .iter()
            .filter_map(|id| book.person_by_id(*id))
            .map(|child| child.name().as_str().to_string())
            .collect()
    } else {
        Vec::new()
    };

    PersonRecord {
        role: person.role(),
        name: profile.name.as_str().to_string(),
        phone: profile.phone.as_str().to_string(),
        email: profile.email.as_str().to_string(),
        address: profile.address.as_str().to_string(),
        tags: profile
            .tags
            .iter()
            .map(|tag| tag.as_str().to_string())
            .collect(),
        children,
    }
}

fn embedded_person(book: &AddressBook, id: uuid::Uuid) -> Option<PersonRef> {
    book.person_by_id(id)
        .map(|person| PersonRef::Record(person_record(book, person, false)))
}

fn class_record(book: &AddressBook, class: &TuitionClass) -> ClassRecord {
    ClassRecord {
        name: class.name().as_str().to_string(),
        tutor: class.tutor().and_then(|id| embedded_person(book, id)),
        students: class
            .students()
            .iter()
            .filter_map(|id| embedded_person(book, *id))
            .collect(),
        sessions: class
            .sessions()
            .iter()
            .map(|session| session_record(book, session))
            .collect(),
    }
}

fn session_record(book: &AddressBook, session: &ClassSession) -> SessionRecord {
    let mut present_students = Vec::new();
    let mut absent_students = Vec::new();
    let mut marked_at = BTreeMap::new();

    for (student, attendance) in session.attendance().entries() {
        let Some(person) = book.person_by_id(student) else {
            continue;
        };
        let name = person.name().as_str().to_string();
        if let Some(at) = attendance.marked_at() {
            marked_at.insert(name.clone(), format_session_date_time(&at));
        }
        if attendance.is_present() {
            present_students.push(name);
        } else {
            absent_students.push(name);
        }
    }

    SessionRecord {
        session_name: session.name().as_str().to_string(),
        date_time: format_session_date_time(&session.date_time()),
        location: session.location().map(str::to_string),
        remarks: session.remarks().map(str::to_string),
        present_students,
        absent_students,
        marked_at,
    }
}
