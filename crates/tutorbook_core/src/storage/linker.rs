//! Two-phase reconstruction of an `AddressBook` from file records.
//!
//! # Responsibility
//! - Phase 1: materialize every person and class (name only), rejecting
//!   duplicate identities before any relationship is attempted.
//! - Phase 2: resolve relationships by identity key, per class in order:
//!   tutor, sessions (with attendance replay), student enrollments. Parent
//!   links are resolved last.
//!
//! # Invariants
//! - Loading builds a fresh book; any error drops it, so callers never see a
//!   partially linked graph.
//! - Every reference must resolve to a person of the expected role.
//! - A student appears at most once per session ledger, and every `markedAt`
//!   key names a listed student.

use crate::book::AddressBook;
use crate::model::attendance::Attendance;
use crate::model::contact::{Address, Email, Phone, Tag};
use crate::model::name::{ClassName, PersonName, SessionName};
use crate::model::person::{PersonId, PersonProfile, Role};
use crate::model::session::{parse_session_date_time, SessionDetails};
use crate::model::validation::ValidationError;
use crate::storage::records::{BookFile, ClassRecord, PersonRecord, SessionRecord};
use crate::storage::{StorageError, StorageResult};
use std::collections::{HashMap, HashSet};

/// Identity table built in phase 1.
struct PersonTable {
    entries: HashMap<PersonName, (PersonId, Role)>,
}

impl PersonTable {
    /// Resolves `name`, requiring `expected` role.
    fn resolve(
        &self,
        name: &str,
        expected: Role,
        referenced_by: &str,
    ) -> StorageResult<(PersonName, PersonId)> {
        let unresolved = || StorageError::UnresolvedPerson {
            name: name.to_string(),
            referenced_by: referenced_by.to_string(),
        };
        let key = PersonName::new(name).map_err(|_| unresolved())?;
        let (id, role) = *self.entries.get(&key).ok_or_else(unresolved)?;
        if role != expected {
            return Err(StorageError::RoleMismatch {
                name: key.as_str().to_string(),
                expected,
                actual: role,
            });
        }
        Ok((key, id))
    }
}

/// Rebuilds a linked book from parsed file records.
pub fn link_book(file: &BookFile) -> StorageResult<AddressBook> {
    let mut book = AddressBook::new();

    // Phase 1: entities only.
    let mut people = PersonTable {
        entries: HashMap::with_capacity(file.persons.len()),
    };
    for record in &file.persons {
        let profile = profile_from_record(record)?;
        if people.entries.contains_key(&profile.name) {
            return Err(StorageError::DuplicatePerson(
                profile.name.as_str().to_string(),
            ));
        }
        let name = profile.name.clone();
        let id = book.add_person(record.role, profile)?;
        people.entries.insert(name, (id, record.role));
    }

    let mut class_names = Vec::with_capacity(file.classes.len());
    let mut seen_classes = HashSet::with_capacity(file.classes.len());
    for record in &file.classes {
        let name = ClassName::new(&record.name)?;
        if !seen_classes.insert(name.clone()) {
            return Err(StorageError::DuplicateClass(name.as_str().to_string()));
        }
        book.add_class(name.clone())?;
        class_names.push(name);
    }

    // Phase 2: relationships.
    for (record, class) in file.classes.iter().zip(&class_names) {
        link_class(&mut book, &people, record, class)?;
    }
    for record in &file.persons {
        link_children(&mut book, &people, record)?;
    }

    Ok(book)
}

fn profile_from_record(record: &PersonRecord) -> Result<PersonProfile, ValidationError> {
    let tags = record
        .tags
        .iter()
        .map(Tag::new)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PersonProfile::new(
        PersonName::new(&record.name)?,
        Phone::new(&record.phone)?,
        Email::new(&record.email)?,
        Address::new(&record.address)?,
        tags,
    ))
}

fn link_class(
    book: &mut AddressBook,
    people: &PersonTable,
    record: &ClassRecord,
    class: &ClassName,
) -> StorageResult<()> {
    let context = format!("class {class}");

    if let Some(tutor) = &record.tutor {
        let (tutor, _) = people.resolve(tutor.name(), Role::Tutor, &context)?;
        book.assign_tutor(&tutor, class)?;
    }

    for session in &record.sessions {
        link_session(book, people, session, class)?;
    }

    for student in &record.students {
        let (student, _) = people.resolve(student.name(), Role::Student, &context)?;
        book.enroll_student(&student, class)?;
    }
    Ok(())
}

fn link_session(
    book: &mut AddressBook,
    people: &PersonTable,
    record: &SessionRecord,
    class: &ClassName,
) -> StorageResult<()> {
    let name = SessionName::new(&record.session_name)?;
    let date_time = parse_session_date_time(&record.date_time)?;
    let mut details = SessionDetails::new(name.clone(), date_time);
    if let Some(location) = &record.location {
        details = details.with_location(location.as_str());
    }
    if let Some(remarks) = &record.remarks {
        details = details.with_remarks(remarks.as_str());
    }
    book.add_session(class, details)?;

    let context = format!("session {name} of class {class}");
    let mut listed = HashSet::with_capacity(
        record.present_students.len() + record.absent_students.len(),
    );
    let marks = record
        .present_students
        .iter()
        .map(|student| (student, true))
        .chain(record.absent_students.iter().map(|student| (student, false)));
    for (student, present) in marks {
        let (key, student_id) = people.resolve(student, Role::Student, &context)?;
        if !listed.insert(key) {
            return Err(StorageError::ConflictingAttendance {
                student: student.clone(),
                session: context,
            });
        }
        let marked_at = record
            .marked_at
            .get(student.as_str())
            .map(|value| parse_session_date_time(value))
            .transpose()?;
        let attendance = Attendance::new(present, marked_at);
        book.restore_attendance(class, &name, student_id, attendance)?;
    }

    for student in record.marked_at.keys() {
        let known = PersonName::new(student).is_ok_and(|key| listed.contains(&key));
        if !known {
            return Err(StorageError::UnresolvedPerson {
                name: student.clone(),
                referenced_by: format!("markedAt of {context}"),
            });
        }
    }
    Ok(())
}

fn link_children(
    book: &mut AddressBook,
    people: &PersonTable,
    record: &PersonRecord,
) -> StorageResult<()> {
    if record.children.is_empty() {
        return Ok(());
    }
    let context = format!("parent {}", record.name);
    let (parent, _) = people.resolve(&record.name, Role::Parent, &context)?;
    for child in &record.children {
        let (child, _) = people.resolve(child, Role::Student, &context)?;
        book.link_parent_child(&parent, &child)?;
    }
    Ok(())
}
