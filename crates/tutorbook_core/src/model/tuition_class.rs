//! Tuition class domain model.
//!
//! # Responsibility
//! - Hold the class identity, its tutor edge, its roster and its sessions.
//!
//! # Invariants
//! - Identity is the case-insensitive `ClassName`.
//! - `students` never contains the same id twice.
//! - Session names are unique (case-sensitive) within the class.
//! - Edges are only written by `AddressBook`.

use crate::model::name::{ClassName, SessionName};
use crate::model::person::PersonId;
use crate::model::session::{ClassSession, SessionDetails};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier of a class inside one address book.
pub type ClassId = Uuid;

#[derive(Debug, Clone)]
pub struct TuitionClass {
    id: ClassId,
    name: ClassName,
    tutor: Option<PersonId>,
    students: Vec<PersonId>,
    sessions: Vec<ClassSession>,
}

impl TuitionClass {
    /// Creates an empty class with a generated id.
    pub fn new(name: ClassName) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            tutor: None,
            students: Vec::new(),
            sessions: Vec::new(),
        }
    }

    pub fn id(&self) -> ClassId {
        self.id
    }

    pub fn name(&self) -> &ClassName {
        &self.name
    }

    pub fn tutor(&self) -> Option<PersonId> {
        self.tutor
    }

    pub fn students(&self) -> &[PersonId] {
        &self.students
    }

    pub fn has_student(&self, student: PersonId) -> bool {
        self.students.contains(&student)
    }

    pub fn sessions(&self) -> &[ClassSession] {
        &self.sessions
    }

    pub fn session(&self, name: &SessionName) -> Option<&ClassSession> {
        self.sessions.iter().find(|session| session.name() == name)
    }

    pub fn has_session(&self, name: &SessionName) -> bool {
        self.session(name).is_some()
    }

    /// Identity comparison on the case-insensitive class name.
    pub fn is_same_class(&self, other: &TuitionClass) -> bool {
        self.name == other.name
    }

    pub(crate) fn set_name(&mut self, name: ClassName) {
        self.name = name;
    }

    pub(crate) fn set_tutor(&mut self, tutor: Option<PersonId>) {
        self.tutor = tutor;
    }

    pub(crate) fn add_student(&mut self, student: PersonId) -> bool {
        if self.has_student(student) {
            return false;
        }
        self.students.push(student);
        true
    }

    pub(crate) fn remove_student(&mut self, student: PersonId) -> bool {
        let before = self.students.len();
        self.students.retain(|id| *id != student);
        self.students.len() != before
    }

    /// Appends a session seeded from the current roster.
    ///
    /// Returns `None` when the name is already taken.
    pub(crate) fn push_session(&mut self, details: SessionDetails) -> Option<&mut ClassSession> {
        if self.has_session(&details.name) {
            return None;
        }
        let session = ClassSession::new(self.id, details, &self.students);
        self.sessions.push(session);
        self.sessions.last_mut()
    }

    pub(crate) fn session_mut(&mut self, name: &SessionName) -> Option<&mut ClassSession> {
        self.sessions
            .iter_mut()
            .find(|session| session.name() == name)
    }

    /// Removes a student's entries from every session ledger.
    pub(crate) fn forget_attendance(&mut self, student: PersonId) {
        for session in &mut self.sessions {
            session.attendance_mut().remove(student);
        }
    }

    pub(crate) fn remove_session(&mut self, name: &SessionName) -> Option<ClassSession> {
        let index = self
            .sessions
            .iter()
            .position(|session| session.name() == name)?;
        Some(self.sessions.remove(index))
    }
}

impl Display for TuitionClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{} students, {} sessions{}]",
            self.name,
            self.students.len(),
            self.sessions.len(),
            if self.tutor.is_some() { ", tutored" } else { "" }
        )
    }
}
