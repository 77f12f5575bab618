//! Session and attendance operations.
//!
//! # Responsibility
//! - Add, edit and delete sessions of a class.
//! - Mark and query per-student attendance.
//!
//! # Invariants
//! - Session names stay unique within a class, including after edits.
//! - New sessions snapshot the roster at creation time; later roster changes
//!   only reach a ledger through `reinitialize_attendance`.

use crate::book::error::{BookError, BookResult};
use crate::book::AddressBook;
use crate::model::attendance::Attendance;
use crate::model::name::{ClassName, PersonName, SessionName};
use crate::model::person::{PersonId, Role};
use crate::model::session::{ClassSession, SessionDetails};
use chrono::{Local, NaiveDateTime};

impl AddressBook {
    /// Adds a session whose ledger starts with every enrolled student unmarked.
    pub fn add_session(&mut self, class: &ClassName, details: SessionDetails) -> BookResult<()> {
        let class_entity = self.require_class(class)?;
        let class_id = class_entity.id();
        if class_entity.has_session(&details.name) {
            return Err(BookError::DuplicateSession {
                class: class_entity.name().clone(),
                session: details.name,
            });
        }

        self.classes.update_by_id(class_id, |c| {
            c.push_session(details);
        });
        Ok(())
    }

    pub fn delete_session(
        &mut self,
        class: &ClassName,
        session: &SessionName,
    ) -> BookResult<ClassSession> {
        let class_id = self.require_session(class, session)?.class_id();
        self.classes
            .update_by_id(class_id, |c| c.remove_session(session))
            .flatten()
            .ok_or_else(|| BookError::SessionNotFound {
                class: class.clone(),
                session: session.clone(),
            })
    }

    /// Replaces name, time, location and remarks of a session. The ledger is kept.
    pub fn edit_session(
        &mut self,
        class: &ClassName,
        target: &SessionName,
        details: SessionDetails,
    ) -> BookResult<()> {
        let class_id = self.require_session(class, target)?.class_id();
        let class_entity = self.require_class(class)?;
        if details.name != *target && class_entity.has_session(&details.name) {
            return Err(BookError::DuplicateSession {
                class: class_entity.name().clone(),
                session: details.name,
            });
        }

        self.classes.update_by_id(class_id, |c| {
            if let Some(session) = c.session_mut(target) {
                session.set_details(details);
            }
        });
        Ok(())
    }

    pub fn session(&self, class: &ClassName, session: &SessionName) -> BookResult<&ClassSession> {
        self.require_session(class, session)
    }

    /// Marks a student present. `at` defaults to the local clock.
    pub fn mark_present(
        &mut self,
        class: &ClassName,
        session: &SessionName,
        student: &PersonName,
        at: Option<NaiveDateTime>,
    ) -> BookResult<()> {
        self.mark(class, session, student, true, at)
    }

    /// Marks a student absent. `at` defaults to the local clock.
    pub fn mark_absent(
        &mut self,
        class: &ClassName,
        session: &SessionName,
        student: &PersonName,
        at: Option<NaiveDateTime>,
    ) -> BookResult<()> {
        self.mark(class, session, student, false, at)
    }

    /// Returns the presence flag; `false` for students without a ledger entry.
    pub fn has_attended(
        &self,
        class: &ClassName,
        session: &SessionName,
        student: &PersonName,
    ) -> BookResult<bool> {
        let session = self.require_session(class, session)?;
        Ok(self
            .persons
            .get(student)
            .is_some_and(|person| session.has_attended(person.id())))
    }

    /// Adds an unmarked entry for every enrolled student missing from the
    /// ledger. Returns how many entries were added.
    pub fn reinitialize_attendance(
        &mut self,
        class: &ClassName,
        session: &SessionName,
    ) -> BookResult<usize> {
        let class_id = self.require_session(class, session)?.class_id();
        let added = self.classes.update_by_id(class_id, |c| {
            let roster = c.students().to_vec();
            c.session_mut(session).map_or(0, |s| {
                roster
                    .into_iter()
                    .filter(|student| s.attendance_mut().ensure_entry(*student))
                    .count()
            })
        });
        Ok(added.unwrap_or(0))
    }

    /// Writes a ledger entry verbatim, creating it if needed. Used when
    /// replaying saved attendance, where the roster may not be enrolled yet.
    pub(crate) fn restore_attendance(
        &mut self,
        class: &ClassName,
        session: &SessionName,
        student: PersonId,
        attendance: Attendance,
    ) -> BookResult<()> {
        let class_id = self.require_session(class, session)?.class_id();
        self.classes.update_by_id(class_id, |c| {
            if let Some(s) = c.session_mut(session) {
                s.attendance_mut().restore(student, attendance);
            }
        });
        Ok(())
    }

    fn mark(
        &mut self,
        class: &ClassName,
        session: &SessionName,
        student: &PersonName,
        present: bool,
        at: Option<NaiveDateTime>,
    ) -> BookResult<()> {
        let student_id = self.require_role(student, Role::Student)?.id();
        let session_entity = self.require_session(class, session)?;
        let class_id = session_entity.class_id();
        if !session_entity.attendance().contains(student_id) {
            return Err(BookError::NotInSession {
                student: student.clone(),
                session: session.clone(),
            });
        }

        let at = at.unwrap_or_else(|| Local::now().naive_local());
        self.classes.update_by_id(class_id, |c| {
            if let Some(s) = c.session_mut(session) {
                s.attendance_mut().mark(student_id, present, at);
            }
        });
        Ok(())
    }

    fn require_session(
        &self,
        class: &ClassName,
        session: &SessionName,
    ) -> BookResult<&ClassSession> {
        let class_entity = self.require_class(class)?;
        class_entity
            .session(session)
            .ok_or_else(|| BookError::SessionNotFound {
                class: class_entity.name().clone(),
                session: session.clone(),
            })
    }
}
