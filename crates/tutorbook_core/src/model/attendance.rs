//! Per-session attendance ledger.
//!
//! # Responsibility
//! - Track presence flag and latest marking time per student.
//! - Answer attendance queries for one session.
//!
//! # Invariants
//! - At most one entry per student; re-marking overwrites in place.
//! - Entries are created from a roster snapshot or by explicit restore, never
//!   by marking an unknown student.
//! - Entries survive the student leaving the class.

use crate::model::person::PersonId;
use chrono::NaiveDateTime;

/// Attendance record of one student in one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attendance {
    present: bool,
    marked_at: Option<NaiveDateTime>,
}

/// State view of an [`Attendance`] record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    Unmarked,
    /// Timestamp can be unset for marks restored from files without times.
    Present(Option<NaiveDateTime>),
    Absent(NaiveDateTime),
}

impl Attendance {
    /// Initial state: not present, never marked.
    pub fn unmarked() -> Self {
        Self::default()
    }

    pub fn new(present: bool, marked_at: Option<NaiveDateTime>) -> Self {
        Self { present, marked_at }
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn marked_at(&self) -> Option<NaiveDateTime> {
        self.marked_at
    }

    pub fn status(&self) -> AttendanceStatus {
        match (self.present, self.marked_at) {
            (true, at) => AttendanceStatus::Present(at),
            (false, Some(at)) => AttendanceStatus::Absent(at),
            (false, None) => AttendanceStatus::Unmarked,
        }
    }
}

/// Ordered student -> attendance mapping held by one class session.
#[derive(Debug, Clone, Default)]
pub struct AttendanceLedger {
    entries: Vec<(PersonId, Attendance)>,
}

impl AttendanceLedger {
    /// Builds a ledger with one unmarked entry per roster student.
    pub(crate) fn from_roster(roster: &[PersonId]) -> Self {
        let mut ledger = Self::default();
        for student in roster {
            ledger.ensure_entry(*student);
        }
        ledger
    }

    /// Overwrites the mark of a student already in the ledger.
    ///
    /// Returns `false` when the student has no entry.
    pub(crate) fn mark(&mut self, student: PersonId, present: bool, at: NaiveDateTime) -> bool {
        match self.entry_mut(student) {
            Some(attendance) => {
                *attendance = Attendance::new(present, Some(at));
                true
            }
            None => false,
        }
    }

    /// Inserts or overwrites an entry verbatim. Used when replaying saved data.
    pub(crate) fn restore(&mut self, student: PersonId, attendance: Attendance) {
        match self.entry_mut(student) {
            Some(existing) => *existing = attendance,
            None => self.entries.push((student, attendance)),
        }
    }

    /// Adds an unmarked entry if the student has none. Returns whether one was added.
    pub(crate) fn ensure_entry(&mut self, student: PersonId) -> bool {
        if self.contains(student) {
            return false;
        }
        self.entries.push((student, Attendance::unmarked()));
        true
    }

    /// Drops the entry of a student who no longer exists as a student.
    pub(crate) fn remove(&mut self, student: PersonId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(id, _)| *id != student);
        self.entries.len() != before
    }

    pub fn get(&self, student: PersonId) -> Option<&Attendance> {
        self.entries
            .iter()
            .find(|(id, _)| *id == student)
            .map(|(_, attendance)| attendance)
    }

    pub fn contains(&self, student: PersonId) -> bool {
        self.get(student).is_some()
    }

    /// Returns the presence flag, `false` for students without an entry.
    pub fn has_attended(&self, student: PersonId) -> bool {
        self.get(student).is_some_and(Attendance::is_present)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn present_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, attendance)| attendance.is_present())
            .count()
    }

    pub fn entries(&self) -> impl Iterator<Item = (PersonId, &Attendance)> + '_ {
        self.entries
            .iter()
            .map(|(student, attendance)| (*student, attendance))
    }

    fn entry_mut(&mut self, student: PersonId) -> Option<&mut Attendance> {
        self.entries
            .iter_mut()
            .find(|(id, _)| *id == student)
            .map(|(_, attendance)| attendance)
    }
}

#[cfg(test)]
mod tests {
    use super::{Attendance, AttendanceLedger, AttendanceStatus};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn at(hour: u32, minute: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 28)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid test time")
    }

    #[test]
    fn roster_entries_start_unmarked() {
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let ledger = AttendanceLedger::from_roster(&[alice, bob]);

        assert_eq!(ledger.len(), 2);
        assert_eq!(
            ledger.get(alice).map(Attendance::status),
            Some(AttendanceStatus::Unmarked)
        );
        assert!(!ledger.has_attended(bob));
    }

    #[test]
    fn remark_overwrites_flag_and_time() {
        let alice = Uuid::new_v4();
        let mut ledger = AttendanceLedger::from_roster(&[alice]);

        assert!(ledger.mark(alice, true, at(14, 0)));
        assert!(ledger.mark(alice, true, at(14, 30)));
        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.get(alice).map(Attendance::status),
            Some(AttendanceStatus::Present(Some(at(14, 30))))
        );

        assert!(ledger.mark(alice, false, at(15, 0)));
        assert_eq!(
            ledger.get(alice).map(Attendance::status),
            Some(AttendanceStatus::Absent(at(15, 0)))
        );
    }

    #[test]
    fn mark_rejects_student_without_entry() {
        let mut ledger = AttendanceLedger::default();
        let stranger = Uuid::new_v4();

        assert!(!ledger.mark(stranger, true, at(9, 0)));
        assert!(ledger.is_empty());
        assert!(!ledger.has_attended(stranger));
    }

    #[test]
    fn restore_inserts_missing_entries() {
        let alice = Uuid::new_v4();
        let mut ledger = AttendanceLedger::default();

        ledger.restore(alice, Attendance::new(true, None));
        ledger.restore(alice, Attendance::new(true, Some(at(10, 0))));

        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.present_count(), 1);
        assert_eq!(
            ledger.get(alice).and_then(Attendance::marked_at),
            Some(at(10, 0))
        );
    }
}
