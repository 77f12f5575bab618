//! Class session domain model.
//!
//! # Responsibility
//! - Describe one scheduled teaching session of a tuition class.
//! - Own the session's attendance ledger.
//!
//! # Invariants
//! - `class_id` is set at creation and never changes.
//! - The ledger is seeded from the class roster at creation time only.

use crate::model::attendance::AttendanceLedger;
use crate::model::name::SessionName;
use crate::model::person::PersonId;
use crate::model::tuition_class::ClassId;
use crate::model::validation::ValidationError;
use chrono::NaiveDateTime;
use std::fmt::{Display, Formatter};

/// Date-time format written to storage. Fractional seconds are only printed
/// when non-zero, so whole-second times read as `YYYY-MM-DDTHH:MM:SS`.
pub const SESSION_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const SESSION_DATE_TIME_SHORT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Parses `YYYY-MM-DDTHH:MM:SS[.fff]`, or the same without seconds.
pub fn parse_session_date_time(value: &str) -> Result<NaiveDateTime, ValidationError> {
    let trimmed = value.trim();
    NaiveDateTime::parse_from_str(trimmed, SESSION_DATE_TIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, SESSION_DATE_TIME_SHORT_FORMAT))
        .map_err(|_| ValidationError::DateTime(value.to_string()))
}

pub fn format_session_date_time(value: &NaiveDateTime) -> String {
    value.format(SESSION_DATE_TIME_FORMAT).to_string()
}

/// Editable fields of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetails {
    pub name: SessionName,
    pub date_time: NaiveDateTime,
    pub location: Option<String>,
    pub remarks: Option<String>,
}

impl SessionDetails {
    /// Creates details without location or remarks.
    pub fn new(name: SessionName, date_time: NaiveDateTime) -> Self {
        Self {
            name,
            date_time,
            location: None,
            remarks: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = non_blank(location.into());
        self
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = non_blank(remarks.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ClassSession {
    class_id: ClassId,
    details: SessionDetails,
    attendance: AttendanceLedger,
}

impl ClassSession {
    pub(crate) fn new(class_id: ClassId, details: SessionDetails, roster: &[PersonId]) -> Self {
        Self {
            class_id,
            details,
            attendance: AttendanceLedger::from_roster(roster),
        }
    }

    pub fn class_id(&self) -> ClassId {
        self.class_id
    }

    pub fn details(&self) -> &SessionDetails {
        &self.details
    }

    pub fn name(&self) -> &SessionName {
        &self.details.name
    }

    pub fn date_time(&self) -> NaiveDateTime {
        self.details.date_time
    }

    pub fn location(&self) -> Option<&str> {
        self.details.location.as_deref()
    }

    pub fn remarks(&self) -> Option<&str> {
        self.details.remarks.as_deref()
    }

    pub fn attendance(&self) -> &AttendanceLedger {
        &self.attendance
    }

    pub fn has_attended(&self, student: PersonId) -> bool {
        self.attendance.has_attended(student)
    }

    pub(crate) fn attendance_mut(&mut self) -> &mut AttendanceLedger {
        &mut self.attendance
    }

    pub(crate) fn set_details(&mut self, details: SessionDetails) {
        self.details = details;
    }
}

impl Display for ClassSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} at {}",
            self.details.name,
            format_session_date_time(&self.details.date_time)
        )?;
        if let Some(location) = &self.details.location {
            write!(f, " @ {location}")?;
        }
        write!(
            f,
            " ({}/{} present)",
            self.attendance.present_count(),
            self.attendance.len()
        )
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{format_session_date_time, parse_session_date_time, SessionDetails};
    use crate::model::name::SessionName;

    #[test]
    fn parse_accepts_optional_seconds() {
        let full = parse_session_date_time("2024-10-28T14:00:00").expect("full form parses");
        let short = parse_session_date_time("2024-10-28T14:00").expect("short form parses");
        assert_eq!(full, short);
        assert_eq!(format_session_date_time(&short), "2024-10-28T14:00:00");
    }

    #[test]
    fn parse_rejects_other_shapes() {
        assert!(parse_session_date_time("28/10/2024 14:00").is_err());
        assert!(parse_session_date_time("2024-13-01T10:00").is_err());
    }

    #[test]
    fn blank_location_is_dropped() {
        let when = parse_session_date_time("2024-10-28T14:00").expect("valid time");
        let details = SessionDetails::new(SessionName::new("Week 1").expect("valid name"), when)
            .with_location("   ")
            .with_remarks(" bring calculators ");
        assert_eq!(details.location, None);
        assert_eq!(details.remarks.as_deref(), Some("bring calculators"));
    }
}
