//! Core domain logic for TutorBook.
//! This crate is the single source of truth for the people/class graph and
//! its invariants.

pub mod book;
pub mod logging;
pub mod model;
pub mod storage;

pub use book::error::{BookError, BookResult, ErrorKind};
pub use book::unique_list::{Identified, ListChange, ListError, SubscriptionId, UniqueList};
pub use book::AddressBook;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attendance::{Attendance, AttendanceLedger, AttendanceStatus};
pub use model::contact::{Address, Email, Phone, Tag};
pub use model::name::{ClassName, PersonName, SessionName};
pub use model::person::{Person, PersonId, PersonProfile, Role};
pub use model::session::{
    format_session_date_time, parse_session_date_time, ClassSession, SessionDetails,
};
pub use model::tuition_class::{ClassId, TuitionClass};
pub use model::validation::ValidationError;
pub use storage::records::BookFile;
pub use storage::{
    book_from_json, book_to_json, BookStorage, JsonBookStorage, StorageError, StorageResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
