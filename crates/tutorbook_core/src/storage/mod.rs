//! Book file storage.
//!
//! # Responsibility
//! - Read and write one address book as a JSON file.
//! - Translate between the live graph and flat records (`records`, `linker`).
//!
//! # Invariants
//! - A failed read never yields a partially linked book.
//! - Writes go to a sibling temp file first and are renamed into place.
//! - Only metadata (path, counts, durations) is logged; no personal data.

pub mod linker;
pub mod records;

use crate::book::error::{BookError, ErrorKind};
use crate::book::AddressBook;
use crate::model::person::Role;
use crate::model::validation::ValidationError;
use log::{error, info};
use records::BookFile;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// A stored value fails value-type validation.
    Validation(ValidationError),
    DuplicatePerson(String),
    DuplicateClass(String),
    /// A stored name does not match any stored person.
    UnresolvedPerson {
        name: String,
        referenced_by: String,
    },
    RoleMismatch {
        name: String,
        expected: Role,
        actual: Role,
    },
    /// A student is listed more than once in one session's attendance.
    ConflictingAttendance {
        student: String,
        session: String,
    },
    /// Relinking failed, e.g. a duplicate enrollment or session name.
    Link(BookError),
}

impl StorageError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            _ => ErrorKind::Load,
        }
    }
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "malformed book file: {err}"),
            Self::Validation(err) => write!(f, "invalid stored value: {err}"),
            Self::DuplicatePerson(name) => write!(f, "book file lists person {name} twice"),
            Self::DuplicateClass(name) => write!(f, "book file lists class {name} twice"),
            Self::UnresolvedPerson {
                name,
                referenced_by,
            } => write!(f, "{referenced_by} refers to unknown person {name}"),
            Self::RoleMismatch {
                name,
                expected,
                actual,
            } => write!(f, "stored person {name} is a {actual}, expected a {expected}"),
            Self::ConflictingAttendance { student, session } => {
                write!(f, "{session} lists attendance for {student} twice")
            }
            Self::Link(err) => write!(f, "cannot relink book file: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Link(err) => Some(err),
            Self::DuplicatePerson(_)
            | Self::DuplicateClass(_)
            | Self::UnresolvedPerson { .. }
            | Self::RoleMismatch { .. }
            | Self::ConflictingAttendance { .. } => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<ValidationError> for StorageError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<BookError> for StorageError {
    fn from(value: BookError) -> Self {
        match value {
            BookError::Validation(err) => Self::Validation(err),
            other => Self::Link(other),
        }
    }
}

/// Parses and links a book from JSON text.
pub fn book_from_json(json: &str) -> StorageResult<AddressBook> {
    let file: BookFile = serde_json::from_str(json)?;
    linker::link_book(&file)
}

/// Flattens a book into pretty-printed JSON text.
pub fn book_to_json(book: &AddressBook) -> StorageResult<String> {
    Ok(serde_json::to_string_pretty(&BookFile::from_book(book))?)
}

/// Persistence contract for one address book.
pub trait BookStorage {
    /// Location of the backing file.
    fn path(&self) -> &Path;
    /// Returns `Ok(None)` when no book has been saved yet.
    fn read_book(&self) -> StorageResult<Option<AddressBook>>;
    fn save_book(&self, book: &AddressBook) -> StorageResult<()>;
}

/// JSON file implementation of [`BookStorage`].
#[derive(Debug, Clone)]
pub struct JsonBookStorage {
    path: PathBuf,
}

impl JsonBookStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl BookStorage for JsonBookStorage {
    fn path(&self) -> &Path {
        &self.path
    }

    fn read_book(&self) -> StorageResult<Option<AddressBook>> {
        let started_at = Instant::now();
        info!("event=book_read module=storage status=start");

        if !self.path.exists() {
            info!(
                "event=book_read module=storage status=ok missing=true duration_ms={}",
                started_at.elapsed().as_millis()
            );
            return Ok(None);
        }

        let result = fs::read_to_string(&self.path)
            .map_err(StorageError::from)
            .and_then(|json| book_from_json(&json));
        match result {
            Ok(book) => {
                info!(
                    "event=book_read module=storage status=ok persons={} classes={} duration_ms={}",
                    book.persons().len(),
                    book.classes().len(),
                    started_at.elapsed().as_millis()
                );
                Ok(Some(book))
            }
            Err(err) => {
                error!(
                    "event=book_read module=storage status=error duration_ms={} error_code={}",
                    started_at.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }

    fn save_book(&self, book: &AddressBook) -> StorageResult<()> {
        let started_at = Instant::now();
        info!("event=book_save module=storage status=start");

        match write_atomically(&self.path, book) {
            Ok(()) => {
                info!(
                    "event=book_save module=storage status=ok persons={} classes={} duration_ms={}",
                    book.persons().len(),
                    book.classes().len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=book_save module=storage status=error duration_ms={} error_code={}",
                    started_at.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(err)
            }
        }
    }
}

fn write_atomically(path: &Path, book: &AddressBook) -> StorageResult<()> {
    let json = book_to_json(book)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);
    fs::write(&temp_path, json)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

fn error_code(err: &StorageError) -> &'static str {
    match err {
        StorageError::Io(_) => "io_failed",
        StorageError::Json(_) => "json_malformed",
        StorageError::Validation(_) => "invalid_value",
        StorageError::DuplicatePerson(_) | StorageError::DuplicateClass(_) => "duplicate_identity",
        StorageError::UnresolvedPerson { .. } => "unresolved_reference",
        StorageError::RoleMismatch { .. } => "role_mismatch",
        StorageError::Link(_) => "link_failed",
    }
}
