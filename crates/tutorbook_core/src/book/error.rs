//! Address book error types.

use crate::book::unique_list::ListError;
use crate::model::name::{ClassName, PersonName, SessionName};
use crate::model::person::Role;
use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BookResult<T> = Result<T, BookError>;

/// Coarse error category used by callers to pick a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Duplicate,
    NotFound,
    RoleMismatch,
    /// Saved data could not be turned back into a graph.
    Load,
    Io,
}

/// Errors from address book operations. A failed operation changes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    Validation(ValidationError),
    DuplicatePerson(PersonName),
    DuplicateClass(ClassName),
    DuplicateSession {
        class: ClassName,
        session: SessionName,
    },
    /// Student is already on the class roster.
    AlreadyEnrolled {
        student: PersonName,
        class: ClassName,
    },
    PersonNotFound(PersonName),
    ClassNotFound(ClassName),
    SessionNotFound {
        class: ClassName,
        session: SessionName,
    },
    NotEnrolled {
        student: PersonName,
        class: ClassName,
    },
    NotLinked {
        parent: PersonName,
        child: PersonName,
    },
    NoTutor(ClassName),
    /// Student has no entry in the session's attendance ledger.
    NotInSession {
        student: PersonName,
        session: SessionName,
    },
    RoleMismatch {
        name: PersonName,
        expected: Role,
        actual: Role,
    },
}

impl BookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::DuplicatePerson(_)
            | Self::DuplicateClass(_)
            | Self::DuplicateSession { .. }
            | Self::AlreadyEnrolled { .. } => ErrorKind::Duplicate,
            Self::PersonNotFound(_)
            | Self::ClassNotFound(_)
            | Self::SessionNotFound { .. }
            | Self::NotEnrolled { .. }
            | Self::NotLinked { .. }
            | Self::NoTutor(_)
            | Self::NotInSession { .. } => ErrorKind::NotFound,
            Self::RoleMismatch { .. } => ErrorKind::RoleMismatch,
        }
    }
}

impl Display for BookError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicatePerson(name) => write!(f, "person already exists: {name}"),
            Self::DuplicateClass(name) => write!(f, "class already exists: {name}"),
            Self::DuplicateSession { class, session } => {
                write!(f, "class {class} already has a session named {session}")
            }
            Self::AlreadyEnrolled { student, class } => {
                write!(f, "{student} is already enrolled in {class}")
            }
            Self::PersonNotFound(name) => write!(f, "person not found: {name}"),
            Self::ClassNotFound(name) => write!(f, "class not found: {name}"),
            Self::SessionNotFound { class, session } => {
                write!(f, "class {class} has no session named {session}")
            }
            Self::NotEnrolled { student, class } => {
                write!(f, "{student} is not enrolled in {class}")
            }
            Self::NotLinked { parent, child } => {
                write!(f, "{parent} is not a parent of {child}")
            }
            Self::NoTutor(class) => write!(f, "class {class} has no tutor"),
            Self::NotInSession { student, session } => {
                write!(f, "{student} has no attendance entry in session {session}")
            }
            Self::RoleMismatch {
                name,
                expected,
                actual,
            } => write!(f, "{name} is a {actual}, expected a {expected}"),
        }
    }
}

impl Error for BookError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for BookError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ListError<PersonName>> for BookError {
    fn from(value: ListError<PersonName>) -> Self {
        match value {
            ListError::Duplicate(name) => Self::DuplicatePerson(name),
            ListError::NotFound(name) => Self::PersonNotFound(name),
        }
    }
}

impl From<ListError<ClassName>> for BookError {
    fn from(value: ListError<ClassName>) -> Self {
        match value {
            ListError::Duplicate(name) => Self::DuplicateClass(name),
            ListError::NotFound(name) => Self::ClassNotFound(name),
        }
    }
}
