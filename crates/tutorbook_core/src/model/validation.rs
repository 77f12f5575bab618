//! Value-type validation errors.
//!
//! # Responsibility
//! - Describe which constraint a rejected input violated.
//! - Carry the allowed pattern so callers can show it verbatim.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure raised by value-type and entity constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    PersonName(String),
    ClassName(String),
    SessionName(String),
    Phone(String),
    Email(String),
    Address(String),
    Tag(String),
    /// Unparseable session date-time text.
    DateTime(String),
}

impl ValidationError {
    /// Returns the rule that the rejected value must satisfy.
    pub fn constraint(&self) -> &'static str {
        match self {
            Self::PersonName(_) => {
                "person names contain only letters, digits and spaces, and must not be blank"
            }
            Self::ClassName(_) => {
                "class names are 1-50 characters of letters, digits, spaces, hyphens or underscores"
            }
            Self::SessionName(_) => "session names are 1-50 characters and must not be blank",
            Self::Phone(_) => "phone numbers contain only digits and are at least 3 digits long",
            Self::Email(_) => {
                "emails look like local-part@domain; the local part uses letters, digits and +_.- \
                 (not at either end), the domain ends with a label of at least 2 characters"
            }
            Self::Address(_) => "addresses can take any value but must not be blank",
            Self::Tag(_) => "tags contain only letters and digits",
            Self::DateTime(_) => "date-times use the form YYYY-MM-DDTHH:MM[:SS]",
        }
    }

    /// Returns the raw input that failed validation.
    pub fn value(&self) -> &str {
        match self {
            Self::PersonName(value)
            | Self::ClassName(value)
            | Self::SessionName(value)
            | Self::Phone(value)
            | Self::Email(value)
            | Self::Address(value)
            | Self::Tag(value)
            | Self::DateTime(value) => value,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid value `{}`: {}", self.value(), self.constraint())
    }
}

impl Error for ValidationError {}
