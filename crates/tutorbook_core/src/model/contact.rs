//! Contact-detail value types attached to every person.

use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

const PHONE_MIN_DIGITS: usize = 3;
const EMAIL_MIN_TOP_LABEL_CHARS: usize = 2;

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+$").expect("valid phone regex"));
static EMAIL_LOCAL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9+_.\-]*[A-Za-z0-9])?$").expect("valid email local regex")
});
static EMAIL_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9\-]*[A-Za-z0-9])?$").expect("valid email label regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{L}\p{N}]+$").expect("valid tag regex"));

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Phone(String);

impl Phone {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = value.as_ref();
        let trimmed = raw.trim();
        if trimmed.len() < PHONE_MIN_DIGITS || !PHONE_RE.is_match(trimmed) {
            return Err(ValidationError::Phone(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = value.as_ref();
        let trimmed = raw.trim();
        if !is_valid_email(trimmed) {
            return Err(ValidationError::Email(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address(String);

impl Address {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = value.as_ref();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Address(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Free-form label; a person's tags form a set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = value.as_ref();
        let trimmed = raw.trim();
        if !TAG_RE.is_match(trimmed) {
            return Err(ValidationError::Tag(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0)
    }
}

fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if !EMAIL_LOCAL_RE.is_match(local) {
        return false;
    }

    let labels = domain.split('.').collect::<Vec<_>>();
    if labels.iter().any(|label| !EMAIL_LABEL_RE.is_match(label)) {
        return false;
    }
    labels
        .last()
        .is_some_and(|top| top.chars().count() >= EMAIL_MIN_TOP_LABEL_CHARS)
}

#[cfg(test)]
mod tests {
    use super::is_valid_email;

    #[test]
    fn email_accepts_subdomains_and_plus_tags() {
        assert!(is_valid_email("jane+tuition@mail.example.com"));
        assert!(is_valid_email("a@bc"));
    }

    #[test]
    fn email_rejects_malformed_shapes() {
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email(".jane@example.com"));
        assert!(!is_valid_email("jane@example.c"));
        assert!(!is_valid_email("jane@-example.com"));
        assert!(!is_valid_email("jane@example..com"));
        assert!(!is_valid_email("jane@a@b.com"));
    }
}
