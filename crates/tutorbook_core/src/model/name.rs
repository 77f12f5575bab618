//! Identity-bearing name value types.
//!
//! # Responsibility
//! - Validate and normalize person, class and session names.
//! - Define the identity comparison used by unique collections.
//!
//! # Invariants
//! - `PersonName` and `SessionName` compare by exact string.
//! - `ClassName` compares case-insensitively on its normalized form and keeps
//!   the caller's casing for display.

use crate::model::validation::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use unicode_normalization::UnicodeNormalization;

const CLASS_NAME_MAX_CHARS: usize = 50;
const SESSION_NAME_MAX_CHARS: usize = 50;

static PERSON_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}\p{N}][\p{L}\p{N} ]*$").expect("valid person name regex"));
// Hyphen variants: ASCII hyphen-minus plus U+2010..U+2015.
static CLASS_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\p{L}\p{N} _\-\u{2010}-\u{2015}]+$").expect("valid class name regex")
});
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Person identity key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = value.as_ref();
        let trimmed = raw.trim();
        if !PERSON_NAME_RE.is_match(trimmed) {
            return Err(ValidationError::PersonName(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PersonName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Tuition class identity key.
///
/// Input is NFC-normalized, whitespace runs are collapsed to one space and the
/// ends are trimmed before the length and character checks run.
#[derive(Debug, Clone)]
pub struct ClassName {
    display: String,
    key: String,
}

impl ClassName {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = value.as_ref();
        let normalized = normalize_class_name(raw);
        let char_count = normalized.chars().count();
        if char_count == 0
            || char_count > CLASS_NAME_MAX_CHARS
            || !CLASS_NAME_RE.is_match(&normalized)
        {
            return Err(ValidationError::ClassName(raw.to_string()));
        }
        let key = normalized.to_lowercase();
        Ok(Self {
            display: normalized,
            key,
        })
    }

    /// Returns the normalized name with its original casing.
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Returns the lowercase form used for identity comparison.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl PartialEq for ClassName {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ClassName {}

impl Hash for ClassName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for ClassName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl Display for ClassName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

/// Session name, unique (case-sensitive) within one class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionName(String);

impl SessionName {
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let raw = value.as_ref();
        let trimmed = raw.trim();
        let char_count = trimmed.chars().count();
        if char_count == 0
            || char_count > SESSION_NAME_MAX_CHARS
            || trimmed.chars().any(char::is_control)
        {
            return Err(ValidationError::SessionName(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

fn normalize_class_name(value: &str) -> String {
    let composed = value.nfc().collect::<String>();
    WHITESPACE_RE
        .replace_all(&composed, " ")
        .trim()
        .to_string()
}
