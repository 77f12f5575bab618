//! Domain model for people, tuition classes and sessions.
//!
//! # Responsibility
//! - Define validated value types and the entities built from them.
//! - Keep relationship edges read-only outside the crate.
//!
//! # Invariants
//! - Every person and class is identified by a generated id inside one book,
//!   and by its identity key (`PersonName`, `ClassName`) across saves.
//! - Constructors validate; a value that exists is a valid value.

pub mod attendance;
pub mod contact;
pub mod name;
pub mod person;
pub mod session;
pub mod tuition_class;
pub mod validation;
