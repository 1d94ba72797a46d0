//! Core types of the notekeep service.
//!
//! This crate holds the note data model and the validator that gates every
//! write and id-bearing read. It performs no I/O.
//!
//! ```
//! use notekeep::{validate_create, validate_id};
//! use serde_json::json;
//!
//! let id = validate_id("42").unwrap();
//! assert_eq!(id, 42);
//!
//! let draft = validate_create(&json!({ "text": "buy milk" })).unwrap();
//! assert_eq!(draft.text, "buy milk");
//! assert!(draft.date.is_none());
//! ```

pub mod model;
pub mod validate;

pub use model::{NewNote, Note, NoteChanges, NoteId};
pub use validate::{
    FieldError, ValidationError, parse_body, parse_timestamp, validate_create, validate_id,
    validate_update,
};
