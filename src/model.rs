//! Note records and the typed payloads produced by validation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned note identifier. Allocation starts at 1 and never reuses a value.
pub type NoteId = u64;

/// A persisted note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    pub date: DateTime<Utc>,
}

/// Validated payload of a create request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub text: String,
    pub date: Option<DateTime<Utc>>,
}

impl NewNote {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            date: None,
        }
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Materialize the record under `id`, defaulting `date` to `now`.
    pub fn into_note(self, id: NoteId, now: DateTime<Utc>) -> Note {
        Note {
            id,
            text: self.text,
            date: self.date.unwrap_or(now),
        }
    }
}

/// Validated payload of an update request. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteChanges {
    pub text: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl NoteChanges {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.date.is_none()
    }

    /// Merge onto `current`. The id is carried over untouched.
    pub fn apply(&self, current: &Note) -> Note {
        Note {
            id: current.id,
            text: self
                .text
                .clone()
                .unwrap_or_else(|| current.text.clone()),
            date: self.date.unwrap_or(current.date),
        }
    }
}
