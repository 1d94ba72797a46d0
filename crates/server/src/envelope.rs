//! The uniform JSON body returned by every endpoint.

use axum::response::{IntoResponse, Response};
use axum::Json;
use notekeep::Note;
use serde::{Deserialize, Serialize};

/// `{success, message, note?, notes?}`. Absent payload fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<Note>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Vec<Note>>,
}

impl Envelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            note: None,
            notes: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::ok(message)
        }
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.note = Some(note);
        self
    }

    pub fn with_notes(mut self, notes: Vec<Note>) -> Self {
        self.notes = Some(notes);
        self
    }
}

/// Serialized with status 200. Error statuses come from [`crate::ServerError`].
impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn omits_absent_payloads() {
        let value = serde_json::to_value(Envelope::ok("successfully updated")).unwrap();
        assert_eq!(
            value,
            json!({ "success": true, "message": "successfully updated" })
        );
    }

    #[test]
    fn failure_flips_success() {
        let value = serde_json::to_value(Envelope::failure("note not found")).unwrap();
        assert_eq!(value, json!({ "success": false, "message": "note not found" }));
    }

    #[test]
    fn empty_list_is_still_present() {
        let value = serde_json::to_value(Envelope::ok("listed").with_notes(vec![])).unwrap();
        assert_eq!(value["notes"], json!([]));
    }
}
