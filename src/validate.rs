//! Input validation for note requests.
//!
//! Every function here is pure: it inspects untrusted input (a raw path
//! segment or a decoded JSON body) and either normalizes it into the typed
//! payloads of [`crate::model`] or reports the offending fields.
//!
//! Unknown body keys are ignored, including a client-supplied `id`.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::model::{NewNote, NoteChanges, NoteId};

/// One violated constraint on a named input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Rejected input. Holds at least one [`FieldError`], in field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn field(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(field, message)],
        }
    }

    /// The rejection reported for any path identifier that is not a positive integer.
    pub fn invalid_id() -> Self {
        Self::field("id", "id must be a positive integer")
    }

    fn from_errors(errors: Vec<FieldError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self { errors })
        }
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// The message surfaced to HTTP callers.
    pub fn first_message(&self) -> &str {
        self.errors
            .first()
            .map(|e| e.message.as_str())
            .unwrap_or("invalid input")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for err in &self.errors {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Parse a path identifier. Only a decimal integer greater than zero passes.
pub fn validate_id(raw: &str) -> Result<NoteId, ValidationError> {
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::invalid_id());
    }
    match digits.parse::<NoteId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ValidationError::invalid_id()),
    }
}

/// Decode a request body. An empty body reads as `{}`.
pub fn parse_body(bytes: &[u8]) -> Result<Value, ValidationError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes)
        .map_err(|err| ValidationError::field("body", format!("malformed JSON body: {err}")))
}

/// Check a create payload: `text` is required, `date` optional.
pub fn validate_create(body: &Value) -> Result<NewNote, ValidationError> {
    let object = as_object(body)?;
    let mut errors = Vec::new();

    let text = match present(object, "text") {
        Some(value) => text_field(value).map_err(|e| errors.push(e)).ok(),
        None => {
            errors.push(FieldError::new("text", "text is required"));
            None
        }
    };
    let date = present(object, "date")
        .and_then(|value| date_field(value).map_err(|e| errors.push(e)).ok());

    if let Some(err) = ValidationError::from_errors(errors) {
        return Err(err);
    }
    match text {
        Some(text) => Ok(NewNote { text, date }),
        None => Err(ValidationError::field("text", "text is required")),
    }
}

/// Check an update payload. Both fields are optional; `{}` is a valid no-op.
pub fn validate_update(body: &Value) -> Result<NoteChanges, ValidationError> {
    let object = as_object(body)?;
    let mut errors = Vec::new();

    let text = present(object, "text")
        .and_then(|value| text_field(value).map_err(|e| errors.push(e)).ok());
    let date = present(object, "date")
        .and_then(|value| date_field(value).map_err(|e| errors.push(e)).ok());

    match ValidationError::from_errors(errors) {
        Some(err) => Err(err),
        None => Ok(NoteChanges { text, date }),
    }
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.f]` (UTC) or a bare date.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, ValidationError> {
    body.as_object()
        .ok_or_else(|| ValidationError::field("body", "request body must be a JSON object"))
}

// `null` counts as absent.
fn present<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).filter(|value| !value.is_null())
}

fn text_field(value: &Value) -> Result<String, FieldError> {
    let text = value
        .as_str()
        .ok_or_else(|| FieldError::new("text", "text must be a string"))?;
    if text.trim().is_empty() {
        return Err(FieldError::new("text", "text must not be empty"));
    }
    Ok(text.to_string())
}

fn date_field(value: &Value) -> Result<DateTime<Utc>, FieldError> {
    let raw = value
        .as_str()
        .ok_or_else(|| FieldError::new("date", "date must be a string"))?;
    parse_timestamp(raw)
        .ok_or_else(|| FieldError::new("date", "date must be a valid ISO-8601 timestamp"))
}
