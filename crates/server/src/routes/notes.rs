//! Note endpoints.
//!
//! Each handler is a straight line: validate, call the store, shape the
//! envelope. Any failure short-circuits through [`ServerError`], which picks
//! the status code and the public message. Extractor rejections are taken
//! as values so they also come back as envelopes.

use crate::envelope::Envelope;
use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use notekeep::{
    parse_body, validate_create, validate_id, validate_update, NoteId, ValidationError,
};
use serde_json::Value;
use std::sync::Arc;
use store::CreateOutcome;

pub const LISTED: &str = "successfully fetched notes";
pub const FETCHED: &str = "successfully fetched the note";
pub const CREATED: &str = "successfully added the note";
pub const UPDATED: &str = "successfully updated";
pub const DELETED: &str = "successfully deleted";
pub const ALREADY_EXISTS: &str = "already exists";

/// Path segments that do not even decode (e.g. `%FF`) are invalid ids too.
fn path_id(path: Result<Path<String>, PathRejection>) -> ServerResult<NoteId> {
    let Path(raw_id) = path.map_err(|_| ValidationError::invalid_id())?;
    Ok(validate_id(&raw_id)?)
}

fn request_body(
    state: &ServerState,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<Value> {
    match body {
        Ok(bytes) => Ok(parse_body(&bytes)?),
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            Err(ServerError::PayloadTooLarge(state.config.max_body_size_kb))
        }
        Err(rejection) => Err(ValidationError::field(
            "body",
            format!("failed to read request body: {}", rejection.body_text()),
        )
        .into()),
    }
}

/// `GET /`
pub async fn list_notes(State(state): State<Arc<ServerState>>) -> ServerResult<Envelope> {
    let notes = state.store.list_all().await?;
    Ok(Envelope::ok(LISTED).with_notes(notes))
}

/// `GET /{id}`
pub async fn get_note(
    State(state): State<Arc<ServerState>>,
    path: Result<Path<String>, PathRejection>,
) -> ServerResult<Envelope> {
    let id = path_id(path)?;
    match state.store.get_by_id(id).await? {
        Some(note) => Ok(Envelope::ok(FETCHED).with_note(note)),
        None => Err(ServerError::NotFound(id)),
    }
}

/// `POST /`
///
/// Text must be unique at creation time. A duplicate is a soft outcome:
/// status 200, `success: false`, and the already stored note.
pub async fn create_note(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<Envelope> {
    let draft = validate_create(&request_body(&state, body)?)?;

    match state.store.create_unique(draft).await? {
        CreateOutcome::Created(note) => {
            tracing::info!(id = note.id, "note created");
            Ok(Envelope::ok(CREATED).with_note(note))
        }
        CreateOutcome::Duplicate(existing) => {
            tracing::info!(id = existing.id, "create rejected, text already exists");
            Ok(Envelope::failure(ALREADY_EXISTS).with_note(existing))
        }
    }
}

/// `PUT /{id}`
///
/// Fields left out of the body keep their stored values.
pub async fn update_note(
    State(state): State<Arc<ServerState>>,
    path: Result<Path<String>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<Envelope> {
    let id = path_id(path)?;
    let changes = validate_update(&request_body(&state, body)?)?;

    state.store.update(id, changes).await?;
    tracing::info!(id, "note updated");
    Ok(Envelope::ok(UPDATED))
}

/// `DELETE /{id}`
pub async fn delete_note(
    State(state): State<Arc<ServerState>>,
    path: Result<Path<String>, PathRejection>,
) -> ServerResult<Envelope> {
    let id = path_id(path)?;

    state.store.delete(id).await?;
    tracing::info!(id, "note deleted");
    Ok(Envelope::ok(DELETED))
}
