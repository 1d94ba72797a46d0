//! API route handlers
//!
//! - `notes`: list, get, create, update and delete on the note collection
//!
//! Unmatched paths and methods are answered here with the standard envelope.

pub mod notes;

use crate::error::ServerError;

/// 404 handler for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::RouteNotFound
}

/// 405 handler for a known path with an unsupported method.
pub async fn method_not_allowed() -> ServerError {
    ServerError::MethodNotAllowed
}
