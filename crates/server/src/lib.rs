//! notekeep server - HTTP JSON API for notes
//!
//! This crate exposes a single flat collection of notes over HTTP, backed by
//! the `store` crate. Every response body is an [`Envelope`]:
//! `{success, message, note?, notes?}`.
//!
//! # API Endpoints
//!
//! - `GET /` - List every note
//! - `GET /{id}` - Fetch one note
//! - `POST /` - Create a note from `{text, date?}`
//! - `PUT /{id}` - Update a note from `{text?, date?}`
//! - `DELETE /{id}` - Delete a note
//!
//! # Status codes
//!
//! 200 on success (and on a duplicate-text create, with `success: false`),
//! 400 on invalid ids or bodies, 404 on missing notes, 500 on storage failure.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod envelope;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ServerConfig, StorageBackend, StorageConfig};
pub use envelope::Envelope;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, init_tracing, start_server};
pub use state::ServerState;
