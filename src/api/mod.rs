//! HTTP JSON API for the tutor.
//!
//! One session per browser tab. Routes are nested under `/api/`; the
//! frontend drives upload, topic entry, generate and the history panel.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ServerError};
pub use types::ApiContext;
