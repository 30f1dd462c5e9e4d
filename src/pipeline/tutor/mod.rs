pub mod llm;
pub mod prompt;
pub mod classify;
pub mod respond;
pub mod history;
pub mod orchestrator;

pub use llm::*;
pub use classify::*;
pub use respond::*;
pub use history::*;
pub use orchestrator::*;

use thiserror::Error;

/// Failures talking to the remote model. Never surfaced to the user:
/// the classifier and responder turn these into fixed messages.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP client could not be built: {0}")]
    ClientBuild(String),

    #[error("Cannot reach model service at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Model service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse model response: {0}")]
    ResponseParsing(String),

    #[error("Model returned no text")]
    EmptyResponse,
}
