//! `POST /api/sessions/:id/generate` - the "Generate Response" button.
//!
//! Accepts an optional upload (base64 or data URL) and an optional typed
//! topic, runs extract → classify → respond → record on a blocking thread.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::{parse_session_id, ApiContext};
use crate::pipeline::import::Artifact;
use crate::pipeline::tutor::{PipelineInput, PipelineOutcome, PipelineState};

#[derive(Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub artifact: Option<UploadedArtifact>,
}

#[derive(Deserialize)]
pub struct UploadedArtifact {
    #[serde(default)]
    pub file_name: Option<String>,
    pub media_type: String,
    /// Raw base64 or a `data:<type>;base64,...` URL
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub status: PipelineState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_index: Option<usize>,
    pub show_image_reference: bool,
}

impl From<PipelineOutcome> for GenerateResponse {
    fn from(outcome: PipelineOutcome) -> Self {
        let message = match outcome.state {
            PipelineState::Recorded => None,
            _ => Some(outcome.message()),
        };
        Self {
            status: outcome.state,
            query: outcome.query,
            response: outcome.answer.map(|a| a.text().to_string()),
            message,
            history_index: outcome.history_index,
            show_image_reference: outcome.show_image_reference,
        }
    }
}

/// `POST /api/sessions/:id/generate`
pub async fn generate(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let session_id = parse_session_id(&id)?;

    let artifact = match req.artifact {
        Some(upload) => Some(Artifact::from_base64(
            upload.file_name.as_deref().unwrap_or("upload"),
            &upload.media_type,
            &upload.data,
        )?),
        None => None,
    };
    let input = PipelineInput {
        topic: req.topic,
        artifact,
    };

    let core = Arc::clone(&ctx.core);
    let outcome = tokio::task::spawn_blocking(move || core.generate(&session_id, &input))
        .await
        .map_err(|e| ApiError::Internal(format!("Pipeline task failed: {e}")))??;

    match outcome.state {
        PipelineState::UnsupportedArtifact => Err(ApiError::UnsupportedFileType),
        PipelineState::EmptyQuery => Err(ApiError::EmptyQuery),
        _ => Ok(Json(GenerateResponse::from(outcome))),
    }
}
