//! Session lifecycle and the history panel.
//!
//! - `POST /api/sessions` - start a session
//! - `DELETE /api/sessions/:id` - end it, dropping its history
//! - `GET /api/sessions/:id/history` - queries, oldest first
//! - `GET /api/sessions/:id/history/:index` - read one entry
//! - `POST /api/sessions/:id/history/:index/select` - open it in the main area
//! - `GET /api/sessions/:id/current` - what the main area shows

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::{parse_history_index, parse_session_id, ApiContext};
use crate::pipeline::tutor::{Exchange, HistoryEntry};

#[derive(Serialize)]
pub struct SessionCreated {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct HistoryItem {
    pub index: usize,
    pub query: String,
}

#[derive(Serialize)]
pub struct HistoryList {
    pub entries: Vec<HistoryItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<usize>,
}

#[derive(Serialize)]
pub struct HistoryDetail {
    pub index: usize,
    pub query: String,
    pub response: String,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct CurrentView {
    pub current: Option<Exchange>,
}

/// `POST /api/sessions`
pub async fn create(
    State(ctx): State<ApiContext>,
) -> Result<(StatusCode, Json<SessionCreated>), ApiError> {
    let id = ctx.core.create_session()?;
    Ok((
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id: id.to_string(),
        }),
    ))
}

/// `DELETE /api/sessions/:id`
pub async fn end(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_session_id(&id)?;
    ctx.core.end_session(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/sessions/:id/history`
pub async fn history(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<HistoryList>, ApiError> {
    let id = parse_session_id(&id)?;
    let list = ctx.core.with_session(&id, |session| HistoryList {
        entries: session
            .history()
            .all()
            .iter()
            .enumerate()
            .map(|(index, entry)| HistoryItem {
                index,
                query: entry.query.clone(),
            })
            .collect(),
        selected: session.selected(),
    })?;
    Ok(Json(list))
}

impl HistoryDetail {
    fn new(index: usize, entry: &HistoryEntry) -> Self {
        Self {
            index,
            query: entry.query.clone(),
            response: entry.response.clone(),
            created_at: entry.created_at.to_rfc3339(),
        }
    }
}

fn entry_not_found(index: usize) -> ApiError {
    ApiError::NotFound(format!("History entry {index} not found"))
}

/// `GET /api/sessions/:id/history/:index`
pub async fn history_entry(
    State(ctx): State<ApiContext>,
    Path((id, index)): Path<(String, String)>,
) -> Result<Json<HistoryDetail>, ApiError> {
    let id = parse_session_id(&id)?;
    let index = parse_history_index(&index)?;
    let detail = ctx.core.with_session(&id, |session| {
        session
            .history()
            .get(index)
            .map(|entry| HistoryDetail::new(index, entry))
    })?;
    detail.map(Json).ok_or_else(|| entry_not_found(index))
}

/// `POST /api/sessions/:id/history/:index/select` - marks the entry selected
/// and makes it the current view.
pub async fn select_entry(
    State(ctx): State<ApiContext>,
    Path((id, index)): Path<(String, String)>,
) -> Result<Json<HistoryDetail>, ApiError> {
    let id = parse_session_id(&id)?;
    let index = parse_history_index(&index)?;
    let detail = ctx.core.with_session(&id, |session| {
        session
            .select(index)
            .map(|entry| HistoryDetail::new(index, entry))
    })?;
    detail.map(Json).ok_or_else(|| entry_not_found(index))
}

/// `GET /api/sessions/:id/current`
pub async fn current(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<CurrentView>, ApiError> {
    let id = parse_session_id(&id)?;
    let current = ctx.core.with_session(&id, |session| session.current().cloned())?;
    Ok(Json(CurrentView { current }))
}
