//! Static page furniture: title, greeting, instructions.

use axum::Json;
use serde::Serialize;

use crate::config;

#[derive(Serialize)]
pub struct WelcomeResponse {
    pub title: &'static str,
    pub greeting: &'static str,
    pub instructions: &'static [&'static str],
}

/// `GET /api/welcome`
pub async fn welcome() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        title: config::APP_TITLE,
        greeting: config::GREETING,
        instructions: config::INSTRUCTIONS,
    })
}
