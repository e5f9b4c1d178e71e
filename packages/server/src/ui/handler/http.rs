//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{infrastructure::dto::http::HealthDto, ui::state::AppState};

/// Health check endpoint
///
/// Also reports how many sessions are currently registered for live delivery.
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    let sessions = state.disconnect_session_usecase.count_sessions().await;

    Json(HealthDto {
        status: "ok".to_string(),
        sessions,
    })
}
