//! Per-user view recording

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use serde_json::json;
use std::sync::Arc;

use crate::AppState;
use crate::domain::{users, videos, views};
use crate::routes::auth::AuthUser;
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/view/{videoId}", post(increment_view))
}

/// POST /view/:videoId - first view per (video, user) bumps the counter;
/// repeats are acknowledged without counting. Watch history is refreshed
/// either way.
async fn increment_view(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !videos::video_exists(&state.db, video_id)
        .await
        .or_500("Video lookup error")?
    {
        return Err(ApiError::not_found("Video not found"));
    }

    let view = views::record_view(&state.db, video_id, user_id)
        .await
        .or_500("Record view error")?;

    users::touch_watch_history(&state.db, user_id, video_id)
        .await
        .or_500("Watch history error")?;

    let Some(view) = view else {
        return Ok(Json(json!({
            "success": true,
            "message": "View already recorded",
        })));
    };

    videos::increment_views(&state.db, video_id)
        .await
        .or_500("Increment views error")?;

    Ok(Json(json!({ "success": true, "view": view })))
}
