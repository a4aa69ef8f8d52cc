//! Subscription toggle and listing endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;

use crate::AppState;
use crate::domain::{subscriptions, users};
use crate::routes::auth::AuthUser;
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/subscriptions/c/{channelId}",
            post(toggle_subscription).get(get_channel_subscribers),
        )
        .route(
            "/subscriptions/u/{subscriberId}",
            get(get_subscribed_channels),
        )
}

/// POST /subscriptions/c/:channelId - subscribe or unsubscribe the caller
async fn toggle_subscription(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(channel_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if users::get_user_by_id(&state.db, channel_id)
        .await
        .or_500("Channel lookup error")?
        .is_none()
    {
        return Err(ApiError::not_found("Channel not found"));
    }

    let removed = subscriptions::unsubscribe(&state.db, user_id, channel_id)
        .await
        .or_500("Unsubscribe error")?;

    if removed {
        return Ok(Json(json!({
            "success": true,
            "message": "Unsubscribed from channel successfully",
        })));
    }

    let subscription = subscriptions::subscribe(&state.db, user_id, channel_id)
        .await
        .or_500("Subscribe error")?;

    Ok(Json(json!({
        "success": true,
        "message": "Subscribed to channel successfully",
        "data": subscription,
    })))
}

/// GET /subscriptions/c/:channelId - users subscribed to the channel
async fn get_channel_subscribers(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Path(channel_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let subscribers = subscriptions::list_subscribers(&state.db, channel_id)
        .await
        .or_500("List subscribers error")?;

    Ok(Json(json!({ "success": true, "data": subscribers })))
}

/// GET /subscriptions/u/:subscriberId - channels the user subscribes to
async fn get_subscribed_channels(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Path(subscriber_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let channels = subscriptions::list_subscribed_channels(&state.db, subscriber_id)
        .await
        .or_500("List subscribed channels error")?;

    Ok(Json(json!({ "success": true, "data": channels })))
}
