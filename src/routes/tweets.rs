//! Tweet endpoints: create, list by user, update, delete

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::AppState;
use crate::domain::tweets;
use crate::routes::auth::AuthUser;
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tweets", post(create_tweet))
        .route("/tweets/user/{userId}", get(get_user_tweets))
        .route("/tweets/{tweetId}", patch(update_tweet).delete(delete_tweet))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TweetRequest {
    content: String,
}

/// POST /tweets
async fn create_tweet(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<TweetRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Tweet content is required"));
    }

    let tweet = tweets::create_tweet(&state.db, content, user_id)
        .await
        .or_500("Create tweet error")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Tweet created successfully",
            "data": tweet,
        })),
    ))
}

/// GET /tweets/user/:userId - newest first
async fn get_user_tweets(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Path(owner_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let items = tweets::list_tweets_by_owner(&state.db, owner_id)
        .await
        .or_500("List tweets error")?;

    Ok(Json(json!({ "success": true, "data": items })))
}

/// PATCH /tweets/:tweetId - owner only
async fn update_tweet(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<i64>,
    Json(req): Json<TweetRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Tweet content is required"));
    }

    let tweet = tweets::update_tweet(&state.db, tweet_id, user_id, content)
        .await
        .or_500("Update tweet error")?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;

    Ok(Json(json!({ "success": true, "data": tweet })))
}

/// DELETE /tweets/:tweetId - owner only
async fn delete_tweet(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = tweets::delete_tweet(&state.db, tweet_id, user_id)
        .await
        .or_500("Delete tweet error")?;

    if !deleted {
        return Err(ApiError::not_found("Tweet not found"));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Tweet deleted successfully",
    })))
}
