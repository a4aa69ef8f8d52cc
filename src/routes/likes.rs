//! Like toggle endpoints for videos, comments and tweets

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;

use crate::AppState;
use crate::domain::likes::{self, LikeTarget};
use crate::domain::{comments, tweets, videos};
use crate::routes::auth::AuthUser;
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/likes/toggle/v/{videoId}", post(toggle_video_like))
        .route("/likes/toggle/c/{commentId}", post(toggle_comment_like))
        .route("/likes/toggle/t/{tweetId}", post(toggle_tweet_like))
        .route("/likes/videos/{videoId}", get(get_liked_video))
}

/// Shared toggle: remove the like if present, otherwise add it. Returns
/// the response envelope for either outcome.
async fn toggle(
    state: &AppState,
    target: LikeTarget,
    subject_id: i64,
    user_id: i64,
    liked_msg: &str,
    unliked_msg: &str,
) -> Result<Json<serde_json::Value>, ApiError> {
    let removed = likes::remove_like(&state.db, target, subject_id, user_id)
        .await
        .or_500("Remove like error")?;

    if removed {
        return Ok(Json(json!({ "success": true, "message": unliked_msg })));
    }

    // None here means a concurrent toggle inserted first; report liked
    // either way since the end state is the same.
    let like = likes::add_like(&state.db, target, subject_id, user_id)
        .await
        .or_500("Add like error")?;

    Ok(Json(json!({
        "success": true,
        "message": liked_msg,
        "data": like,
    })))
}

/// POST /likes/toggle/v/:videoId
async fn toggle_video_like(
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

    toggle(
        &state,
        LikeTarget::Video,
        video_id,
        user_id,
        "Video liked successfully",
        "Video unliked successfully",
    )
    .await
}

/// POST /likes/toggle/c/:commentId
async fn toggle_comment_like(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !comments::comment_exists(&state.db, comment_id)
        .await
        .or_500("Comment lookup error")?
    {
        return Err(ApiError::not_found("Comment not found"));
    }

    toggle(
        &state,
        LikeTarget::Comment,
        comment_id,
        user_id,
        "Comment liked successfully",
        "Comment like removed successfully",
    )
    .await
}

/// POST /likes/toggle/t/:tweetId
async fn toggle_tweet_like(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(tweet_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !tweets::tweet_exists(&state.db, tweet_id)
        .await
        .or_500("Tweet lookup error")?
    {
        return Err(ApiError::not_found("Tweet not found"));
    }

    toggle(
        &state,
        LikeTarget::Tweet,
        tweet_id,
        user_id,
        "Tweet liked successfully",
        "Tweet unliked successfully",
    )
    .await
}

/// GET /likes/videos/:videoId - the caller's like on this video, with the
/// video joined in
async fn get_liked_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let liked = likes::get_liked_video(&state.db, video_id, user_id)
        .await
        .or_500("Liked videos error")?;

    if liked.is_empty() {
        return Ok(Json(json!({
            "success": true,
            "message": "No liked videos found",
        })));
    }

    Ok(Json(json!({ "success": true, "likedVideos": liked })))
}
