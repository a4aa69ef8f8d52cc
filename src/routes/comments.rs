//! Comment endpoints: add, paginated listing per video, update, delete

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::post,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::AppState;
use crate::domain::{comments, videos};
use crate::routes::auth::AuthUser;
use crate::routes::videos::page_window;
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    // One path template: the id is a videoId for POST/GET and a commentId
    // for PATCH/DELETE.
    Router::new().route(
        "/comments/{id}",
        post(add_comment)
            .get(get_video_comments)
            .patch(update_comment)
            .delete(delete_comment),
    )
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AddCommentRequest {
    content: String,
}

/// POST /comments/:videoId
async fn add_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<i64>,
    Json(req): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Comment content is required"));
    }

    if !videos::video_exists(&state.db, video_id)
        .await
        .or_500("Video lookup error")?
    {
        return Err(ApiError::not_found("Video not found"));
    }

    let comment = comments::create_comment(&state.db, content, video_id, user_id)
        .await
        .or_500("Create comment error")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Comment added successfully",
            "comment": comment,
        })),
    ))
}

#[derive(Deserialize)]
struct ListCommentsQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

/// GET /comments/:videoId?page&limit - newest first with owner projection
async fn get_video_comments(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<i64>,
    Query(query): Query<ListCommentsQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !videos::video_exists(&state.db, video_id)
        .await
        .or_500("Video lookup error")?
    {
        return Err(ApiError::not_found("Video not found"));
    }

    let (page, limit, offset) = page_window(query.page, query.limit);

    let total = comments::count_for_video(&state.db, video_id)
        .await
        .or_500("Count comments error")?;

    let data = comments::list_for_video(&state.db, video_id, limit, offset)
        .await
        .or_500("List comments error")?;

    Ok(Json(json!({
        "success": true,
        "total": total,
        "page": page,
        "limit": limit,
        "data": data,
    })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateCommentRequest {
    content: String,
}

/// PATCH /comments/:commentId - owner only
async fn update_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<i64>,
    Json(req): Json<UpdateCommentRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let content = req.content.trim();
    if content.is_empty() {
        return Err(ApiError::bad_request("Comment content is required"));
    }

    let comment = comments::update_comment(&state.db, comment_id, user_id, content)
        .await
        .or_500("Update comment error")?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(Json(json!({ "success": true, "data": comment })))
}

/// DELETE /comments/:commentId - owner only
async fn delete_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(comment_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = comments::delete_comment(&state.db, comment_id, user_id)
        .await
        .or_500("Delete comment error")?;

    if !deleted {
        return Err(ApiError::not_found("Comment not found"));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Comment deleted successfully",
    })))
}
