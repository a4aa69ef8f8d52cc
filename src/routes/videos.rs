//! Video endpoints: listing/search, publish, fetch, update, delete

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::AppState;
use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::domain::videos;
use crate::routes::auth::AuthUser;
use crate::routes::upload::{collect_fields, require_text};
use crate::services::error::{ApiError, LogErr};
use crate::storage::{build_object_path, get_extension};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/videos/videoActions",
            get(list_videos).post(publish_video),
        )
        .route(
            "/videos/{videoId}",
            get(get_video).patch(update_video),
        )
        .route(
            "/videos/{videoId}/{userId}",
            axum::routing::delete(delete_video),
        )
        .route("/videos/users/{userId}", get(get_users_videos))
}

#[derive(Deserialize)]
struct ListVideosQuery {
    page: Option<i64>,
    limit: Option<i64>,
    query: Option<String>,
    #[serde(rename = "sortBy")]
    sort_by: Option<String>,
    #[serde(rename = "sortType")]
    sort_type: Option<String>,
    #[serde(rename = "userId")]
    user_id: Option<i64>,
}

/// Offset pagination metadata: 1-based page, clamped limit, page count
pub fn page_window(page: Option<i64>, limit: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;
    (page, limit, offset)
}

pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total == 0 { 0 } else { (total + limit - 1) / limit }
}

/// GET /videos/videoActions - paginated listing with title search, owner
/// filter and caller-chosen sort
async fn list_videos(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListVideosQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (page, limit, offset) = page_window(query.page, query.limit);
    let title_query = query
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty());
    let sort_by = query.sort_by.as_deref().unwrap_or("createdAt");
    let sort_type = query.sort_type.as_deref().unwrap_or("desc");

    let total = videos::count_videos(&state.db, title_query, query.user_id)
        .await
        .or_500("Count videos error")?;

    let page_items = videos::list_videos(
        &state.db,
        title_query,
        query.user_id,
        sort_by,
        sort_type,
        limit,
        offset,
    )
    .await
    .or_500("List videos error")?;

    Ok(Json(json!({
        "success": true,
        "count": page_items.len(),
        "page": page,
        "totalPages": total_pages(total, limit),
        "data": page_items,
    })))
}

/// POST /videos/videoActions - multipart publish: videoFile (required),
/// thumbnail (optional), title/description/duration fields
async fn publish_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let (texts, files) = collect_fields(multipart).await?;

    let title = require_text(&texts, "title")?;
    let description = texts.get("description").map(String::as_str).unwrap_or("");
    let duration: f64 = texts
        .get("duration")
        .and_then(|d| d.trim().parse().ok())
        .unwrap_or(0.0);

    let video_file = files
        .get("videoFile")
        .ok_or_else(|| ApiError::bad_request("Video file is required"))?;

    let user_key = format!("user_{}", user_id);

    let video_path = build_object_path(
        "videos",
        &user_key,
        get_extension(&video_file.content_type),
    );
    let video_url = state
        .storage
        .stage_and_upload(&video_path, &video_file.data)
        .await
        .or_500("Video upload error")?;

    let thumbnail_url = match files.get("thumbnail") {
        Some(thumb) => {
            let thumb_path = build_object_path(
                "thumbnails",
                &user_key,
                get_extension(&thumb.content_type),
            );
            state
                .storage
                .stage_and_upload(&thumb_path, &thumb.data)
                .await
                .or_500("Thumbnail upload error")?
        }
        None => String::new(),
    };

    let video = videos::create_video(
        &state.db,
        &video_url,
        &thumbnail_url,
        title,
        description,
        duration,
        user_id,
    )
    .await
    .or_500("Create video error")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": video })),
    ))
}

/// GET /videos/:videoId
async fn get_video(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Path(video_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let video = videos::get_video_by_id(&state.db, video_id)
        .await
        .or_500("Get video error")?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    Ok(Json(json!({ "success": true, "data": video })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateVideoRequest {
    title: Option<String>,
    description: Option<String>,
    thumbnail: Option<String>,
    #[serde(rename = "isPublished")]
    is_published: Option<bool>,
}

/// PATCH /videos/:videoId - owner-only field updates
async fn update_video(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(video_id): Path<i64>,
    Json(req): Json<UpdateVideoRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let video = videos::update_video(
        &state.db,
        video_id,
        user_id,
        req.title.as_deref(),
        req.description.as_deref(),
        req.thumbnail.as_deref(),
        req.is_published,
    )
    .await
    .or_500("Update video error")?
    .ok_or_else(|| ApiError::not_found("Video not found"))?;

    Ok(Json(json!({ "success": true, "data": video })))
}

/// DELETE /videos/:videoId/:userId - the path userId must be the caller.
/// Comments on the video survive with their video reference cleared;
/// like/view/watch-history/playlist rows go with the video.
async fn delete_video(
    State(state): State<Arc<AppState>>,
    AuthUser(auth_user_id): AuthUser,
    Path((video_id, user_id)): Path<(i64, i64)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if user_id != auth_user_id {
        return Err(ApiError::unauthorized("Unauthorized request"));
    }

    let deleted = videos::delete_video(&state.db, video_id, auth_user_id)
        .await
        .or_500("Delete video error")?;

    if !deleted {
        return Err(ApiError::not_found("Video not found"));
    }

    Ok(Json(json!({ "success": true, "data": {} })))
}

/// GET /videos/users/:userId - all of a user's videos, newest first
async fn get_users_videos(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Path(owner_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let items = videos::list_videos_by_owner(&state.db, owner_id)
        .await
        .or_500("List user videos error")?;

    Ok(Json(json!({ "success": true, "data": items })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_defaults() {
        let (page, limit, offset) = page_window(None, None);
        assert_eq!((page, limit, offset), (1, DEFAULT_PAGE_SIZE, 0));
    }

    #[test]
    fn test_page_window_offsets() {
        // page 2 with limit 5 covers items 6-10
        let (page, limit, offset) = page_window(Some(2), Some(5));
        assert_eq!((page, limit, offset), (2, 5, 5));
    }

    #[test]
    fn test_page_window_clamps() {
        let (page, limit, _) = page_window(Some(0), Some(10_000));
        assert_eq!(page, 1);
        assert_eq!(limit, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(12, 5), 3);
        assert_eq!(total_pages(10, 5), 2);
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(1, 5), 1);
    }

    #[test]
    fn test_offset_windows_partition() {
        // successive pages tile the collection without overlap or gaps
        let total = 12;
        let limit = 5;
        let mut seen = Vec::new();
        for page in 1..=total_pages(total, limit) {
            let (_, _, offset) = page_window(Some(page), Some(limit));
            let end = (offset + limit).min(total);
            seen.extend(offset..end);
        }
        assert_eq!(seen, (0..total).collect::<Vec<_>>());
    }
}
