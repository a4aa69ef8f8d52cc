//! Playlist endpoints: create, fetch with videos, membership, update, delete

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
use crate::domain::{playlists, videos};
use crate::routes::auth::AuthUser;
use crate::services::error::{ApiError, LogErr};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/playlist", post(create_playlist))
        .route(
            "/playlist/{playlistId}",
            get(get_playlist_by_id)
                .patch(update_playlist)
                .delete(delete_playlist),
        )
        .route("/playlist/user/{userId}", get(get_user_playlists))
        .route(
            "/playlist/add/{videoId}/{playlistId}",
            patch(add_video_to_playlist),
        )
        .route(
            "/playlist/remove/{videoId}/{playlistId}",
            patch(remove_video_from_playlist),
        )
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct CreatePlaylistRequest {
    name: String,
    description: Option<String>,
}

/// POST /playlist
async fn create_playlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<CreatePlaylistRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Playlist name is required"));
    }
    let description = req.description.as_deref().map(str::trim).unwrap_or("");

    let playlist = playlists::create_playlist(&state.db, name, description, user_id)
        .await
        .or_500("Create playlist error")?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": playlist })),
    ))
}

/// GET /playlist/:playlistId - playlist with its videos in order
async fn get_playlist_by_id(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Path(playlist_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let playlist = playlists::get_playlist_by_id(&state.db, playlist_id)
        .await
        .or_500("Get playlist error")?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    let playlist_videos = playlists::list_playlist_videos(&state.db, playlist_id)
        .await
        .or_500("List playlist videos error")?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "playlist": playlist,
            "videos": playlist_videos,
        },
    })))
}

/// GET /playlist/user/:userId - a user's playlists, newest first
async fn get_user_playlists(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Path(owner_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let items = playlists::list_playlists_by_owner(&state.db, owner_id)
        .await
        .or_500("List playlists error")?;

    Ok(Json(json!({ "success": true, "data": items })))
}

/// PATCH /playlist/add/:videoId/:playlistId - append to the playlist,
/// owner only; duplicate adds are rejected
async fn add_video_to_playlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path((video_id, playlist_id)): Path<(i64, i64)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let playlist = playlists::get_playlist_by_id(&state.db, playlist_id)
        .await
        .or_500("Get playlist error")?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    if playlist.owner_id != user_id {
        return Err(ApiError::not_found("Playlist not found"));
    }

    if playlists::playlist_contains_video(&state.db, playlist_id, video_id)
        .await
        .or_500("Playlist membership error")?
    {
        return Err(ApiError::bad_request("Video already exists in the playlist"));
    }

    if !videos::video_exists(&state.db, video_id)
        .await
        .or_500("Video lookup error")?
    {
        return Err(ApiError::not_found("Video not found"));
    }

    playlists::add_video_to_playlist(&state.db, playlist_id, video_id)
        .await
        .or_500("Add video to playlist error")?;

    Ok(Json(json!({
        "success": true,
        "message": "Video added to playlist successfully",
    })))
}

/// PATCH /playlist/remove/:videoId/:playlistId - owner only
async fn remove_video_from_playlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path((video_id, playlist_id)): Path<(i64, i64)>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let playlist = playlists::get_playlist_by_id(&state.db, playlist_id)
        .await
        .or_500("Get playlist error")?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    if playlist.owner_id != user_id {
        return Err(ApiError::not_found("Playlist not found"));
    }

    let removed = playlists::remove_video_from_playlist(&state.db, playlist_id, video_id)
        .await
        .or_500("Remove video from playlist error")?;

    if !removed {
        return Err(ApiError::not_found("Video not found in the playlist"));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Video removed from playlist successfully",
    })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdatePlaylistRequest {
    name: Option<String>,
    description: Option<String>,
}

/// PATCH /playlist/:playlistId - owner only
async fn update_playlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(playlist_id): Path<i64>,
    Json(req): Json<UpdatePlaylistRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let playlist = playlists::update_playlist(
        &state.db,
        playlist_id,
        user_id,
        req.name.as_deref().map(str::trim),
        req.description.as_deref().map(str::trim),
    )
    .await
    .or_500("Update playlist error")?
    .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    Ok(Json(json!({ "success": true, "data": playlist })))
}

/// DELETE /playlist/:playlistId - owner only
async fn delete_playlist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(playlist_id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let deleted = playlists::delete_playlist(&state.db, playlist_id, user_id)
        .await
        .or_500("Delete playlist error")?;

    if !deleted {
        return Err(ApiError::not_found("Playlist not found"));
    }

    Ok(Json(json!({
        "success": true,
        "message": "Playlist deleted successfully",
    })))
}
