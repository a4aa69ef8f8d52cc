//! User profile endpoints: current user, account updates, channel profile,
//! watch history

use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    routing::{get, patch},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use crate::AppState;
use crate::domain::users::{self, PublicUser};
use crate::routes::auth::AuthUser;
use crate::routes::upload::collect_fields;
use crate::services::error::{ApiError, LogErr, is_unique_violation};
use crate::storage::{build_object_path, get_extension};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/current-user", get(get_current_user))
        .route("/users/update-account", patch(update_account))
        .route("/users/avatar", patch(update_avatar))
        .route("/users/cover-image", patch(update_cover_image))
        .route("/users/c/{username}", get(get_channel_profile))
        .route("/users/history", get(get_watch_history))
}

/// GET /users/current-user
async fn get_current_user(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = users::get_user_by_id(&state.db, user_id)
        .await
        .or_500("Get user error")?
        .ok_or_else(|| ApiError::unauthorized("Unauthorized request"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Current user fetched successfully",
        "data": PublicUser::from(user),
    })))
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateAccountRequest {
    fullname: String,
    email: String,
    username: Option<String>,
}

/// PATCH /users/update-account
async fn update_account(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<UpdateAccountRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.fullname.trim().is_empty() || req.email.trim().is_empty() {
        return Err(ApiError::bad_request("All fields are required"));
    }

    let user = match users::update_account_details(
        &state.db,
        user_id,
        req.fullname.trim(),
        req.email.trim(),
        req.username.as_deref().map(str::trim),
    )
    .await
    {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict("Email or username already in use"));
        }
        Err(e) => return Err(ApiError::internal("Update account error", e)),
    }
    .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Account details updated successfully",
        "data": PublicUser::from(user),
    })))
}

/// Pull a single named image out of a multipart body and push it to storage
async fn upload_single_image(
    state: &AppState,
    user_id: i64,
    multipart: Multipart,
    field: &str,
    kind: &str,
) -> Result<String, ApiError> {
    let (_texts, files) = collect_fields(multipart).await?;

    let file = files
        .get(field)
        .ok_or_else(|| ApiError::bad_request(format!("{} file is missing", field)))?;

    let path = build_object_path(
        kind,
        &format!("user_{}", user_id),
        get_extension(&file.content_type),
    );

    state
        .storage
        .stage_and_upload(&path, &file.data)
        .await
        .or_500("Image upload error")
}

/// PATCH /users/avatar - multipart with an `avatar` file
async fn update_avatar(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let avatar_url = upload_single_image(&state, user_id, multipart, "avatar", "avatars").await?;

    let user = users::update_avatar(&state.db, user_id, &avatar_url)
        .await
        .or_500("Update avatar error")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Avatar image updated successfully",
        "data": PublicUser::from(user),
    })))
}

/// PATCH /users/cover-image - multipart with a `coverImage` file
async fn update_cover_image(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let cover_url =
        upload_single_image(&state, user_id, multipart, "coverImage", "covers").await?;

    let user = users::update_cover_image(&state.db, user_id, &cover_url)
        .await
        .or_500("Update cover image error")?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(Json(json!({
        "success": true,
        "message": "Cover image updated successfully",
        "data": PublicUser::from(user),
    })))
}

/// GET /users/c/:username - channel profile with subscription aggregates
async fn get_channel_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(viewer_id): AuthUser,
    Path(username): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ApiError::bad_request("Username is missing"));
    }

    let channel = users::get_channel_profile(&state.db, username, viewer_id)
        .await
        .or_500("Channel profile error")?
        .ok_or_else(|| ApiError::not_found("Channel does not exist"))?;

    Ok(Json(json!({
        "success": true,
        "message": "User channel fetched successfully",
        "data": channel,
    })))
}

/// GET /users/history - the caller's watch history, most recent first
async fn get_watch_history(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let history = users::get_watch_history(&state.db, user_id)
        .await
        .or_500("Watch history error")?;

    Ok(Json(json!({
        "success": true,
        "message": "Watch history fetched successfully",
        "data": history,
    })))
}
