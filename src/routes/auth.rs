//! Authentication and session management endpoints

use axum::{
    Json, Router,
    extract::{FromRequestParts, Multipart, State},
    http::{StatusCode, header::SET_COOKIE, request::Parts},
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};

use crate::AppState;
use crate::domain::users::{self, PublicUser};
use crate::routes::upload::{collect_fields, require_text};
use crate::services::error::{ApiError, LogErr, is_unique_violation};
use crate::services::{cookies, password, session};
use crate::storage::{build_object_path, get_extension};

pub fn routes() -> Router<Arc<AppState>> {
    // Rate limit auth endpoints to slow brute force attempts
    let rate_limit_config = GovernorConfigBuilder::default()
        .per_second(6)
        .burst_size(10)
        .key_extractor(SmartIpKeyExtractor)
        .finish()
        .expect("Failed to build rate limit config");

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config.into(),
    };

    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/logout", post(logout))
        .route("/users/refresh-token", post(refresh_token))
        .route("/users/change-password", post(change_password))
        .layer(rate_limit_layer)
}

// ============================================================================
// Auth Extractor - validates the access token and extracts the user_id
// ============================================================================

/// Extractor that validates the accessToken cookie (or a Bearer header)
/// and returns the user_id
pub struct AuthUser(pub i64);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::internal("Cookie extraction error", format!("{:?}", e)))?;

        let bearer = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        let access_token = jar
            .get(cookies::config::ACCESS_TOKEN_NAME)
            .map(|c| c.value())
            .or(bearer)
            .ok_or_else(|| ApiError::unauthorized("Unauthorized request"))?;

        let user_id = session::validate_access_token(access_token, &state.jwt_secret)
            .map_err(|_| ApiError::unauthorized("Invalid access token"))?;

        Ok(AuthUser(user_id))
    }
}

fn set_cookie_header(value: Result<axum::http::HeaderValue, StatusCode>) -> Result<axum::http::HeaderValue, ApiError> {
    value.map_err(|_| ApiError::internal("Cookie build error", "could not format cookie"))
}

// ============================================================================
// Registration and login
// ============================================================================

/// POST /users/register - multipart: account fields + avatar (required) and
/// coverImage (optional)
async fn register(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let (texts, files) = collect_fields(multipart).await?;

    let fullname = require_text(&texts, "fullname").map_err(|_| ApiError::bad_request("All fields are required"))?;
    let email = require_text(&texts, "email").map_err(|_| ApiError::bad_request("All fields are required"))?;
    let username = require_text(&texts, "username").map_err(|_| ApiError::bad_request("All fields are required"))?;
    let plain_password = require_text(&texts, "password").map_err(|_| ApiError::bad_request("All fields are required"))?;

    if users::username_or_email_taken(&state.db, username, email)
        .await
        .or_500("Check existing user error")?
    {
        return Err(ApiError::conflict(
            "User with email or username already exists",
        ));
    }

    let avatar = files
        .get("avatar")
        .ok_or_else(|| ApiError::bad_request("Avatar file is required"))?;

    let avatar_path = build_object_path(
        "avatars",
        &username.to_lowercase(),
        get_extension(&avatar.content_type),
    );
    let avatar_url = state
        .storage
        .stage_and_upload(&avatar_path, &avatar.data)
        .await
        .or_500("Avatar upload error")?;

    let cover_image_url = match files.get("coverImage") {
        Some(cover) => {
            let cover_path = build_object_path(
                "covers",
                &username.to_lowercase(),
                get_extension(&cover.content_type),
            );
            Some(
                state
                    .storage
                    .stage_and_upload(&cover_path, &cover.data)
                    .await
                    .or_500("Cover image upload error")?,
            )
        }
        None => None,
    };

    let password_hash =
        password::hash_password(plain_password).or_500("Password hash error")?;

    // The taken-check above is only a fast path; a concurrent register
    // lands on the unique index instead.
    let user = match users::create_user(
        &state.db,
        username,
        email,
        fullname,
        &password_hash,
        &avatar_url,
        cover_image_url.as_deref(),
    )
    .await
    {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Err(ApiError::conflict(
                "User with email or username already exists",
            ));
        }
        Err(e) => return Err(ApiError::internal("Create user error", e)),
    };

    let body = Json(json!({
        "success": true,
        "message": "User registered successfully",
        "data": PublicUser::from(user),
    }));

    Ok((StatusCode::CREATED, body).into_response())
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct LoginRequest {
    username: Option<String>,
    email: Option<String>,
    password: String,
}

/// POST /users/login - verify credentials, set session cookies.
/// Unknown user and wrong password are indistinguishable to the caller.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    if req.username.is_none() && req.email.is_none() {
        return Err(ApiError::bad_request("Username or email is required"));
    }

    let user = users::get_user_by_username_or_email(
        &state.db,
        req.username.as_deref(),
        req.email.as_deref(),
    )
    .await
    .or_500("Find user error")?;

    let user = match user {
        Some(u) if password::verify_password(&req.password, &u.password_hash) => u,
        _ => return Err(ApiError::unauthorized("Invalid user credentials")),
    };

    let (access_token, refresh_token) = session::issue_token_pair(
        &state.db,
        user.id,
        &user.username,
        &state.jwt_secret,
        &state.refresh_secret,
    )
    .await
    .or_500("Issue token pair error")?;

    let body = Json(json!({
        "success": true,
        "message": "User logged in successfully",
        "data": {
            "user": PublicUser::from(user),
            "accessToken": access_token,
            "refreshToken": refresh_token,
        },
    }));

    let mut response = body.into_response();
    response.headers_mut().append(
        SET_COOKIE,
        set_cookie_header(cookies::build_access_cookie(&access_token))?,
    );
    response.headers_mut().append(
        SET_COOKIE,
        set_cookie_header(cookies::build_refresh_cookie(&refresh_token))?,
    );

    Ok(response)
}

/// POST /users/logout - revoke the stored refresh token and clear cookies
async fn logout(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
) -> Result<Response, ApiError> {
    if let Err(e) = session::revoke_refresh_token(&state.db, user_id).await {
        // Still log the user out client-side
        eprintln!("Failed to revoke refresh token during logout: {}", e);
    }

    let body = Json(json!({
        "success": true,
        "message": "User logged out",
        "data": { "userId": user_id },
    }));

    let mut response = body.into_response();
    response
        .headers_mut()
        .append(SET_COOKIE, cookies::build_clear_access_cookie());
    response
        .headers_mut()
        .append(SET_COOKIE, cookies::build_clear_refresh_cookie());

    Ok(response)
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RefreshRequest {
    #[serde(rename = "refreshToken")]
    refresh_token: String,
}

/// POST /users/refresh-token - rotate the refresh token; the presented
/// token must be the user's single active one
async fn refresh_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    body: Option<Json<RefreshRequest>>,
) -> Result<Response, ApiError> {
    let presented = jar
        .get(cookies::config::REFRESH_TOKEN_NAME)
        .map(|c| c.value().to_string())
        .or_else(|| body.map(|Json(b)| b.refresh_token))
        .ok_or_else(|| ApiError::unauthorized("Unauthorized request"))?;

    let (_user_id, access_token, new_refresh_token) = session::rotate_refresh_token(
        &state.db,
        &presented,
        &state.jwt_secret,
        &state.refresh_secret,
    )
    .await
    .map_err(|_| ApiError::unauthorized("Refresh token is expired or used"))?;

    let response_body = Json(json!({
        "success": true,
        "message": "Access token refreshed",
        "data": {
            "accessToken": access_token,
            "refreshToken": new_refresh_token,
        },
    }));

    let mut response = response_body.into_response();
    response.headers_mut().append(
        SET_COOKIE,
        set_cookie_header(cookies::build_access_cookie(&access_token))?,
    );
    response.headers_mut().append(
        SET_COOKIE,
        set_cookie_header(cookies::build_refresh_cookie(&new_refresh_token))?,
    );

    Ok(response)
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ChangePasswordRequest {
    #[serde(rename = "oldPassword")]
    old_password: String,
    #[serde(rename = "newPassword")]
    new_password: String,
}

/// POST /users/change-password
async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.new_password.trim().is_empty() {
        return Err(ApiError::bad_request("New password is required"));
    }

    let user = users::get_user_by_id(&state.db, user_id)
        .await
        .or_500("Get user error")?
        .ok_or_else(|| ApiError::unauthorized("Unauthorized request"))?;

    if !password::verify_password(&req.old_password, &user.password_hash) {
        return Err(ApiError::bad_request("Invalid old password"));
    }

    let new_hash = password::hash_password(&req.new_password).or_500("Password hash error")?;
    users::update_password(&state.db, user_id, &new_hash)
        .await
        .or_500("Update password error")?;

    Ok(Json(json!({
        "success": true,
        "message": "Password changed successfully",
    })))
}
