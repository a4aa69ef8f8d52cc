//! Session management: JWT access and refresh tokens
//!
//! Access and refresh tokens are both HS256 JWTs signed with separate
//! secrets. A user has at most one active refresh token, stored on the
//! users row; presenting any other (even validly signed) refresh token is
//! rejected, which makes rotation single-use.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::constants::{ACCESS_TOKEN_EXPIRY_MINUTES, REFRESH_TOKEN_EXPIRY_DAYS};
use crate::domain::users;

/// JWT claims shared by access and refresh tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id as string
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Debug)]
pub enum SessionError {
    InvalidToken,
    Expired,
    DatabaseError(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::InvalidToken => write!(f, "Invalid token"),
            SessionError::Expired => write!(f, "Token expired"),
            SessionError::DatabaseError(e) => write!(f, "Database error: {}", e),
        }
    }
}

fn sign(user_id: i64, username: &str, lifetime: Duration, secret: &[u8]) -> Result<String, SessionError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: (now + lifetime).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|_| SessionError::InvalidToken)
}

fn verify(token: &str, secret: &[u8]) -> Result<i64, SessionError> {
    // Pin HS256 explicitly to prevent algorithm confusion attacks
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp", "sub", "iat"]);

    let token_data =
        decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
                _ => SessionError::InvalidToken,
            }
        })?;

    token_data
        .claims
        .sub
        .parse::<i64>()
        .map_err(|_| SessionError::InvalidToken)
}

/// Create a short-lived JWT access token
pub fn create_access_token(
    user_id: i64,
    username: &str,
    secret: &[u8],
) -> Result<String, SessionError> {
    sign(
        user_id,
        username,
        Duration::minutes(ACCESS_TOKEN_EXPIRY_MINUTES),
        secret,
    )
}

/// Create a long-lived JWT refresh token
pub fn create_refresh_token(
    user_id: i64,
    username: &str,
    secret: &[u8],
) -> Result<String, SessionError> {
    sign(
        user_id,
        username,
        Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
        secret,
    )
}

/// Validate a JWT access token and return the user_id
pub fn validate_access_token(token: &str, secret: &[u8]) -> Result<i64, SessionError> {
    verify(token, secret)
}

/// Validate a JWT refresh token signature/expiry and return the user_id
pub fn validate_refresh_token(token: &str, secret: &[u8]) -> Result<i64, SessionError> {
    verify(token, secret)
}

/// Issue a fresh access+refresh pair and persist the refresh token as the
/// user's single active one, superseding any previous token.
pub async fn issue_token_pair(
    db: &PgPool,
    user_id: i64,
    username: &str,
    access_secret: &[u8],
    refresh_secret: &[u8],
) -> Result<(String, String), SessionError> {
    let access_token = create_access_token(user_id, username, access_secret)?;
    let refresh_token = create_refresh_token(user_id, username, refresh_secret)?;

    users::set_refresh_token(db, user_id, Some(&refresh_token))
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?;

    Ok((access_token, refresh_token))
}

/// Rotate a refresh token: verify it, check it matches the user's stored
/// token, then issue and store a new pair. Returns (user_id, access, refresh).
pub async fn rotate_refresh_token(
    db: &PgPool,
    presented: &str,
    access_secret: &[u8],
    refresh_secret: &[u8],
) -> Result<(i64, String, String), SessionError> {
    let user_id = validate_refresh_token(presented, refresh_secret)?;

    let user = users::get_user_by_id(db, user_id)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))?
        .ok_or(SessionError::InvalidToken)?;

    // Superseded or revoked tokens still carry a valid signature; the
    // stored copy is the arbiter.
    match user.refresh_token.as_deref() {
        Some(stored) if stored == presented => {}
        _ => return Err(SessionError::InvalidToken),
    }

    let (access_token, refresh_token) =
        issue_token_pair(db, user_id, &user.username, access_secret, refresh_secret).await?;

    Ok((user_id, access_token, refresh_token))
}

/// Clear the user's stored refresh token (logout)
pub async fn revoke_refresh_token(db: &PgPool, user_id: i64) -> Result<(), SessionError> {
    users::set_refresh_token(db, user_id, None)
        .await
        .map_err(|e| SessionError::DatabaseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-secret";
    const OTHER: &[u8] = b"other-secret";

    #[test]
    fn test_access_token_roundtrip() {
        let token = create_access_token(42, "alice", SECRET).unwrap();
        assert_eq!(validate_access_token(&token, SECRET).unwrap(), 42);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_access_token(42, "alice", SECRET).unwrap();
        assert!(matches!(
            validate_access_token(&token, OTHER),
            Err(SessionError::InvalidToken)
        ));
    }

    #[test]
    fn test_refresh_token_not_valid_as_access() {
        // Refresh tokens are signed with a different secret; an access
        // check against the access secret must fail.
        let refresh = create_refresh_token(7, "bob", OTHER).unwrap();
        assert!(validate_access_token(&refresh, SECRET).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(validate_access_token("not-a-jwt", SECRET).is_err());
    }
}
