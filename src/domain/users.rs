//! User domain - DB queries for users
//!
//! Functions that run a single statement use the generic Executor pattern,
//! allowing them to work with both `&PgPool` and `&mut PgConnection`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, PgPool, Postgres};

#[derive(Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// User fields safe to return to clients. Password hash and refresh token
/// never leave the server.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub fullname: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        PublicUser {
            id: u.id,
            username: u.username,
            email: u.email,
            fullname: u.fullname,
            avatar_url: u.avatar_url,
            cover_image_url: u.cover_image_url,
            created_at: u.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, fullname, password_hash, avatar_url, cover_image_url, refresh_token, created_at";

pub async fn get_user_by_id<'e, E>(executor: E, user_id: i64) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {} FROM users WHERE id = $1",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Look up by username or email; either may be absent.
pub async fn get_user_by_username_or_email<'e, E>(
    executor: E,
    username: Option<&str>,
    email: Option<&str>,
) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {} FROM users WHERE username = LOWER($1) OR email = LOWER($2)",
        USER_COLUMNS
    ))
    .bind(username.unwrap_or(""))
    .bind(email.unwrap_or(""))
    .fetch_optional(executor)
    .await
}

pub async fn username_or_email_taken<'e, E>(
    executor: E,
    username: &str,
    email: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM users WHERE username = LOWER($1) OR email = LOWER($2) LIMIT 1",
    )
    .bind(username)
    .bind(email)
    .fetch_optional(executor)
    .await?;
    Ok(row.is_some())
}

pub async fn create_user<'e, E>(
    executor: E,
    username: &str,
    email: &str,
    fullname: &str,
    password_hash: &str,
    avatar_url: &str,
    cover_image_url: Option<&str>,
) -> Result<User, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        r#"
        INSERT INTO users (username, email, fullname, password_hash, avatar_url, cover_image_url)
        VALUES (LOWER($1), LOWER($2), $3, $4, $5, $6)
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(username)
    .bind(email)
    .bind(fullname)
    .bind(password_hash)
    .bind(avatar_url)
    .bind(cover_image_url)
    .fetch_one(executor)
    .await
}

/// Store or clear the user's single active refresh token
pub async fn set_refresh_token<'e, E>(
    executor: E,
    user_id: i64,
    token: Option<&str>,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE users SET refresh_token = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(token)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn update_password<'e, E>(
    executor: E,
    user_id: i64,
    password_hash: &str,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn update_account_details<'e, E>(
    executor: E,
    user_id: i64,
    fullname: &str,
    email: &str,
    username: Option<&str>,
) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        r#"
        UPDATE users SET
            fullname = $2,
            email = LOWER($3),
            username = COALESCE(LOWER($4), username),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {}
        "#,
        USER_COLUMNS
    ))
    .bind(user_id)
    .bind(fullname)
    .bind(email)
    .bind(username)
    .fetch_optional(executor)
    .await
}

pub async fn update_avatar<'e, E>(
    executor: E,
    user_id: i64,
    avatar_url: &str,
) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "UPDATE users SET avatar_url = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(user_id)
    .bind(avatar_url)
    .fetch_optional(executor)
    .await
}

pub async fn update_cover_image<'e, E>(
    executor: E,
    user_id: i64,
    cover_image_url: &str,
) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "UPDATE users SET cover_image_url = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
        USER_COLUMNS
    ))
    .bind(user_id)
    .bind(cover_image_url)
    .fetch_optional(executor)
    .await
}

/// Channel profile: public fields plus subscription aggregates and whether
/// the requesting user is subscribed.
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChannelProfile {
    pub id: i64,
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
    pub subscribers_count: i64,
    pub channel_subscribed_to_count: i64,
    pub is_subscribed: bool,
}

pub async fn get_channel_profile(
    db: &PgPool,
    username: &str,
    viewer_id: i64,
) -> Result<Option<ChannelProfile>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            u.id, u.username, u.fullname, u.email, u.avatar_url, u.cover_image_url,
            (SELECT COUNT(*) FROM subscriptions s WHERE s.channel_id = u.id) AS subscribers_count,
            (SELECT COUNT(*) FROM subscriptions s WHERE s.subscriber_id = u.id) AS channel_subscribed_to_count,
            EXISTS(
                SELECT 1 FROM subscriptions s
                WHERE s.channel_id = u.id AND s.subscriber_id = $2
            ) AS is_subscribed
        FROM users u
        WHERE u.username = LOWER($1)
        "#,
    )
    .bind(username)
    .bind(viewer_id)
    .fetch_optional(db)
    .await
}

/// A watch-history entry: the video plus a projection of its owner
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WatchHistoryEntry {
    pub id: i64,
    pub video_url: String,
    pub thumbnail_url: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub watched_at: DateTime<Utc>,
    pub owner_id: i64,
    pub owner_username: String,
    pub owner_fullname: String,
    pub owner_avatar_url: String,
}

pub async fn get_watch_history(
    db: &PgPool,
    user_id: i64,
) -> Result<Vec<WatchHistoryEntry>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            v.id, v.video_url, v.thumbnail_url, v.title, v.description,
            v.duration, v.views, h.watched_at,
            o.id AS owner_id, o.username AS owner_username,
            o.fullname AS owner_fullname, o.avatar_url AS owner_avatar_url
        FROM watch_history h
        JOIN videos v ON v.id = h.video_id
        JOIN users o ON o.id = v.owner_id
        WHERE h.user_id = $1
        ORDER BY h.watched_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// Record (or refresh) a watch-history entry for the user
pub async fn touch_watch_history<'e, E>(
    executor: E,
    user_id: i64,
    video_id: i64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO watch_history (user_id, video_id)
        VALUES ($1, $2)
        ON CONFLICT (user_id, video_id) DO UPDATE SET watched_at = NOW()
        "#,
    )
    .bind(user_id)
    .bind(video_id)
    .execute(executor)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::error::is_unique_violation;

    #[sqlx::test]
    async fn test_duplicate_identity_hits_unique_index(pool: PgPool) {
        create_user(
            &pool,
            "alice",
            "alice@example.com",
            "Alice",
            "hash",
            "http://localhost/a.png",
            None,
        )
        .await
        .unwrap();

        // same username, different email: blocked by the index even
        // though a taken-check raced past
        let err = create_user(
            &pool,
            "alice",
            "other@example.com",
            "Alice",
            "hash",
            "http://localhost/a.png",
            None,
        )
        .await
        .unwrap_err();

        assert!(is_unique_violation(&err));
    }
}
