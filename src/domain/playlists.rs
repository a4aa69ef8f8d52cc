//! Playlist domain - playlists and their ordered video membership

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, PgPool, Postgres};

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A playlist member video in playlist order
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistVideo {
    pub position: i32,
    pub id: i64,
    pub video_url: String,
    pub thumbnail_url: String,
    pub title: String,
    pub duration: f64,
    pub views: i64,
}

pub async fn create_playlist<'e, E>(
    executor: E,
    name: &str,
    description: &str,
    owner_id: i64,
) -> Result<Playlist, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO playlists (name, description, owner_id)
        VALUES ($1, $2, $3)
        RETURNING id, name, description, owner_id, created_at, updated_at
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(owner_id)
    .fetch_one(executor)
    .await
}

pub async fn get_playlist_by_id<'e, E>(
    executor: E,
    playlist_id: i64,
) -> Result<Option<Playlist>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        "SELECT id, name, description, owner_id, created_at, updated_at FROM playlists WHERE id = $1",
    )
    .bind(playlist_id)
    .fetch_optional(executor)
    .await
}

pub async fn list_playlists_by_owner(
    db: &PgPool,
    owner_id: i64,
) -> Result<Vec<Playlist>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, name, description, owner_id, created_at, updated_at
        FROM playlists
        WHERE owner_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(db)
    .await
}

pub async fn list_playlist_videos(
    db: &PgPool,
    playlist_id: i64,
) -> Result<Vec<PlaylistVideo>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            pv.position,
            v.id, v.video_url, v.thumbnail_url, v.title, v.duration, v.views
        FROM playlist_videos pv
        JOIN videos v ON v.id = pv.video_id
        WHERE pv.playlist_id = $1
        ORDER BY pv.position ASC
        "#,
    )
    .bind(playlist_id)
    .fetch_all(db)
    .await
}

pub async fn playlist_contains_video<'e, E>(
    executor: E,
    playlist_id: i64,
    video_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT video_id FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2",
    )
    .bind(playlist_id)
    .bind(video_id)
    .fetch_optional(executor)
    .await?;
    Ok(row.is_some())
}

/// Append a video at the end of the playlist
pub async fn add_video_to_playlist<'e, E>(
    executor: E,
    playlist_id: i64,
    video_id: i64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO playlist_videos (playlist_id, video_id, position)
        SELECT $1, $2, COALESCE(MAX(position), 0) + 1
        FROM playlist_videos WHERE playlist_id = $1
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(playlist_id)
    .bind(video_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn remove_video_from_playlist<'e, E>(
    executor: E,
    playlist_id: i64,
    video_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result =
        sqlx::query("DELETE FROM playlist_videos WHERE playlist_id = $1 AND video_id = $2")
            .bind(playlist_id)
            .bind(video_id)
            .execute(executor)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Update name/description, restricted to the owner; NULL leaves a field
/// unchanged.
pub async fn update_playlist<'e, E>(
    executor: E,
    playlist_id: i64,
    owner_id: i64,
    name: Option<&str>,
    description: Option<&str>,
) -> Result<Option<Playlist>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        UPDATE playlists SET
            name = COALESCE($3, name),
            description = COALESCE($4, description),
            updated_at = NOW()
        WHERE id = $1 AND owner_id = $2
        RETURNING id, name, description, owner_id, created_at, updated_at
        "#,
    )
    .bind(playlist_id)
    .bind(owner_id)
    .bind(name)
    .bind(description)
    .fetch_optional(executor)
    .await
}

/// Delete a playlist, restricted to the owner. Membership rows cascade.
pub async fn delete_playlist<'e, E>(
    executor: E,
    playlist_id: i64,
    owner_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM playlists WHERE id = $1 AND owner_id = $2")
        .bind(playlist_id)
        .bind(owner_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
