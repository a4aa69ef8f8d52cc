//! Comment domain - DB queries for comments

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, PgPool, Postgres};

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub content: String,
    /// None once the commented video has been deleted
    pub video_id: Option<i64>,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Comment joined with its owner's public fields, for listings
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithOwner {
    pub id: i64,
    pub content: String,
    pub video_id: i64,
    pub created_at: DateTime<Utc>,
    pub owner_id: i64,
    pub owner_username: String,
    pub owner_fullname: String,
    pub owner_avatar_url: String,
}

pub async fn create_comment<'e, E>(
    executor: E,
    content: &str,
    video_id: i64,
    owner_id: i64,
) -> Result<Comment, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO comments (content, video_id, owner_id)
        VALUES ($1, $2, $3)
        RETURNING id, content, video_id, owner_id, created_at, updated_at
        "#,
    )
    .bind(content)
    .bind(video_id)
    .bind(owner_id)
    .fetch_one(executor)
    .await
}

pub async fn comment_exists<'e, E>(executor: E, comment_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM comments WHERE id = $1")
        .bind(comment_id)
        .fetch_optional(executor)
        .await?;
    Ok(row.is_some())
}

pub async fn count_for_video(db: &PgPool, video_id: i64) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE video_id = $1")
        .bind(video_id)
        .fetch_one(db)
        .await?;
    Ok(row.0)
}

/// Newest-first page of a video's comments with owner projection
pub async fn list_for_video(
    db: &PgPool,
    video_id: i64,
    limit: i64,
    offset: i64,
) -> Result<Vec<CommentWithOwner>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            c.id, c.content, c.video_id, c.created_at,
            o.id AS owner_id, o.username AS owner_username,
            o.fullname AS owner_fullname, o.avatar_url AS owner_avatar_url
        FROM comments c
        JOIN users o ON o.id = c.owner_id
        WHERE c.video_id = $1
        ORDER BY c.created_at DESC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(video_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

/// Update a comment's content, restricted to the owner
pub async fn update_comment<'e, E>(
    executor: E,
    comment_id: i64,
    owner_id: i64,
    content: &str,
) -> Result<Option<Comment>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        UPDATE comments SET content = $3, updated_at = NOW()
        WHERE id = $1 AND owner_id = $2
        RETURNING id, content, video_id, owner_id, created_at, updated_at
        "#,
    )
    .bind(comment_id)
    .bind(owner_id)
    .bind(content)
    .fetch_optional(executor)
    .await
}

/// Delete a comment, restricted to the owner
pub async fn delete_comment<'e, E>(
    executor: E,
    comment_id: i64,
    owner_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND owner_id = $2")
        .bind(comment_id)
        .bind(owner_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
