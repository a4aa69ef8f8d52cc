//! Like domain - toggle-state rows for videos, comments and tweets
//!
//! A like row's presence is the toggle state. Toggles are delete-first:
//! remove the row if it exists, otherwise insert with ON CONFLICT DO
//! NOTHING so two concurrent toggles cannot create duplicates.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, PgPool, Postgres};

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: i64,
    pub video_id: Option<i64>,
    pub comment_id: Option<i64>,
    pub tweet_id: Option<i64>,
    pub liked_by: i64,
    pub created_at: DateTime<Utc>,
}

/// The subject column a like row points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Video,
    Comment,
    Tweet,
}

impl LikeTarget {
    fn column(self) -> &'static str {
        match self {
            LikeTarget::Video => "video_id",
            LikeTarget::Comment => "comment_id",
            LikeTarget::Tweet => "tweet_id",
        }
    }
}

/// Remove an existing like. Returns true if a row was deleted.
pub async fn remove_like<'e, E>(
    executor: E,
    target: LikeTarget,
    subject_id: i64,
    user_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        "DELETE FROM likes WHERE {} = $1 AND liked_by = $2",
        target.column()
    );
    let result = sqlx::query(&sql)
        .bind(subject_id)
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Insert a like. Returns the created row, or None if it already existed
/// (lost a race against another toggle).
pub async fn add_like<'e, E>(
    executor: E,
    target: LikeTarget,
    subject_id: i64,
    user_id: i64,
) -> Result<Option<Like>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        INSERT INTO likes ({}, liked_by)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        RETURNING id, video_id, comment_id, tweet_id, liked_by, created_at
        "#,
        target.column()
    );
    sqlx::query_as(&sql)
        .bind(subject_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await
}

/// A liked video with the like row's timestamp
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideo {
    pub like_id: i64,
    pub liked_at: DateTime<Utc>,
    pub id: i64,
    pub video_url: String,
    pub thumbnail_url: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
}

/// Likes the user holds on a specific video, joined with the video
pub async fn get_liked_video(
    db: &PgPool,
    video_id: i64,
    user_id: i64,
) -> Result<Vec<LikedVideo>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT
            l.id AS like_id, l.created_at AS liked_at,
            v.id, v.video_url, v.thumbnail_url, v.title, v.description,
            v.duration, v.views
        FROM likes l
        JOIN videos v ON v.id = l.video_id
        WHERE l.video_id = $1 AND l.liked_by = $2
        "#,
    )
    .bind(video_id)
    .bind(user_id)
    .fetch_all(db)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing;

    #[sqlx::test]
    async fn test_toggle_pair_restores_state(pool: PgPool) {
        let user_id = testing::seed_user(&pool, "liker").await;
        let video_id = testing::seed_video(&pool, user_id).await;

        let like = add_like(&pool, LikeTarget::Video, video_id, user_id)
            .await
            .unwrap();
        assert!(like.is_some());

        // a second insert loses to the unique index
        let dup = add_like(&pool, LikeTarget::Video, video_id, user_id)
            .await
            .unwrap();
        assert!(dup.is_none());

        assert!(
            remove_like(&pool, LikeTarget::Video, video_id, user_id)
                .await
                .unwrap()
        );
        // removing again finds nothing; the pair is back where it started
        assert!(
            !remove_like(&pool, LikeTarget::Video, video_id, user_id)
                .await
                .unwrap()
        );
    }
}
