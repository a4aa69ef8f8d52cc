//! View domain - one counted view per (video, user)

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, Postgres};

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: i64,
    pub video_id: i64,
    pub user_id: i64,
    pub viewed_at: DateTime<Utc>,
}

/// Record a view. Returns the created row, or None when this (video, user)
/// pair was already counted. The unique index makes concurrent first views
/// race-safe: exactly one insert wins.
pub async fn record_view<'e, E>(
    executor: E,
    video_id: i64,
    user_id: i64,
) -> Result<Option<View>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO views (video_id, user_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        RETURNING id, video_id, user_id, viewed_at
        "#,
    )
    .bind(video_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::testing;
    use sqlx::PgPool;

    #[sqlx::test]
    async fn test_repeat_view_is_not_counted_again(pool: PgPool) {
        let user_id = testing::seed_user(&pool, "watcher").await;
        let video_id = testing::seed_video(&pool, user_id).await;

        let first = record_view(&pool, video_id, user_id).await.unwrap();
        assert!(first.is_some());

        let repeat = record_view(&pool, video_id, user_id).await.unwrap();
        assert!(repeat.is_none());
    }
}
