//! Tweet domain - DB queries for tweets

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, PgPool, Postgres};

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: i64,
    pub content: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub async fn create_tweet<'e, E>(
    executor: E,
    content: &str,
    owner_id: i64,
) -> Result<Tweet, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO tweets (content, owner_id)
        VALUES ($1, $2)
        RETURNING id, content, owner_id, created_at, updated_at
        "#,
    )
    .bind(content)
    .bind(owner_id)
    .fetch_one(executor)
    .await
}

pub async fn tweet_exists<'e, E>(executor: E, tweet_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM tweets WHERE id = $1")
        .bind(tweet_id)
        .fetch_optional(executor)
        .await?;
    Ok(row.is_some())
}

pub async fn list_tweets_by_owner(db: &PgPool, owner_id: i64) -> Result<Vec<Tweet>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT id, content, owner_id, created_at, updated_at
        FROM tweets
        WHERE owner_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(owner_id)
    .fetch_all(db)
    .await
}

/// Update a tweet's content, restricted to the owner
pub async fn update_tweet<'e, E>(
    executor: E,
    tweet_id: i64,
    owner_id: i64,
    content: &str,
) -> Result<Option<Tweet>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        UPDATE tweets SET content = $3, updated_at = NOW()
        WHERE id = $1 AND owner_id = $2
        RETURNING id, content, owner_id, created_at, updated_at
        "#,
    )
    .bind(tweet_id)
    .bind(owner_id)
    .bind(content)
    .fetch_optional(executor)
    .await
}

/// Delete a tweet, restricted to the owner
pub async fn delete_tweet<'e, E>(
    executor: E,
    tweet_id: i64,
    owner_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM tweets WHERE id = $1 AND owner_id = $2")
        .bind(tweet_id)
        .bind(owner_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::likes::{self, LikeTarget};
    use crate::domain::testing;

    #[sqlx::test]
    async fn test_delete_tweet_with_likes(pool: PgPool) {
        let user_id = testing::seed_user(&pool, "tweeter").await;
        let tweet = create_tweet(&pool, "hello", user_id).await.unwrap();

        likes::add_like(&pool, LikeTarget::Tweet, tweet.id, user_id)
            .await
            .unwrap();

        // the like row goes with the tweet instead of blocking the delete
        assert!(delete_tweet(&pool, tweet.id, user_id).await.unwrap());
        assert!(!tweet_exists(&pool, tweet.id).await.unwrap());
    }
}
