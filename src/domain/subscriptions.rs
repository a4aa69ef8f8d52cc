//! Subscription domain - toggle-state rows between subscriber and channel

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, PgPool, Postgres};

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: i64,
    pub subscriber_id: i64,
    pub channel_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Remove an existing subscription. Returns true if a row was deleted.
pub async fn unsubscribe<'e, E>(
    executor: E,
    subscriber_id: i64,
    channel_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result =
        sqlx::query("DELETE FROM subscriptions WHERE subscriber_id = $1 AND channel_id = $2")
            .bind(subscriber_id)
            .bind(channel_id)
            .execute(executor)
            .await?;
    Ok(result.rows_affected() > 0)
}

/// Insert a subscription. Returns the created row, or None if it already
/// existed.
pub async fn subscribe<'e, E>(
    executor: E,
    subscriber_id: i64,
    channel_id: i64,
) -> Result<Option<Subscription>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        r#"
        INSERT INTO subscriptions (subscriber_id, channel_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        RETURNING id, subscriber_id, channel_id, created_at
        "#,
    )
    .bind(subscriber_id)
    .bind(channel_id)
    .fetch_optional(executor)
    .await
}

/// Public projection of a user on either side of a subscription
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUser {
    pub id: i64,
    pub username: String,
    pub fullname: String,
    pub avatar_url: String,
}

/// Users subscribed to the given channel
pub async fn list_subscribers(
    db: &PgPool,
    channel_id: i64,
) -> Result<Vec<SubscriptionUser>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT u.id, u.username, u.fullname, u.avatar_url
        FROM subscriptions s
        JOIN users u ON u.id = s.subscriber_id
        WHERE s.channel_id = $1
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(channel_id)
    .fetch_all(db)
    .await
}

/// Channels the given user is subscribed to
pub async fn list_subscribed_channels(
    db: &PgPool,
    subscriber_id: i64,
) -> Result<Vec<SubscriptionUser>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT u.id, u.username, u.fullname, u.avatar_url
        FROM subscriptions s
        JOIN users u ON u.id = s.channel_id
        WHERE s.subscriber_id = $1
        ORDER BY s.created_at DESC
        "#,
    )
    .bind(subscriber_id)
    .fetch_all(db)
    .await
}
