//! Video domain - DB queries for videos

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Executor, PgPool, Postgres};

#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: i64,
    pub video_url: String,
    pub thumbnail_url: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Video joined with a projection of its owner, for listings and lookups
#[derive(Debug, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct VideoWithOwner {
    pub id: i64,
    pub video_url: String,
    pub thumbnail_url: String,
    pub title: String,
    pub description: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub owner_id: i64,
    pub owner_username: String,
    pub owner_fullname: String,
    pub owner_avatar_url: String,
}

const VIDEO_COLUMNS: &str = "id, video_url, thumbnail_url, title, description, duration, views, is_published, owner_id, created_at, updated_at";

const VIDEO_WITH_OWNER_COLUMNS: &str = r#"
    v.id, v.video_url, v.thumbnail_url, v.title, v.description, v.duration,
    v.views, v.is_published, v.created_at,
    o.id AS owner_id, o.username AS owner_username,
    o.fullname AS owner_fullname, o.avatar_url AS owner_avatar_url
"#;

/// Whitelist the caller-supplied sort column; anything unknown falls back
/// to created_at so it can be interpolated into the ORDER BY safely.
pub fn sort_column(requested: &str) -> &'static str {
    match requested {
        "views" => "views",
        "duration" => "duration",
        "title" => "title",
        "createdAt" | "created_at" => "created_at",
        _ => "created_at",
    }
}

pub fn sort_direction(requested: &str) -> &'static str {
    match requested {
        "asc" => "ASC",
        _ => "DESC",
    }
}

pub async fn count_videos(
    db: &PgPool,
    title_query: Option<&str>,
    owner_id: Option<i64>,
) -> Result<i64, sqlx::Error> {
    let row: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM videos
        WHERE is_published = TRUE
          AND ($1::text IS NULL OR title ILIKE '%' || $1 || '%')
          AND ($2::bigint IS NULL OR owner_id = $2)
        "#,
    )
    .bind(title_query)
    .bind(owner_id)
    .fetch_one(db)
    .await?;
    Ok(row.0)
}

pub async fn list_videos(
    db: &PgPool,
    title_query: Option<&str>,
    owner_id: Option<i64>,
    sort_by: &str,
    sort_type: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<VideoWithOwner>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {}
        FROM videos v
        JOIN users o ON o.id = v.owner_id
        WHERE v.is_published = TRUE
          AND ($1::text IS NULL OR v.title ILIKE '%' || $1 || '%')
          AND ($2::bigint IS NULL OR v.owner_id = $2)
        ORDER BY v.{} {}
        LIMIT $3 OFFSET $4
        "#,
        VIDEO_WITH_OWNER_COLUMNS,
        sort_column(sort_by),
        sort_direction(sort_type),
    );

    sqlx::query_as(&sql)
        .bind(title_query)
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
}

pub async fn get_video_by_id<'e, E>(
    executor: E,
    video_id: i64,
) -> Result<Option<VideoWithOwner>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        "SELECT {} FROM videos v JOIN users o ON o.id = v.owner_id WHERE v.id = $1",
        VIDEO_WITH_OWNER_COLUMNS
    ))
    .bind(video_id)
    .fetch_optional(executor)
    .await
}

pub async fn video_exists<'e, E>(executor: E, video_id: i64) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM videos WHERE id = $1")
        .bind(video_id)
        .fetch_optional(executor)
        .await?;
    Ok(row.is_some())
}

pub async fn create_video<'e, E>(
    executor: E,
    video_url: &str,
    thumbnail_url: &str,
    title: &str,
    description: &str,
    duration: f64,
    owner_id: i64,
) -> Result<Video, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        r#"
        INSERT INTO videos (video_url, thumbnail_url, title, description, duration, owner_id)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {}
        "#,
        VIDEO_COLUMNS
    ))
    .bind(video_url)
    .bind(thumbnail_url)
    .bind(title)
    .bind(description)
    .bind(duration)
    .bind(owner_id)
    .fetch_one(executor)
    .await
}

/// Update mutable video fields; NULL arguments leave the column unchanged.
/// Restricted to the owner.
pub async fn update_video<'e, E>(
    executor: E,
    video_id: i64,
    owner_id: i64,
    title: Option<&str>,
    description: Option<&str>,
    thumbnail_url: Option<&str>,
    is_published: Option<bool>,
) -> Result<Option<Video>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(&format!(
        r#"
        UPDATE videos SET
            title = COALESCE($3, title),
            description = COALESCE($4, description),
            thumbnail_url = COALESCE($5, thumbnail_url),
            is_published = COALESCE($6, is_published),
            updated_at = NOW()
        WHERE id = $1 AND owner_id = $2
        RETURNING {}
        "#,
        VIDEO_COLUMNS
    ))
    .bind(video_id)
    .bind(owner_id)
    .bind(title)
    .bind(description)
    .bind(thumbnail_url)
    .bind(is_published)
    .fetch_optional(executor)
    .await
}

/// Delete a video owned by `owner_id`. Dependent comments/likes/views are
/// intentionally left in place.
pub async fn delete_video<'e, E>(
    executor: E,
    video_id: i64,
    owner_id: i64,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query("DELETE FROM videos WHERE id = $1 AND owner_id = $2")
        .bind(video_id)
        .bind(owner_id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_videos_by_owner(
    db: &PgPool,
    owner_id: i64,
) -> Result<Vec<VideoWithOwner>, sqlx::Error> {
    sqlx::query_as(&format!(
        r#"
        SELECT {} FROM videos v
        JOIN users o ON o.id = v.owner_id
        WHERE v.owner_id = $1
        ORDER BY v.created_at DESC
        "#,
        VIDEO_WITH_OWNER_COLUMNS
    ))
    .bind(owner_id)
    .fetch_all(db)
    .await
}

pub async fn increment_views<'e, E>(executor: E, video_id: i64) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query("UPDATE videos SET views = views + 1 WHERE id = $1")
        .bind(video_id)
        .execute(executor)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::likes::{self, LikeTarget};
    use crate::domain::{comments, playlists, testing, users, views};

    #[test]
    fn test_sort_column_whitelist() {
        assert_eq!(sort_column("views"), "views");
        assert_eq!(sort_column("createdAt"), "created_at");
        // injection attempts fall back to the default
        assert_eq!(sort_column("views; DROP TABLE videos"), "created_at");
        assert_eq!(sort_column(""), "created_at");
    }

    #[test]
    fn test_sort_direction_defaults_desc() {
        assert_eq!(sort_direction("asc"), "ASC");
        assert_eq!(sort_direction("desc"), "DESC");
        assert_eq!(sort_direction("sideways"), "DESC");
    }

    #[sqlx::test]
    async fn test_delete_video_with_dependents(pool: PgPool) {
        let owner_id = testing::seed_user(&pool, "owner").await;
        let viewer_id = testing::seed_user(&pool, "viewer").await;
        let video_id = testing::seed_video(&pool, owner_id).await;

        // every kind of dependent row the platform can attach to a video
        let comment = comments::create_comment(&pool, "nice", video_id, viewer_id)
            .await
            .unwrap();
        likes::add_like(&pool, LikeTarget::Video, video_id, viewer_id)
            .await
            .unwrap();
        views::record_view(&pool, video_id, viewer_id).await.unwrap();
        users::touch_watch_history(&pool, viewer_id, video_id)
            .await
            .unwrap();
        let playlist = playlists::create_playlist(&pool, "mix", "", viewer_id)
            .await
            .unwrap();
        playlists::add_video_to_playlist(&pool, playlist.id, video_id)
            .await
            .unwrap();

        assert!(delete_video(&pool, video_id, owner_id).await.unwrap());

        // the comment survives with its video reference cleared
        let orphaned = comments::update_comment(&pool, comment.id, viewer_id, "still here")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(orphaned.video_id, None);

        // toggle and membership rows went with the video
        assert!(
            !likes::remove_like(&pool, LikeTarget::Video, video_id, viewer_id)
                .await
                .unwrap()
        );
        assert!(
            !playlists::playlist_contains_video(&pool, playlist.id, video_id)
                .await
                .unwrap()
        );
    }

    #[sqlx::test]
    async fn test_listings_exclude_unpublished(pool: PgPool) {
        let owner_id = testing::seed_user(&pool, "owner").await;
        testing::seed_video(&pool, owner_id).await;
        sqlx::query(
            "INSERT INTO videos (video_url, title, owner_id, is_published)
             VALUES ('http://localhost/d.mp4', 'Draft', $1, FALSE)",
        )
        .bind(owner_id)
        .execute(&pool)
        .await
        .unwrap();

        assert_eq!(count_videos(&pool, None, Some(owner_id)).await.unwrap(), 1);
        let listed = list_videos(&pool, None, Some(owner_id), "createdAt", "desc", 10, 0)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Test Video");
    }
}
