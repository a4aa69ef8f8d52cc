pub mod comments;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod users;
pub mod videos;
pub mod views;

#[cfg(test)]
pub(crate) mod testing {
    use sqlx::PgPool;

    pub async fn seed_user(pool: &PgPool, name: &str) -> i64 {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO users (username, email, fullname, password_hash, avatar_url)
            VALUES ($1, $1 || '@example.com', 'Test User', 'not-a-real-hash', 'http://localhost/a.png')
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap();
        row.0
    }

    pub async fn seed_video(pool: &PgPool, owner_id: i64) -> i64 {
        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO videos (video_url, title, owner_id)
            VALUES ('http://localhost/v.mp4', 'Test Video', $1)
            RETURNING id
            "#,
        )
        .bind(owner_id)
        .fetch_one(pool)
        .await
        .unwrap();
        row.0
    }
}
