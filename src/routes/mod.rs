pub mod auth;
pub mod chatbot;
pub mod comments;
pub mod likes;
pub mod playlists;
pub mod subscriptions;
pub mod tweets;
pub mod upload;
pub mod users;
pub mod videos;
pub mod views;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(auth::routes())
        .merge(chatbot::routes())
        .merge(comments::routes())
        .merge(likes::routes())
        .merge(playlists::routes())
        .merge(subscriptions::routes())
        .merge(tweets::routes())
        .merge(users::routes())
        .merge(videos::routes())
        .merge(views::routes())
}
