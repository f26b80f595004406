pub mod db;
pub mod error;
pub mod membership;
pub mod messages;
pub mod rooms;
pub mod users;

use axum::{Router, extract::FromRef};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
}

/// Full application router over a connected pool.
pub fn app(db_pool: SqlitePool) -> Router {
    Router::new()
        .nest("/users", users::router())
        .nest("/rooms", rooms::router())
        .nest("/user-room", membership::router())
        .nest("/messages", messages::router())
        .with_state(AppState { db_pool })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
