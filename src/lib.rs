pub mod cli;
pub mod config;
pub mod content;
pub mod db;
pub mod error;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod states;
pub mod store;

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::store::{CityCatalog, VisitStore};

#[derive(Clone)]
pub struct AppState {
    pub visits: VisitStore,
    pub cities: CityCatalog,
}

impl AppState {
    pub fn new(pool: SqlitePool, feed_capacity: usize) -> Self {
        Self {
            visits: VisitStore::new(pool.clone(), feed_capacity),
            cities: CityCatalog::new(pool),
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
///
/// Caller is responsible for running database migrations beforehand.
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes::cities::router())
        .merge(routes::visits::router())
        .merge(routes::stream::router())
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
