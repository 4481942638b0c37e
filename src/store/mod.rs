//! Persistence for visits and the city catalog.
//!
//! Both stores are cheap to clone and share one SQLite pool. Every backend
//! failure is returned immediately as [`Error::Store`]; nothing here retries.

pub mod cities;
pub mod feed;
pub mod visits;

pub use cities::CityCatalog;
pub use feed::{Change, FeedError, VisitFeed};
pub use visits::VisitStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required field was empty. Fixable by the client.
    #[error("missing '{0}' field")]
    MissingField(&'static str),

    #[error("no such state")]
    NoSuchState,

    #[error("city already exists")]
    AlreadyExists,

    /// The backend failed. The cause is for operators, not clients.
    #[error("{context}: {source}")]
    Store {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl Error {
    pub(crate) fn store(context: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Error::Store { context, source }
    }

    /// Whether the error was caused by the caller's input rather than the backend.
    pub(crate) fn is_client_error(&self) -> bool {
        !matches!(self, Error::Store { .. })
    }
}

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str("sqlite::memory:").unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}
