use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use crate::error::AppError;

pub const DEFAULT_LIMIT: u32 = 50;
pub const MAX_LIMIT: u32 = 500;

/// The `start`/`limit` window requested through the query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub start: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            start: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

// Raw strings so that `?start=&limit=` means "use the defaults".
#[derive(Deserialize)]
struct PageQuery {
    start: Option<String>,
    limit: Option<String>,
}

fn parse(name: &str, value: Option<String>, default: u32) -> Result<u32, AppError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::bad_request(format!("invalid '{name}' parameter: {raw}"))),
    }
}

impl<S> FromRequestParts<S> for Page
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PageQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::bad_request(e.body_text()))?;

        Ok(Page {
            start: parse("start", query.start, 0)?,
            limit: parse("limit", query.limit, DEFAULT_LIMIT)?.min(MAX_LIMIT),
        })
    }
}
