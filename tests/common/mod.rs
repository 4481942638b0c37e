#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use beenthere::models::City;
use beenthere::AppState;
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_feed_capacity(64).await
    }

    /// An app whose visit feed buffers at most `feed_capacity` changes.
    pub async fn with_feed_capacity(feed_capacity: usize) -> Self {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("Failed to create in-memory SQLite pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(pool.clone(), feed_capacity);
        let router = beenthere::build_app(state.clone());

        Self {
            router,
            db: pool,
            state,
        }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    /// Add a city to the catalog.
    pub async fn seed_city(&self, name: &str, state: &str) {
        self.state
            .cities
            .add_city(&City::new(name, state))
            .await
            .expect("Failed to seed city");
    }

    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// POST a JSON body.
    pub async fn post_json(&self, uri: &str, body: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("DELETE")
            .body(Body::empty())
            .unwrap();
        self.request(req).await
    }

    /// Record a visit and return the created visit as JSON.
    pub async fn create_visit(&self, user: &str, city: &str, state: &str) -> serde_json::Value {
        let body = serde_json::json!({ "city": city, "state": state }).to_string();
        let resp = self.post_json(&format!("/users/{user}/visits"), &body).await;
        assert_eq!(resp.status(), StatusCode::OK);
        body_json(resp).await
    }

    pub async fn visit_count(&self) -> i64 {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM visits")
            .fetch_one(&self.db)
            .await
            .unwrap();
        count
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Read the full response body as JSON.
pub async fn body_json(resp: Response) -> serde_json::Value {
    let body = body_string(resp).await;
    serde_json::from_str(&body).unwrap_or_else(|e| panic!("invalid JSON body {body:?}: {e}"))
}

/// Pull a string array out of a JSON body field.
pub fn strings(json: &serde_json::Value, field: &str) -> Vec<String> {
    json[field]
        .as_array()
        .unwrap_or_else(|| panic!("expected '{field}' to be an array in {json}"))
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}
