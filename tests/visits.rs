mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, strings, TestApp};

#[tokio::test]
async fn create_visit_uppercases_state_and_sets_user() {
    let app = TestApp::new().await;

    let resp = app
        .post_json("/users/testman/visits", r#"{"city": "Raleigh", "state": "nc"}"#)
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let visit = body_json(resp).await;
    assert_eq!(visit["city"], "Raleigh");
    assert_eq!(visit["state"], "NC");
    assert_eq!(visit["user"], "testman");
    assert!(!visit["id"].as_str().unwrap().is_empty());
    assert!(!visit["timestamp"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn create_visit_ignores_client_supplied_identity() {
    let app = TestApp::new().await;

    let body = r#"{"id": "forged", "user": "mallory", "timestamp": "1999-01-01T00:00:00Z", "city": "Durham", "state": "NC"}"#;
    let resp = app.post_json("/users/testman/visits", body).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let visit = body_json(resp).await;
    assert_ne!(visit["id"], "forged");
    assert_eq!(visit["user"], "testman");
    assert_ne!(visit["timestamp"], "1999-01-01T00:00:00Z");
}

#[tokio::test]
async fn create_visit_with_empty_body_is_rejected() {
    let app = TestApp::new().await;

    let resp = app.post_json("/users/testman/visits", "").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.visit_count().await, 0);
}

#[tokio::test]
async fn create_visit_with_missing_fields_names_the_field() {
    let app = TestApp::new().await;

    let resp = app.post_json("/users/testman/visits", r#"{"state": "NC"}"#).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "invalid visit");
    assert_eq!(json["invalid"], "missing 'city' field");

    let resp = app.post_json("/users/testman/visits", r#"{"city": "Raleigh", "state": ""}"#).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["invalid"], "missing 'state' field");

    assert_eq!(app.visit_count().await, 0);
}

#[tokio::test]
async fn create_visit_in_unknown_state_is_rejected() {
    let app = TestApp::new().await;

    let resp = app
        .post_json("/users/testman/visits", r#"{"city": "Atlantis", "state": "XX"}"#)
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let json = body_json(resp).await;
    assert_eq!(json["invalid"], "no such state");
    assert_eq!(app.visit_count().await, 0);
}

#[tokio::test]
async fn create_visit_accepts_cities_missing_from_the_catalog() {
    let app = TestApp::new().await;

    let visit = app.create_visit("testman", "Nowhereville", "NC").await;
    assert_eq!(visit["city"], "Nowhereville");
}

#[tokio::test]
async fn create_visit_round_trips_xml() {
    let app = TestApp::new().await;

    let req = Request::builder()
        .uri("/users/testman/visits")
        .method("POST")
        .header("content-type", "application/xml")
        .header("accept", "application/xml")
        .body(Body::from("<visit><city>Raleigh</city><state>nc</state></visit>"))
        .unwrap();
    let resp = app.request(req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/xml");

    let xml = common::body_string(resp).await;
    assert!(xml.starts_with("<visit>"));
    assert!(xml.contains("<city>Raleigh</city>"));
    assert!(xml.contains("<state>NC</state>"));
    assert!(xml.contains("<user>testman</user>"));

    let json = body_json(app.get("/users/testman/visits").await).await;
    assert_eq!(json["visits"][0]["state"], "NC");
}

#[tokio::test]
async fn listings_follow_the_accept_header() {
    let app = TestApp::new().await;
    app.create_visit("testman", "Raleigh", "NC").await;

    let req = Request::builder()
        .uri("/users/testman/visits/cities")
        .header("accept", "text/xml")
        .body(Body::empty())
        .unwrap();
    let resp = app.request(req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/xml");
    assert!(common::body_string(resp).await.contains("<cities>Raleigh</cities>"));
}

#[tokio::test]
async fn create_visit_rejects_unknown_media_types() {
    let app = TestApp::new().await;

    let req = Request::builder()
        .uri("/users/testman/visits")
        .method("POST")
        .header("content-type", "text/plain")
        .body(Body::from("Raleigh, NC"))
        .unwrap();
    let resp = app.request(req).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(app.visit_count().await, 0);
}

#[tokio::test]
async fn create_visit_trims_city_and_state() {
    let app = TestApp::new().await;
    app.create_visit("testman", "Raleigh", "NC").await;

    let visit = app.create_visit("testman", " Raleigh ", " nc").await;
    assert_eq!(visit["city"], "Raleigh");
    assert_eq!(visit["state"], "NC");

    let cities = strings(&body_json(app.get("/users/testman/visits/cities").await).await, "cities");
    assert_eq!(cities, vec!["Raleigh"]);
}

#[tokio::test]
async fn list_visits_returns_only_the_users_visits() {
    let app = TestApp::new().await;
    let created = app.create_visit("testman", "Raleigh", "nc").await;
    app.create_visit("otherman", "Austin", "TX").await;

    let resp = app.get("/users/testman/visits").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let visits = json["visits"].as_array().unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0], created);
}

#[tokio::test]
async fn list_visits_for_unknown_user_is_empty() {
    let app = TestApp::new().await;

    let resp = app.get("/users/nobody/visits").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["visits"], serde_json::json!([]));
}

#[tokio::test]
async fn list_visits_is_paginated_newest_first() {
    let app = TestApp::new().await;
    let mut ids = Vec::new();
    for city in ["Raleigh", "Durham", "Cary", "Boone", "Wilmington"] {
        let visit = app.create_visit("testman", city, "NC").await;
        ids.push(visit["id"].as_str().unwrap().to_string());
    }
    ids.reverse();

    let resp = app.get("/users/testman/visits?start=1&limit=2").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    let page: Vec<String> = json["visits"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(page, ids[1..3]);

    let resp = app.get("/users/testman/visits?start=&limit=").await;
    let json = body_json(resp).await;
    assert_eq!(json["visits"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn list_visits_with_bad_pagination_is_rejected() {
    let app = TestApp::new().await;

    let resp = app.get("/users/testman/visits?limit=many").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn visited_cities_are_unique() {
    let app = TestApp::new().await;
    app.create_visit("testman", "Raleigh", "NC").await;
    app.create_visit("testman", "Raleigh", "NC").await;
    app.create_visit("testman", "Charlotte", "NC").await;

    let resp = app.get("/users/testman/visits/cities").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let mut cities = strings(&body_json(resp).await, "cities");
    cities.sort();
    assert_eq!(cities, vec!["Charlotte", "Raleigh"]);
}

#[tokio::test]
async fn visited_states_are_unique_full_names() {
    let app = TestApp::new().await;
    app.create_visit("testman", "Raleigh", "nc").await;
    app.create_visit("testman", "Charlotte", "NC").await;
    app.create_visit("testman", "Austin", "tx").await;

    let resp = app.get("/users/testman/visits/states").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let mut states = strings(&body_json(resp).await, "states");
    states.sort();
    assert_eq!(states, vec!["North Carolina", "Texas"]);
}

#[tokio::test]
async fn delete_visit_removes_it() {
    let app = TestApp::new().await;
    let raleigh = app.create_visit("testman", "Raleigh", "NC").await;
    app.create_visit("testman", "Charlotte", "NC").await;

    let id = raleigh["id"].as_str().unwrap();
    let resp = app.delete(&format!("/users/testman/visits/{id}")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let json = body_json(app.get("/users/testman/visits").await).await;
    let visits = json["visits"].as_array().unwrap();
    assert_eq!(visits.len(), 1);
    assert_eq!(visits[0]["city"], "Charlotte");
}

#[tokio::test]
async fn delete_visit_twice_still_succeeds() {
    let app = TestApp::new().await;
    let visit = app.create_visit("testman", "Raleigh", "NC").await;
    let uri = format!("/users/testman/visits/{}", visit["id"].as_str().unwrap());

    assert_eq!(app.delete(&uri).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&uri).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        app.delete("/users/testman/visits/does-not-exist").await.status(),
        StatusCode::NO_CONTENT
    );
}

#[tokio::test]
async fn store_failures_are_server_errors_without_detail() {
    let app = TestApp::new().await;
    app.db.close().await;

    let resp = app.get("/users/testman/visits").await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "unable to get visits");

    let resp = app
        .post_json("/users/testman/visits", r#"{"city": "Raleigh", "state": "NC"}"#)
        .await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(resp).await;
    assert_eq!(json["error"], "unable to save user visit");
}

#[tokio::test]
async fn health_check() {
    let app = TestApp::new().await;
    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(common::body_string(resp).await, "ok");
}
