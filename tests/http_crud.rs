use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use heroes_api::{AppState, Database, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> axum::Router {
    let db = Database::sqlite_in_memory()
        .await
        .expect("in-memory sqlite should open");
    build_router(AppState::new(db))
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");

    if body.is_empty() {
        return (status, Value::Null);
    }

    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, json)
}

async fn send_json(
    app: &axum::Router,
    method: Method,
    uri: &str,
    payload: Value,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("request should build");

    send(app, request).await
}

async fn send_empty(app: &axum::Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request should build");

    send(app, request).await
}

async fn create(app: &axum::Router, payload: Value) -> i64 {
    let (status, body) = send_json(app, Method::POST, "/heroes/", payload).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_i64().expect("created hero should have an id")
}

fn assert_public_shape(hero: &Value) {
    let object = hero.as_object().expect("hero should be an object");
    assert!(!object.contains_key("secretName"));
    assert!(!object.contains_key("secret_name"));
    for key in ["id", "name", "age", "gender"] {
        assert!(object.contains_key(key), "missing {key} in {hero}");
    }
}

#[tokio::test]
async fn create_returns_public_view() {
    let app = app().await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/heroes/",
        json!({ "name": "Deadpond", "secretName": "Dive Wilson" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_public_shape(&body);
    assert!(body["id"].as_i64().is_some());
    assert_eq!(body["name"], "Deadpond");
    assert_eq!(body["age"], Value::Null);
    assert_eq!(body["gender"], Value::Null);
}

#[tokio::test]
async fn create_without_trailing_slash_and_snake_case_secret() {
    let app = app().await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/heroes",
        json!({ "name": "Rusty-Man", "secret_name": "Tommy Sharp", "age": 48 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_public_shape(&body);
    assert_eq!(body["age"], 48);
}

#[tokio::test]
async fn create_assigns_distinct_ids() {
    let app = app().await;

    let first = create(&app, json!({ "name": "A", "secretName": "a" })).await;
    let second = create(&app, json!({ "name": "B", "secretName": "b" })).await;

    assert_ne!(first, second);
}

#[tokio::test]
async fn create_missing_secret_name_is_unprocessable() {
    let app = app().await;

    let (status, body) =
        send_json(&app, Method::POST, "/heroes/", json!({ "name": "Deadpond" })).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "secretName"]));
    assert_eq!(body["detail"][0]["type"], "missing");
}

#[tokio::test]
async fn create_with_wrong_types_is_unprocessable() {
    let app = app().await;

    let (status, body) = send_json(
        &app,
        Method::POST,
        "/heroes/",
        json!({ "name": "Deadpond", "secretName": "Dive Wilson", "age": "old" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_array());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/heroes/")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .expect("request should build");
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn patch_changes_only_given_fields() {
    let app = app().await;
    let id = create(
        &app,
        json!({ "name": "Deadpond", "secretName": "Dive Wilson", "gender": "m" }),
    )
    .await;

    let (status, body) = send_json(
        &app,
        Method::PATCH,
        &format!("/heroes/{id}"),
        json!({ "name": "Deadpuddle" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_public_shape(&body);
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "Deadpuddle");
    assert_eq!(body["age"], Value::Null);
    assert_eq!(body["gender"], "m");

    let (_, fetched) = send_empty(&app, Method::GET, &format!("/heroes/{id}")).await;
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn patch_explicit_null_clears_nullable_field() {
    let app = app().await;
    let id = create(
        &app,
        json!({ "name": "Spider-Boy", "secretName": "Pedro Parqueador", "age": 16 }),
    )
    .await;

    let (status, body) = send_json(
        &app,
        Method::PATCH,
        &format!("/heroes/{id}"),
        json!({ "age": null }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["age"], Value::Null);
    assert_eq!(body["name"], "Spider-Boy");
}

#[tokio::test]
async fn patch_secret_name_is_accepted_but_not_echoed() {
    let app = app().await;
    let id = create(&app, json!({ "name": "Deadpond", "secretName": "Dive Wilson" })).await;

    let (status, body) = send_json(
        &app,
        Method::PATCH,
        &format!("/heroes/{id}"),
        json!({ "secretName": "Someone Else" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_public_shape(&body);
    assert_eq!(body["name"], "Deadpond");
}

#[tokio::test]
async fn patch_empty_body_returns_hero_unchanged() {
    let app = app().await;
    let id = create(&app, json!({ "name": "Deadpond", "secretName": "Dive Wilson" })).await;

    let (status, body) =
        send_json(&app, Method::PATCH, &format!("/heroes/{id}"), json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Deadpond");
}

#[tokio::test]
async fn patch_null_name_is_unprocessable() {
    let app = app().await;
    let id = create(&app, json!({ "name": "Deadpond", "secretName": "Dive Wilson" })).await;

    let (status, body) = send_json(
        &app,
        Method::PATCH,
        &format!("/heroes/{id}"),
        json!({ "name": null }),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["body", "name"]));
}

#[tokio::test]
async fn unknown_ids_are_not_found() {
    let app = app().await;

    let (status, body) = send_empty(&app, Method::GET, "/heroes/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Hero not found" }));

    let (status, body) = send_json(
        &app,
        Method::PATCH,
        "/heroes/999",
        json!({ "name": "Nobody" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Hero not found");

    let (status, body) = send_empty(&app, Method::DELETE, "/heroes/999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Hero not found");

    let (_, heroes) = send_empty(&app, Method::GET, "/heroes/").await;
    assert_eq!(heroes, json!([]));
}

#[tokio::test]
async fn non_integer_id_is_unprocessable() {
    let app = app().await;

    let (status, body) = send_empty(&app, Method::GET, "/heroes/abc").await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["path", "hero_id"]));
}

#[tokio::test]
async fn list_returns_all_heroes_without_secrets() {
    let app = app().await;
    for (name, secret) in [
        ("Deadpond", "Dive Wilson"),
        ("Spider-Boy", "Pedro Parqueador"),
        ("Rusty-Man", "Tommy Sharp"),
    ] {
        create(&app, json!({ "name": name, "secretName": secret })).await;
    }

    let (status, body) = send_empty(&app, Method::GET, "/heroes/?offset=0&limit=100").await;

    assert_eq!(status, StatusCode::OK);
    let heroes = body.as_array().expect("list should be an array");
    assert_eq!(heroes.len(), 3);
    heroes.iter().for_each(assert_public_shape);
    assert_eq!(heroes[0]["name"], "Deadpond");
    assert_eq!(heroes[2]["name"], "Rusty-Man");
}

#[tokio::test]
async fn list_honours_offset_and_limit() {
    let app = app().await;
    for name in ["A", "B", "C", "D", "E"] {
        create(&app, json!({ "name": name, "secretName": "s" })).await;
    }

    let (status, body) = send_empty(&app, Method::GET, "/heroes/?offset=1&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .expect("list should be an array")
        .iter()
        .map(|hero| hero["name"].clone())
        .collect();
    assert_eq!(names, vec![json!("B"), json!("C")]);

    let (_, body) = send_empty(&app, Method::GET, "/heroes?limit=0").await;
    assert_eq!(body, json!([]));

    let (_, body) = send_empty(&app, Method::GET, "/heroes/?offset=10").await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_rejects_out_of_range_paging() {
    let app = app().await;

    let (status, body) = send_empty(&app, Method::GET, "/heroes/?limit=101").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["detail"][0]["loc"], json!(["query", "limit"]));
    assert_eq!(body["detail"][0]["type"], "less_than_equal");

    let (status, _) = send_empty(&app, Method::GET, "/heroes/?offset=-1").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send_empty(&app, Method::GET, "/heroes/?limit=many").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = app().await;
    let id = create(&app, json!({ "name": "Deadpond", "secretName": "Dive Wilson" })).await;

    let (status, body) = send_empty(&app, Method::DELETE, &format!("/heroes/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, body) = send_empty(&app, Method::GET, &format!("/heroes/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Hero not found");

    let (status, _) = send_empty(&app, Method::DELETE, &format!("/heroes/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let app = app().await;
    let first = create(&app, json!({ "name": "A", "secretName": "a" })).await;
    send_empty(&app, Method::DELETE, &format!("/heroes/{first}")).await;

    let second = create(&app, json!({ "name": "B", "secretName": "b" })).await;

    assert!(second > first);
}

#[tokio::test]
async fn memory_backend_serves_the_same_api() {
    let app = build_router(AppState::new(Database::memory()));

    let id = create(&app, json!({ "name": "Deadpond", "secretName": "Dive Wilson" })).await;
    let (status, body) = send_empty(&app, Method::GET, &format!("/heroes/{id}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_public_shape(&body);
}

#[tokio::test]
async fn healthcheck_reports_backend() {
    let app = app().await;

    let (status, body) = send_empty(&app, Method::GET, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "sqlite");
}
