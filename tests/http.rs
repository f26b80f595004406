use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

async fn app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::migrate!().run(&pool).await.unwrap();
    parlor::app(pool)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn message_scenario() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(post("/users", json!({ "username": "alice" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post("/rooms", json!({ "room_name": "general" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post("/user-room/add", json!({ "user_id": 1, "room_id": 1 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post(
            "/messages",
            json!({ "sender_id": 1, "room_id": 1, "message_text": "hi" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.clone().oneshot(get("/messages/room/1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["sender"], "alice");
    assert_eq!(history[0]["message_text"], "hi");
}

#[tokio::test]
async fn missing_message_field_is_bad_request() {
    let app = app().await;
    let response = app
        .oneshot(post("/messages", json!({ "sender_id": 1, "room_id": 1 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_unknown_message_is_not_found() {
    let app = app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/messages/999")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn double_join_conflicts() {
    let app = app().await;
    app.clone()
        .oneshot(post("/users", json!({ "username": "alice" })))
        .await
        .unwrap();
    app.clone()
        .oneshot(post("/rooms", json!({ "room_name": "general" })))
        .await
        .unwrap();

    let body = json!({ "user_id": 1, "room_id": 1 });
    let first = app
        .clone()
        .oneshot(post("/user-room/add", body.clone()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .clone()
        .oneshot(post("/user-room/add", body))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn join_unknown_room_is_not_found() {
    let app = app().await;
    app.clone()
        .oneshot(post("/users", json!({ "username": "alice" })))
        .await
        .unwrap();

    let response = app
        .oneshot(post("/user-room/add", json!({ "user_id": 1, "room_id": 9 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chat_round_trip() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(post(
            "/messages/chat-messages",
            json!({ "room_id": 3, "sender_id": 1, "message_text": "yo" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/messages/chat-messages/3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["rows"].as_array().unwrap().len(), 1);
    assert_eq!(page["rows"][0]["message_text"], "yo");
    assert!(page["next_cursor"].is_null());
}

#[tokio::test]
async fn malformed_chat_cursor_is_bad_request() {
    let app = app().await;
    let response = app
        .oneshot(get("/messages/chat-messages/3?cursor=garbage"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_room_name_is_bad_request() {
    let app = app().await;
    let response = app
        .oneshot(post("/rooms", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
