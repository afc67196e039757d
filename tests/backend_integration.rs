use axum::{Json, Router, http::StatusCode, routing::post};
use chat_widget::backend::{BackendError, ChatBackend, HttpChatBackend};
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

async fn serve(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/chat").parse().unwrap()
}

#[tokio::test]
async fn test_posts_json_input_and_reads_response() {
    // The Json extractor rejects bodies without `Content-Type: application/json`.
    let app = Router::new().route(
        "/chat",
        post(|Json(body): Json<Value>| async move {
            Json(json!({ "response": format!("echo: {}", body["input"].as_str().unwrap_or("")) }))
        }),
    );
    let backend = HttpChatBackend::new(serve(app).await, None).unwrap();

    let reply = backend.send("where is my parcel").await.unwrap();
    assert_eq!(reply, "echo: where is my parcel");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "response": "[ERROR] exploded" })),
            )
        }),
    );
    let backend = HttpChatBackend::new(serve(app).await, None).unwrap();

    assert_eq!(backend.send("hi").await, Err(BackendError::Status(500)));
}

#[tokio::test]
async fn test_malformed_body_is_a_decode_error() {
    let app = Router::new().route("/chat", post(|| async { Json(json!({ "answer": "wrong key" })) }));
    let backend = HttpChatBackend::new(serve(app).await, None).unwrap();

    assert!(matches!(
        backend.send("hi").await,
        Err(BackendError::Decode(_))
    ));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let url: Url = format!("http://{addr}/chat").parse().unwrap();
    let backend = HttpChatBackend::new(url, None).unwrap();

    assert!(matches!(
        backend.send("hi").await,
        Err(BackendError::Transport(_))
    ));
}

#[tokio::test]
async fn test_optional_timeout_applies() {
    let app = Router::new().route(
        "/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "response": "too late" }))
        }),
    );
    let backend =
        HttpChatBackend::new(serve(app).await, Some(Duration::from_millis(100))).unwrap();

    assert!(matches!(
        backend.send("hi").await,
        Err(BackendError::Transport(_))
    ));
}
