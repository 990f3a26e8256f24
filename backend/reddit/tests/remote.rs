use std::{
    collections::HashMap,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reddit::{
    Credentials, Endpoints, Platform, RedditClient, RedditError, TimeWindow, get_access_token,
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

// base64("app:secret")
const BASIC_AUTH: &str = "Basic YXBwOnNlY3JldA==";

#[derive(Default)]
struct FakeReddit {
    expires_in: u64,
    token_requests: AtomicUsize,
}

fn listing(children: Vec<Value>) -> Value {
    json!({
        "kind": "Listing",
        "data": {
            "after": null,
            "children": children.into_iter().map(|data| json!({"kind": "t3", "data": data})).collect::<Vec<_>>(),
        }
    })
}

async fn token_handler(
    State(fake): State<Arc<FakeReddit>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let count = fake.token_requests.fetch_add(1, Ordering::SeqCst) + 1;

    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(BASIC_AUTH);

    if !authorized || params.get("grant_type").map(String::as_str) != Some("client_credentials") {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": 401}))).into_response();
    }

    Json(json!({
        "access_token": format!("token-{count}"),
        "token_type": "bearer",
        "expires_in": fake.expires_in,
        "scope": "*",
    }))
    .into_response()
}

fn bearer_ok(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("Bearer token-"))
}

async fn top_handler(
    Path(subreddit): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    assert_eq!(subreddit, "funny");
    assert_eq!(params.get("t").map(String::as_str), Some("day"));
    assert_eq!(params.get("limit").map(String::as_str), Some("25"));

    Json(listing(vec![
        json!({"id": "a1", "name": "t3_a1", "title": "Post A", "author": "alice", "ups": 15, "score": 15}),
        json!({"id": "b2", "name": "t3_b2", "title": "Post B", "author": "bob", "ups": 18, "score": 18}),
    ]))
    .into_response()
}

async fn by_id_handler(Path(names): Path<String>, headers: HeaderMap) -> Response {
    if !bearer_ok(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let children = names
        .split(',')
        .map(|name| {
            let id = name.trim_start_matches("t3_");
            json!({"id": id, "name": name, "title": format!("Post {id}"), "author": "carol", "score": 42})
        })
        .collect();

    Json(listing(children)).into_response()
}

async fn spawn_fake(expires_in: u64) -> (SocketAddr, Arc<FakeReddit>) {
    let fake = Arc::new(FakeReddit {
        expires_in,
        ..Default::default()
    });

    let app = Router::new()
        .route("/api/v1/access_token", post(token_handler))
        .route("/r/{subreddit}/top", get(top_handler))
        .route("/by_id/{names}", get(by_id_handler))
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, fake)
}

fn endpoints(addr: SocketAddr) -> Endpoints {
    Endpoints {
        auth_url: format!("http://{addr}"),
        api_url: format!("http://{addr}"),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_token_exchange() {
    let (addr, _) = spawn_fake(86_400).await;
    let http = reqwest::Client::new();

    let token = get_access_token(
        &http,
        &format!("http://{addr}"),
        &Credentials::new("app", "secret"),
    )
    .await
    .unwrap();

    assert_eq!(token.access_token, "token-1");
    assert_eq!(token.token_type, "bearer");
    assert_eq!(token.expires_in, 86_400);
    assert_eq!(token.scope, "*");
}

#[tokio::test]
async fn test_token_exchange_rejected() {
    let (addr, _) = spawn_fake(86_400).await;

    let result = RedditClient::connect(Credentials::new("app", "wrong"), endpoints(addr)).await;

    assert!(matches!(
        result,
        Err(RedditError::Status { status, .. }) if status == reqwest::StatusCode::UNAUTHORIZED
    ));
}

#[tokio::test]
async fn test_missing_credentials_skip_network() {
    let (addr, fake) = spawn_fake(86_400).await;

    let result = RedditClient::connect(Credentials::new("", "secret"), endpoints(addr)).await;

    assert!(matches!(result, Err(RedditError::MissingCredentials)));
    assert_eq!(fake.token_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_top_posts() {
    let (addr, _) = spawn_fake(86_400).await;
    let client = RedditClient::connect(Credentials::new("app", "secret"), endpoints(addr))
        .await
        .unwrap();

    let posts = client.top_posts("funny", TimeWindow::Day, 25).await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].title, "Post A");
    assert_eq!(posts[0].ups, 15);
    assert_eq!(posts[1].author, "bob");
}

#[tokio::test]
async fn test_posts_by_id() {
    let (addr, _) = spawn_fake(86_400).await;
    let client = RedditClient::connect(Credentials::new("app", "secret"), endpoints(addr))
        .await
        .unwrap();

    let posts = client
        .posts_by_id(&["t3_a1".to_string(), "t3_b2".to_string()])
        .await
        .unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[1].id, "b2");
    assert_eq!(posts[1].score, 42);

    assert!(client.posts_by_id(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_expired_token_is_refreshed() {
    let (addr, fake) = spawn_fake(1).await;
    let client = RedditClient::connect(Credentials::new("app", "secret"), endpoints(addr))
        .await
        .unwrap();
    assert_eq!(fake.token_requests.load(Ordering::SeqCst), 1);

    client.top_posts("funny", TimeWindow::Day, 25).await.unwrap();
    assert_eq!(fake.token_requests.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_millis(1_100)).await;
    client.top_posts("funny", TimeWindow::Day, 25).await.unwrap();

    assert_eq!(fake.token_requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unreachable_api_is_an_error() {
    let (addr, _) = spawn_fake(86_400).await;
    let mut endpoints = endpoints(addr);
    endpoints.api_url = "http://127.0.0.1:1".to_string();

    let client = RedditClient::connect(Credentials::new("app", "secret"), endpoints)
        .await
        .unwrap();

    let result = client.top_posts("funny", TimeWindow::Day, 25).await;
    assert!(matches!(result, Err(RedditError::Http(_))));
}
