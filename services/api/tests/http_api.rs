use std::net::SocketAddr;
use std::sync::Arc;

use api_lib::adapters::MemorySiteRepository;
use api_lib::config::Config;
use api_lib::web::{build_router, AppState};
use gakbbul_core::description::DisabledDescriptionService;
use gakbbul_core::domain::SiteFormData;
use gakbbul_core::ports::SiteRepository;
use gakbbul_core::ui::AdminLockPolicy;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const APP_PASSWORD: &str = "open-sesame";

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().expect("bind address"),
        database_url: None,
        log_level: tracing::Level::INFO,
        app_password: APP_PASSWORD.to_string(),
        admin_password: "admin".to_string(),
        admin_lock_policy: AdminLockPolicy::KeepForSession,
        description_api_key: None,
        description_api_base: "http://127.0.0.1:9".to_string(),
        description_model: "test-model".to_string(),
        cors_origin: "http://localhost:3000".to_string(),
    }
}

async fn spawn_server(repository: Arc<MemorySiteRepository>) -> SocketAddr {
    let state = Arc::new(AppState::new(
        repository,
        Arc::new(DisabledDescriptionService),
        Arc::new(test_config()),
    ));
    let app = build_router(state).expect("router");
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    addr
}

struct RawResponse {
    status: u16,
    head: String,
    body: String,
}

impl RawResponse {
    fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.head
            .lines()
            .find(|line| line.to_ascii_lowercase().starts_with(&prefix))
            .map(|line| line[prefix.len()..].trim().to_string())
    }
}

async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    headers: &[(&str, &str)],
    body: Option<&str>,
) -> RawResponse {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    for (k, v) in headers {
        req.push_str(&format!("{k}: {v}\r\n"));
    }
    if let Some(body) = body {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n", body.len()));
    }
    req.push_str("\r\n");
    if let Some(body) = body {
        req.push_str(body);
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    RawResponse {
        status,
        head: head.to_string(),
        body: body.to_string(),
    }
}

fn unlock_body() -> String {
    format!(r#"{{"password":"{APP_PASSWORD}"}}"#)
}

async fn unlock(addr: SocketAddr) -> String {
    let response = send_raw(
        addr,
        "POST",
        "/auth/unlock",
        &[],
        Some(unlock_body().as_str()),
    )
    .await;
    assert_eq!(response.status, 200, "body: {}", response.body);
    let cookie = response.header("set-cookie").expect("session cookie");
    cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

fn form(url: &str, title: &str, description: &str) -> SiteFormData {
    SiteFormData {
        url: url.to_string(),
        title: title.to_string(),
        description: description.to_string(),
    }
}

#[tokio::test]
async fn wrong_password_is_rejected_without_cookie() {
    let addr = spawn_server(Arc::new(MemorySiteRepository::new())).await;
    let response = send_raw(
        addr,
        "POST",
        "/auth/unlock",
        &[],
        Some(r#"{"password":"guess"}"#),
    )
    .await;
    assert_eq!(response.status, 401);
    assert_eq!(response.body, "접근 권한이 없습니다.");
    assert!(response.header("set-cookie").is_none());
}

#[tokio::test]
async fn unlock_issues_a_session_scoped_cookie() {
    let addr = spawn_server(Arc::new(MemorySiteRepository::new())).await;
    let response = send_raw(
        addr,
        "POST",
        "/auth/unlock",
        &[],
        Some(unlock_body().as_str()),
    )
    .await;
    assert_eq!(response.status, 200);
    let cookie = response.header("set-cookie").expect("session cookie");
    assert!(cookie.starts_with("gakbbul_unlocked="));
    assert!(!cookie.contains("Max-Age"));

    let body: Value = serde_json::from_str(&response.body).expect("json body");
    assert_eq!(body["unlocked"], Value::Bool(true));
}

#[tokio::test]
async fn sites_require_an_unlocked_session() {
    let addr = spawn_server(Arc::new(MemorySiteRepository::new())).await;

    let response = send_raw(addr, "GET", "/sites", &[], None).await;
    assert_eq!(response.status, 401);

    let response = send_raw(
        addr,
        "GET",
        "/sites",
        &[("Cookie", "gakbbul_unlocked=never-unlocked")],
        None,
    )
    .await;
    assert_eq!(response.status, 401);
}

#[tokio::test]
async fn sites_are_listed_newest_first_and_filtered() {
    let repository = Arc::new(MemorySiteRepository::new());
    repository
        .add(form("docs.rs", "Rust Docs", "Crate documentation"))
        .await
        .expect("add docs");
    repository
        .add(form("www.example.com", "Example", ""))
        .await
        .expect("add example");

    let addr = spawn_server(repository).await;
    let cookie = unlock(addr).await;

    let response = send_raw(addr, "GET", "/sites", &[("Cookie", cookie.as_str())], None).await;
    assert_eq!(response.status, 200, "body: {}", response.body);
    let cards: Value = serde_json::from_str(&response.body).expect("json body");
    let cards = cards.as_array().expect("array");
    assert_eq!(cards.len(), 2);
    assert_eq!(cards[0]["title"], "Example");
    assert_eq!(cards[0]["name"], "example.com");
    assert_eq!(cards[0]["target_url"], "https://www.example.com");

    let response = send_raw(addr, "GET", "/sites?q=EXAM", &[("Cookie", cookie.as_str())], None).await;
    let cards: Value = serde_json::from_str(&response.body).expect("json body");
    assert_eq!(cards.as_array().expect("array").len(), 1);

    let response = send_raw(addr, "GET", "/sites?q=zzz", &[("Cookie", cookie.as_str())], None).await;
    let cards: Value = serde_json::from_str(&response.body).expect("json body");
    assert!(cards.as_array().expect("array").is_empty());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let addr = spawn_server(Arc::new(MemorySiteRepository::new())).await;
    let response = send_raw(addr, "GET", "/api-docs/openapi.json", &[], None).await;
    assert_eq!(response.status, 200);
    let doc: Value = serde_json::from_str(&response.body).expect("json body");
    assert!(doc["paths"]["/sites"].is_object());
    assert!(doc["paths"]["/auth/unlock"].is_object());
}
