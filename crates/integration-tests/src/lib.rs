//! Integration test harness for the Kicks storefront.
//!
//! Tests drive the fully assembled router in-process with
//! `tower::ServiceExt::oneshot`, backed by a migrated `SQLite` database.
//! No server or external database is needed:
//!
//! ```bash
//! cargo test -p kicks-integration-tests
//! ```
//!
//! # Test Files
//!
//! - `auth` - Signup, login, session status and rotation
//! - `catalog` - Item listing and lookup, health checks
//! - `transaction` - Checkout validation, commit and concurrency
//! - `order_history` - Grouping of purchases by confirmation code
//! - `rate_limit` - Per-client limits on `/signup` and `/login`

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::missing_panics_doc)]

use std::path::PathBuf;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use sqlx::SqlitePool;
use tower::ServiceExt;

use kicks_core::{Gender, ItemId, Price};
use kicks_storefront::config::StorefrontConfig;
use kicks_storefront::db::{self, ItemRepository, OrderRepository};
use kicks_storefront::middleware::SESSION_TOKEN_HEADER;
use kicks_storefront::models::{Item, NewItem};
use kicks_storefront::state::AppState;

/// Session secret used by every test app.
pub const TEST_SESSION_SECRET: &str = "it-Kq9#vT2!pL7@wZ4$rN8&mB3^xC6*hJ1";

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// Body parsed as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("body is not JSON ({e}): {}", self.text()))
    }

    /// Body as UTF-8 text.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The `message` field of a JSON body.
    pub fn message(&self) -> String {
        self.json()["message"]
            .as_str()
            .expect("body has a string message")
            .to_owned()
    }
}

/// The assembled storefront over its own database.
pub struct TestContext {
    pub app: Router,
    pub pool: SqlitePool,
    db_file: Option<PathBuf>,
}

impl TestContext {
    /// App over a private in-memory database.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// App over a private in-memory database, with the default test
    /// configuration adjusted by `configure`.
    pub async fn with_config(configure: impl FnOnce(&mut StorefrontConfig)) -> Self {
        let pool = db::create_memory_pool().await.expect("open in-memory database");
        Self::with_pool(pool, None, configure).await
    }

    /// App over a temporary database file, for tests that need real
    /// concurrent connections. The file is removed on drop.
    pub async fn with_file_database() -> Self {
        let path = std::env::temp_dir().join(format!("kicks-it-{}.db", uuid::Uuid::new_v4()));
        let url = SecretString::from(format!("sqlite://{}", path.display()));
        let pool = db::create_pool(&url).await.expect("open database file");
        Self::with_pool(pool, Some(path), |_| {}).await
    }

    async fn with_pool(
        pool: SqlitePool,
        db_file: Option<PathBuf>,
        configure: impl FnOnce(&mut StorefrontConfig),
    ) -> Self {
        db::run_migrations(&pool).await.expect("apply migrations");

        let mut config = StorefrontConfig::with_defaults(
            SecretString::from("sqlite::memory:"),
            SecretString::from(TEST_SESSION_SECRET),
        );
        configure(&mut config);
        let app = kicks_storefront::app(AppState::new(config, pool.clone()));

        Self { app, pool, db_file }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET` with an optional session token.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        let request = with_token(Request::builder().method(Method::GET).uri(uri), token)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// `POST` a JSON body with an optional session token.
    pub async fn post_json(&self, uri: &str, body: &Value, token: Option<&str>) -> TestResponse {
        let request = with_token(Request::builder().method(Method::POST).uri(uri), token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// `POST` a urlencoded form.
    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(urlencode(fields)))
            .unwrap();
        self.send(request).await
    }

    /// `POST` a `multipart/form-data` body, as the browser frontend does.
    pub async fn post_multipart(&self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let boundary = "kicks-test-boundary";
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{boundary}--\r\n"));

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Create an account, asserting success.
    pub async fn signup(&self, username: &str, password: &str) {
        let response = self
            .post_form("/signup", &[("username", username), ("password", password)])
            .await;
        assert_eq!(response.status, StatusCode::OK, "signup failed: {}", response.text());
    }

    /// Log in, asserting success, and return the session token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .post_form("/login", &[("username", username), ("password", password)])
            .await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {}", response.text());
        response.json()["token"]
            .as_str()
            .expect("token in login response")
            .to_owned()
    }

    /// Sign up and log in a fresh user, returning the session token.
    pub async fn logged_in_user(&self, username: &str) -> String {
        self.signup(username, "pa55word").await;
        self.login(username, "pa55word").await
    }

    /// Add an item to the catalog.
    pub async fn seed_item(&self, name: &str, availability: i64) -> Item {
        ItemRepository::new(&self.pool)
            .create(&NewItem {
                name: name.to_owned(),
                image: format!("img/sneakers/{}.jpg", name.to_lowercase().replace(' ', "-")),
                price: Price::from_dollars(110),
                availability,
                gender: Gender::Men,
            })
            .await
            .expect("seed item")
    }

    /// Current stock of an item.
    pub async fn availability(&self, id: ItemId) -> i64 {
        ItemRepository::new(&self.pool)
            .get(id)
            .await
            .expect("read item")
            .expect("item exists")
            .availability
    }

    /// Total order lines written.
    pub async fn order_line_count(&self) -> i64 {
        OrderRepository::new(&self.pool)
            .count()
            .await
            .expect("count orders")
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        if let Some(path) = &self.db_file {
            for suffix in ["", "-wal", "-shm"] {
                let mut file = path.clone().into_os_string();
                file.push(suffix);
                let _ = std::fs::remove_file(file);
            }
        }
    }
}

/// JSON-encode a token for the `token` header.
pub fn token_header(token: &str) -> String {
    Value::String(token.to_owned()).to_string()
}

fn with_token(
    builder: axum::http::request::Builder,
    token: Option<&str>,
) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(SESSION_TOKEN_HEADER, token_header(token)),
        None => builder,
    }
}

/// Percent-encode form fields.
fn urlencode(fields: &[(&str, &str)]) -> String {
    fn encode(s: &str) -> String {
        s.bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    (b as char).to_string()
                }
                b' ' => "+".to_owned(),
                _ => format!("%{b:02X}"),
            })
            .collect()
    }

    fields
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
