//! Shared helpers for the HTTP-level integration tests. The app is driven
//! through `tower::ServiceExt::oneshot` against an in-memory SQLite pool, so
//! the tests exercise the same router and middleware stack production uses.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

use roomly_backend::{build_router, config::Config, db, middleware::AppState};

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        jwt_expiry: 3600,
        upload_dir: std::env::temp_dir()
            .join("roomly-test-uploads")
            .to_string_lossy()
            .into_owned(),
        public_url: "http://localhost:8080".to_string(),
    }
}

/// In-memory pool limited to one connection so every handle sees the same
/// database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("failed to open in-memory database");
    db::init_schema(&pool).await.expect("failed to create schema");
    pool
}

/// Two-connection pool over a shared-cache in-memory database, for tests
/// that need requests to genuinely overlap. `name` keeps databases of
/// different tests apart.
pub async fn shared_pool(name: &str) -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect(&format!("sqlite:file:{}?mode=memory&cache=shared", name))
        .await
        .expect("failed to open shared in-memory database");
    db::init_schema(&pool).await.expect("failed to create schema");
    pool
}

pub fn build_test_app(pool: SqlitePool) -> Router {
    build_router(AppState {
        pool,
        config: test_config(),
    })
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("failed to read body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body was not valid JSON")
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    json: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(json.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    json: serde_json::Value,
    token: &str,
) -> Response<Body> {
    let request = Request::builder()
        .method("PUT")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(json.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub const BOUNDARY: &str = "------------------------roomlytestboundary";

/// Builds a multipart/form-data body out of text fields and file parts
/// (field name, file name, content type, bytes).
pub fn multipart_body(
    fields: &[(&str, &str)],
    files: &[(&str, &str, &str, &[u8])],
) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    for (name, file_name, content_type, data) in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub async fn post_multipart(
    app: Router,
    uri: &str,
    body: Vec<u8>,
    token: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder().method("POST").uri(uri).header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={}", BOUNDARY),
    );

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    app.oneshot(builder.body(Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// Registers an account through the API and returns a bearer token for it.
pub async fn auth_token(pool: &SqlitePool, username: &str, role: &str) -> String {
    let app = build_test_app(pool.clone());
    post_json(
        app,
        "/api/register",
        serde_json::json!({"username": username, "password": "pw123", "role": role}),
    )
    .await;

    let app = build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/login",
        serde_json::json!({"username": username, "password": "pw123"}),
    )
    .await;

    let json = body_json(response).await;
    json["token"].as_str().expect("login returned no token").to_string()
}

// -- Row fixtures inserted directly, for tests that are not about the
//    creation endpoints themselves. --

pub async fn seed_room(pool: &SqlitePool, room_number: &str, status: &str) -> i64 {
    let result = sqlx::query(
        r#"
        INSERT INTO rooms (
            room_number, rent_price, deposit, water_price, electricity_price,
            status, created_at
        )
        VALUES (?, 4500.0, 9000.0, 18.0, 8.0, ?, ?)
        "#,
    )
    .bind(room_number)
    .bind(status)
    .bind(Utc::now())
    .execute(pool)
    .await
    .unwrap();
    result.last_insert_rowid()
}

pub async fn seed_tenant(pool: &SqlitePool, fullname: &str, email: &str) -> i64 {
    let result = sqlx::query(
        "INSERT INTO tenants (fullname, email, created_at) VALUES (?, ?, ?)",
    )
    .bind(fullname)
    .bind(email)
    .bind(Utc::now())
    .execute(pool)
    .await
    .unwrap();
    result.last_insert_rowid()
}

pub async fn seed_contract(pool: &SqlitePool, tenant_id: i64, room_id: i64, deposit: f64) -> i64 {
    let result = sqlx::query(
        r#"
        INSERT INTO contracts (
            tenant_id, room_id, start_date, end_date, rent_amount,
            deposit_amount, status, created_at
        )
        VALUES (?, ?, '2026-01-01', '2026-12-31', 4500.0, ?, 'active', ?)
        "#,
    )
    .bind(tenant_id)
    .bind(room_id)
    .bind(deposit)
    .bind(Utc::now())
    .execute(pool)
    .await
    .unwrap();
    result.last_insert_rowid()
}

pub async fn room_status(pool: &SqlitePool, room_id: i64) -> String {
    let row: (String,) = sqlx::query_as("SELECT status FROM rooms WHERE id = ?")
        .bind(room_id)
        .fetch_one(pool)
        .await
        .unwrap();
    row.0
}
