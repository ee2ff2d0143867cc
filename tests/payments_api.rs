mod common;

use axum::http::StatusCode;
use serde_json::json;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nfake image payload";

#[tokio::test]
async fn payment_with_slip_round_trip() {
    let pool = common::test_pool().await;
    let token = common::auth_token(&pool, "admin1", "admin").await;
    let room_id = common::seed_room(&pool, "A-101", "occupied").await;
    let tenant_id = common::seed_tenant(&pool, "Somchai J.", "somchai@example.com").await;
    let contract_id = common::seed_contract(&pool, tenant_id, room_id, 9000.0).await;

    let contract = contract_id.to_string();
    let body = common::multipart_body(
        &[
            ("contract_id", &contract),
            ("amount", "4500.0"),
            ("method", "bank_transfer"),
            ("payment_date", "2026-08-05"),
        ],
        &[("slip", "slip.png", "image/png", PNG_BYTES)],
    );

    let app = common::build_test_app(pool.clone());
    let response = common::post_multipart(app, "/api/payments", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = common::body_json(response).await;
    let payment_id = created["payment_id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = common::get_auth(
        app,
        &format!("/api/payments/contract/{}", contract_id),
        &token,
    )
    .await;
    let json = common::body_json(response).await;
    let payments = json.as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["id"], payment_id);
    assert_eq!(payments[0]["amount"], 4500.0);
    assert_eq!(payments[0]["method"], "bank_transfer");
    assert_eq!(payments[0]["status"], "pending");

    let slip_url = payments[0]["slip_image_url"].as_str().unwrap();
    assert!(slip_url.starts_with("http://localhost:8080/uploads/payments/"));
    assert!(slip_url.ends_with(".png"));

    let app = common::build_test_app(pool);
    let response = common::put_json_auth(
        app,
        &format!("/api/payments/{}/status", payment_id),
        json!({"status": "completed"}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn payment_validation_rejects_bad_input() {
    let pool = common::test_pool().await;
    let token = common::auth_token(&pool, "admin1", "admin").await;
    let room_id = common::seed_room(&pool, "A-101", "occupied").await;
    let tenant_id = common::seed_tenant(&pool, "Somchai J.", "somchai@example.com").await;
    let contract_id = common::seed_contract(&pool, tenant_id, room_id, 9000.0).await;
    let contract = contract_id.to_string();

    // Missing amount
    let body = common::multipart_body(&[("contract_id", &contract)], &[]);
    let app = common::build_test_app(pool.clone());
    let response = common::post_multipart(app, "/api/payments", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Non-positive amount
    let body = common::multipart_body(&[("contract_id", &contract), ("amount", "0")], &[]);
    let app = common::build_test_app(pool.clone());
    let response = common::post_multipart(app, "/api/payments", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown method
    let body = common::multipart_body(
        &[("contract_id", &contract), ("amount", "100"), ("method", "barter")],
        &[],
    );
    let app = common::build_test_app(pool.clone());
    let response = common::post_multipart(app, "/api/payments", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Slip that is not an image
    let body = common::multipart_body(
        &[("contract_id", &contract), ("amount", "100")],
        &[("slip", "slip.html", "text/html", b"<script></script>")],
    );
    let app = common::build_test_app(pool.clone());
    let response = common::post_multipart(app, "/api/payments", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Unknown contract
    let body = common::multipart_body(&[("contract_id", "999"), ("amount", "100")], &[]);
    let app = common::build_test_app(pool.clone());
    let response = common::post_multipart(app, "/api/payments", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Nothing was persisted by any of the rejected requests.
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM payments")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn payment_listing_and_status_updates_are_admin_only() {
    let pool = common::test_pool().await;
    let user_token = common::auth_token(&pool, "alice", "user").await;

    let app = common::build_test_app(pool.clone());
    let response = common::get_auth(app, "/api/payments", &user_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = common::put_json_auth(
        app,
        "/api/payments/1/status",
        json!({"status": "completed"}),
        &user_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
