mod common;

use axum::http::StatusCode;
use serde_json::json;

const FAKE_JPEG: &[u8] = b"\xff\xd8\xff\xe0fake-jpeg-bytes";

#[tokio::test]
async fn room_list_starts_empty() {
    let pool = common::test_pool().await;

    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/rooms").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn creating_a_room_requires_a_token() {
    let pool = common::test_pool().await;

    let body = common::multipart_body(&[("room_number", "A-101")], &[]);
    let app = common::build_test_app(pool);
    let response = common::post_multipart(app, "/api/rooms", body, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_room_with_images_and_fetch_it_back() {
    let pool = common::test_pool().await;
    let token = common::auth_token(&pool, "admin1", "admin").await;

    let body = common::multipart_body(
        &[
            ("room_number", "A-101"),
            ("room_type", "studio"),
            ("floor", "2"),
            ("size", "28.5"),
            ("rent_price", "4500"),
            ("deposit", "9000"),
            ("water_price", "18"),
            ("electricity_price", "8"),
            ("facilities", r#"["wifi", "aircon"]"#),
            ("description", "Corner unit"),
        ],
        &[
            ("cover_image", "cover.jpg", "image/jpeg", FAKE_JPEG),
            ("images", "one.jpg", "image/jpeg", FAKE_JPEG),
            ("images", "two.png", "image/png", FAKE_JPEG),
        ],
    );

    let app = common::build_test_app(pool.clone());
    let response = common::post_multipart(app, "/api/rooms", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = common::body_json(response).await;
    let room_id = json["room_id"].as_i64().unwrap();

    let app = common::build_test_app(pool);
    let response = common::get(app, &format!("/api/rooms/{}", room_id)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let room = common::body_json(response).await;
    assert_eq!(room["room_number"], "A-101");
    assert_eq!(room["status"], "available");
    assert_eq!(room["rent_price"], 4500.0);
    assert_eq!(room["facilities"], json!(["wifi", "aircon"]));

    let cover = room["cover_image_url"].as_str().unwrap();
    assert!(cover.starts_with("http://localhost:8080/uploads/rooms/"));
    assert_eq!(room["image_urls"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn create_room_without_room_number_persists_nothing() {
    let pool = common::test_pool().await;
    let token = common::auth_token(&pool, "admin1", "admin").await;

    let body = common::multipart_body(
        &[("rent_price", "4500")],
        &[("cover_image", "cover.jpg", "image/jpeg", FAKE_JPEG)],
    );

    let app = common::build_test_app(pool.clone());
    let response = common::post_multipart(app, "/api/rooms", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rooms")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn duplicate_room_number_is_rejected() {
    let pool = common::test_pool().await;
    let token = common::auth_token(&pool, "admin1", "admin").await;
    common::seed_room(&pool, "A-101", "available").await;

    // The UNIQUE constraint, not a pre-check, surfaces as a 400 here; the
    // cover image buffered for the rejected request must not leave a row.
    let body = common::multipart_body(
        &[("room_number", "A-101")],
        &[("cover_image", "cover.jpg", "image/jpeg", FAKE_JPEG)],
    );
    let app = common::build_test_app(pool.clone());
    let response = common::post_multipart(app, "/api/rooms", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = common::body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rooms")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

#[tokio::test]
async fn create_room_rejects_non_image_uploads() {
    let pool = common::test_pool().await;
    let token = common::auth_token(&pool, "admin1", "admin").await;

    let body = common::multipart_body(
        &[("room_number", "A-102")],
        &[("cover_image", "evil.exe", "application/octet-stream", b"MZ")],
    );

    let app = common::build_test_app(pool.clone());
    let response = common::post_multipart(app, "/api/rooms", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM rooms")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn fetching_a_missing_room_is_404() {
    let pool = common::test_pool().await;

    let app = common::build_test_app(pool);
    let response = common::get(app, "/api/rooms/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_missing_room_is_404() {
    let pool = common::test_pool().await;
    let token = common::auth_token(&pool, "admin1", "admin").await;

    let app = common::build_test_app(pool);
    let response = common::delete_auth(app, "/api/rooms/999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_room_writes_a_backup_snapshot() {
    let pool = common::test_pool().await;
    let token = common::auth_token(&pool, "admin1", "admin").await;
    let room_id = common::seed_room(&pool, "B-201", "available").await;

    let app = common::build_test_app(pool.clone());
    let response = common::delete_auth(app, &format!("/api/rooms/{}", room_id), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = common::get(app, &format!("/api/rooms/{}", room_id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let backup: (String, i64) =
        sqlx::query_as("SELECT table_name, row_id FROM backups WHERE table_name = 'rooms'")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(backup.0, "rooms");
    assert_eq!(backup.1, room_id);
}

#[tokio::test]
async fn partial_update_leaves_other_fields_alone() {
    let pool = common::test_pool().await;
    let token = common::auth_token(&pool, "admin1", "admin").await;
    let room_id = common::seed_room(&pool, "C-301", "available").await;

    let app = common::build_test_app(pool);
    let response = common::put_json_auth(
        app,
        &format!("/api/rooms/{}", room_id),
        json!({"rent_price": 5200.0}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let room = common::body_json(response).await;
    assert_eq!(room["rent_price"], 5200.0);
    assert_eq!(room["deposit"], 9000.0);
    assert_eq!(room["room_number"], "C-301");
}

#[tokio::test]
async fn maintenance_toggles_through_the_transition_table() {
    let pool = common::test_pool().await;
    let token = common::auth_token(&pool, "admin1", "admin").await;
    let room_id = common::seed_room(&pool, "D-401", "available").await;

    let app = common::build_test_app(pool.clone());
    let response = common::put_json_auth(
        app,
        &format!("/api/rooms/{}/status", room_id),
        json!({"transition": "begin_maintenance"}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let room = common::body_json(response).await;
    assert_eq!(room["status"], "maintenance");

    let app = common::build_test_app(pool.clone());
    let response = common::put_json_auth(
        app,
        &format!("/api/rooms/{}/status", room_id),
        json!({"transition": "end_maintenance"}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let room = common::body_json(response).await;
    assert_eq!(room["status"], "available");
}

#[tokio::test]
async fn invalid_transition_is_rejected_and_leaves_status_unchanged() {
    let pool = common::test_pool().await;
    let token = common::auth_token(&pool, "admin1", "admin").await;
    let room_id = common::seed_room(&pool, "E-501", "occupied").await;

    let app = common::build_test_app(pool.clone());
    let response = common::put_json_auth(
        app,
        &format!("/api/rooms/{}/status", room_id),
        json!({"transition": "reserve"}),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(common::room_status(&pool, room_id).await, "occupied");
}
