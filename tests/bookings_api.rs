mod common;

use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn booking_reserves_an_available_room() {
    let pool = common::test_pool().await;
    let room_id = common::seed_room(&pool, "A-101", "available").await;

    let app = common::build_test_app(pool.clone());
    let response = common::post_json(
        app,
        "/api/bookings",
        json!({
            "room_id": room_id,
            "name": "Somchai",
            "email": "somchai@example.com",
            "phone": "0812345678",
            "check_in_date": "2026-09-01",
            "duration": 6
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert!(json["booking_id"].as_i64().unwrap() > 0);

    assert_eq!(common::room_status(&pool, room_id).await, "reserved");
}

#[tokio::test]
async fn concurrent_bookings_for_one_room_reserve_it_at_most_once() {
    // Two connections over a shared database, so the requests really overlap
    // and the compare-and-set on the room status has to arbitrate.
    let pool = common::shared_pool("bookings_race").await;
    let room_id = common::seed_room(&pool, "A-101", "available").await;

    let payload = json!({
        "room_id": room_id,
        "name": "Somchai",
        "check_in_date": "2026-09-01"
    });

    let first = common::post_json(
        common::build_test_app(pool.clone()),
        "/api/bookings",
        payload.clone(),
    );
    let second = common::post_json(
        common::build_test_app(pool.clone()),
        "/api/bookings",
        payload,
    );
    let (first, second) = tokio::join!(first, second);

    let successes = [first.status(), second.status()]
        .into_iter()
        .filter(|status| *status == StatusCode::OK)
        .count();
    assert!(successes <= 1, "both concurrent bookings succeeded");

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings WHERE room_id = ?")
        .bind(room_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0 as usize, successes);

    let expected = if successes == 1 { "reserved" } else { "available" };
    assert_eq!(common::room_status(&pool, room_id).await, expected);
}

#[tokio::test]
async fn booking_an_occupied_room_fails_and_status_is_untouched() {
    let pool = common::test_pool().await;
    let room_id = common::seed_room(&pool, "A-102", "occupied").await;

    let app = common::build_test_app(pool.clone());
    let response = common::post_json(
        app,
        "/api/bookings",
        json!({
            "room_id": room_id,
            "name": "Somchai",
            "check_in_date": "2026-09-01"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(common::room_status(&pool, room_id).await, "occupied");

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bookings")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 0);
}

#[tokio::test]
async fn booking_an_unknown_room_is_404() {
    let pool = common::test_pool().await;

    let app = common::build_test_app(pool);
    let response = common::post_json(
        app,
        "/api/bookings",
        json!({"room_id": 999, "name": "Somchai", "check_in_date": "2026-09-01"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn booking_requires_a_name_and_valid_email() {
    let pool = common::test_pool().await;
    let room_id = common::seed_room(&pool, "A-103", "available").await;

    let app = common::build_test_app(pool.clone());
    let response = common::post_json(
        app,
        "/api/bookings",
        json!({"room_id": room_id, "name": "  ", "check_in_date": "2026-09-01"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let app = common::build_test_app(pool.clone());
    let response = common::post_json(
        app,
        "/api/bookings",
        json!({
            "room_id": room_id,
            "name": "Somchai",
            "email": "not-an-email",
            "check_in_date": "2026-09-01"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Both rejections happened before the room was touched.
    assert_eq!(common::room_status(&pool, room_id).await, "available");
}

#[tokio::test]
async fn listing_bookings_is_admin_only() {
    let pool = common::test_pool().await;
    let room_id = common::seed_room(&pool, "A-104", "available").await;
    let admin_token = common::auth_token(&pool, "admin1", "admin").await;
    let user_token = common::auth_token(&pool, "bob", "user").await;

    let app = common::build_test_app(pool.clone());
    common::post_json(
        app,
        "/api/bookings",
        json!({"room_id": room_id, "name": "Somchai", "check_in_date": "2026-09-01"}),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = common::get(app, "/api/bookings").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool.clone());
    let response = common::get_auth(app, "/api/bookings", &user_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = common::get_auth(app, "/api/bookings", &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    let bookings = json.as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["room_number"], "A-104");
    assert_eq!(bookings[0]["status"], "pending");
}

#[tokio::test]
async fn cancelling_a_booking_releases_the_room() {
    let pool = common::test_pool().await;
    let room_id = common::seed_room(&pool, "A-105", "available").await;
    let admin_token = common::auth_token(&pool, "admin1", "admin").await;

    let app = common::build_test_app(pool.clone());
    let response = common::post_json(
        app,
        "/api/bookings",
        json!({"room_id": room_id, "name": "Somchai", "check_in_date": "2026-09-01"}),
    )
    .await;
    let booking_id = common::body_json(response).await["booking_id"].as_i64().unwrap();
    assert_eq!(common::room_status(&pool, room_id).await, "reserved");

    let app = common::build_test_app(pool.clone());
    let response = common::put_json_auth(
        app,
        &format!("/api/bookings/{}/status", booking_id),
        json!({"status": "cancelled"}),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(common::room_status(&pool, room_id).await, "available");

    // A cancelled booking is terminal.
    let app = common::build_test_app(pool);
    let response = common::put_json_auth(
        app,
        &format!("/api/bookings/{}/status", booking_id),
        json!({"status": "confirmed"}),
        &admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn new_booking_notifies_every_admin() {
    let pool = common::test_pool().await;
    let room_id = common::seed_room(&pool, "A-106", "available").await;
    let admin_token = common::auth_token(&pool, "admin1", "admin").await;
    let user_token = common::auth_token(&pool, "bob", "user").await;

    let app = common::build_test_app(pool.clone());
    common::post_json(
        app,
        "/api/bookings",
        json!({"room_id": room_id, "name": "Somchai", "check_in_date": "2026-09-01"}),
    )
    .await;

    let app = common::build_test_app(pool.clone());
    let response = common::get_auth(app, "/api/notifications", &admin_token).await;
    let json = common::body_json(response).await;
    let notifications = json.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["notification_type"], "booking");

    // Regular users are not notified.
    let app = common::build_test_app(pool.clone());
    let response = common::get_auth(app, "/api/notifications", &user_token).await;
    let json = common::body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 0);

    let app = common::build_test_app(pool);
    let response = common::get_auth(app, "/api/notifications/unread-count", &admin_token).await;
    let json = common::body_json(response).await;
    assert_eq!(json["count"], 1);
}

#[tokio::test]
async fn deleting_a_booking_snapshots_it_first() {
    let pool = common::test_pool().await;
    let room_id = common::seed_room(&pool, "A-107", "available").await;
    let admin_token = common::auth_token(&pool, "admin1", "admin").await;

    let app = common::build_test_app(pool.clone());
    let response = common::post_json(
        app,
        "/api/bookings",
        json!({"room_id": room_id, "name": "Somchai", "check_in_date": "2026-09-01"}),
    )
    .await;
    let booking_id = common::body_json(response).await["booking_id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response =
        common::delete_auth(app, &format!("/api/bookings/{}", booking_id), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let backup: (String,) =
        sqlx::query_as("SELECT table_name FROM backups WHERE row_id = ? AND table_name = 'bookings'")
            .bind(booking_id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(backup.0, "bookings");
}
