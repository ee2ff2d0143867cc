mod common;

use axum::http::StatusCode;

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let pool = common::test_pool().await;
    let app = common::build_test_app(pool);

    let response = common::get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn root_describes_the_service() {
    let pool = common::test_pool().await;
    let app = common::build_test_app(pool);

    let response = common::get(app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = common::body_json(response).await;
    assert_eq!(json["name"], "Roomly API");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let pool = common::test_pool().await;
    let app = common::build_test_app(pool);

    let response = common::get(app, "/api/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
