use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::{is_admin, AppState, AuthUser};
use crate::models::{Backup, CreateReportRequest, Report};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(get_dashboard))
        .route("/reports", get(list_reports))
        .route("/reports", post(create_report))
        .route("/backups", get(list_backups))
}

async fn count(state: &AppState, sql: &str) -> AppResult<i64> {
    let row: (i64,) = sqlx::query_as(sql).fetch_one(&state.pool).await?;
    Ok(row.0)
}

/// Count aggregates for the admin landing page; recomputed per request
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard aggregates"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Value>> {
    if !is_admin(&auth_user.role) {
        return Err(AppError::Forbidden);
    }

    let total_users = count(&state, "SELECT COUNT(*) FROM users").await?;
    let total_tenants = count(&state, "SELECT COUNT(*) FROM tenants").await?;
    let total_rooms = count(&state, "SELECT COUNT(*) FROM rooms").await?;
    let available_rooms =
        count(&state, "SELECT COUNT(*) FROM rooms WHERE status = 'available'").await?;
    let occupied_rooms =
        count(&state, "SELECT COUNT(*) FROM rooms WHERE status = 'occupied'").await?;
    let reserved_rooms =
        count(&state, "SELECT COUNT(*) FROM rooms WHERE status = 'reserved'").await?;
    let maintenance_rooms =
        count(&state, "SELECT COUNT(*) FROM rooms WHERE status = 'maintenance'").await?;
    let active_contracts =
        count(&state, "SELECT COUNT(*) FROM contracts WHERE status = 'active'").await?;
    let pending_bookings =
        count(&state, "SELECT COUNT(*) FROM bookings WHERE status = 'pending'").await?;
    let pending_maintenance = count(
        &state,
        "SELECT COUNT(*) FROM maintenance_requests WHERE status != 'completed'",
    )
    .await?;
    let unpaid_bills = count(
        &state,
        "SELECT COUNT(*) FROM utility_bills WHERE status IN ('pending', 'unpaid')",
    )
    .await?;

    let monthly_revenue: (Option<f64>,) = sqlx::query_as(
        r#"
        SELECT SUM(amount) FROM payments
        WHERE status = 'completed'
          AND strftime('%Y-%m', payment_date) = strftime('%Y-%m', 'now')
        "#,
    )
    .fetch_one(&state.pool)
    .await?;

    Ok(Json(json!({
        "users": total_users,
        "tenants": total_tenants,
        "rooms": {
            "total": total_rooms,
            "available": available_rooms,
            "occupied": occupied_rooms,
            "reserved": reserved_rooms,
            "maintenance": maintenance_rooms
        },
        "active_contracts": active_contracts,
        "pending_bookings": pending_bookings,
        "pending_maintenance": pending_maintenance,
        "unpaid_bills": unpaid_bills,
        "monthly_revenue": monthly_revenue.0.unwrap_or(0.0)
    })))
}

pub async fn list_reports(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<Report>>> {
    if !is_admin(&auth_user.role) {
        return Err(AppError::Forbidden);
    }

    let reports = sqlx::query_as::<_, Report>("SELECT * FROM reports ORDER BY created_at DESC")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(reports))
}

pub async fn create_report(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(payload): Json<CreateReportRequest>,
) -> AppResult<(StatusCode, Json<Report>)> {
    if !is_admin(&auth_user.role) {
        return Err(AppError::Forbidden);
    }

    if payload.title.trim().is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }

    let report = sqlx::query_as::<_, Report>(
        r#"
        INSERT INTO reports (title, content, created_by, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(payload.title.trim())
    .bind(&payload.content)
    .bind(auth_user.user_id)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn list_backups(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<Backup>>> {
    if !is_admin(&auth_user.role) {
        return Err(AppError::Forbidden);
    }

    let backups = sqlx::query_as::<_, Backup>("SELECT * FROM backups ORDER BY created_at DESC")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(backups))
}
