use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;

use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::{
    CreateMaintenanceRequest, MaintenanceRequest, MaintenanceStatus, MaintenanceWithRoom,
    UpdateMaintenanceStatusRequest,
};
use crate::services::notification_service;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests))
        .route("/", post(create_request))
        .route("/:id", get(get_request))
        .route("/:id/status", put(update_status))
}

pub async fn list_requests(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<Vec<MaintenanceWithRoom>>> {
    let requests = sqlx::query_as::<_, MaintenanceWithRoom>(
        r#"
        SELECT m.id, m.room_id, r.room_number, m.description, m.status,
               m.technician, m.reported_at, m.resolved_at
        FROM maintenance_requests m
        JOIN rooms r ON r.id = m.room_id
        ORDER BY m.reported_at DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(requests))
}

pub async fn get_request(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<MaintenanceRequest>> {
    let request =
        sqlx::query_as::<_, MaintenanceRequest>("SELECT * FROM maintenance_requests WHERE id = ?")
            .bind(id)
            .fetch_optional(&state.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Maintenance request not found".to_string()))?;

    Ok(Json(request))
}

pub async fn create_request(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(payload): Json<CreateMaintenanceRequest>,
) -> AppResult<(StatusCode, Json<MaintenanceRequest>)> {
    if payload.description.trim().is_empty() {
        return Err(AppError::Validation("description is required".to_string()));
    }

    let room: Option<(String,)> = sqlx::query_as("SELECT room_number FROM rooms WHERE id = ?")
        .bind(payload.room_id)
        .fetch_optional(&state.pool)
        .await?;

    let room_number = room
        .map(|(n,)| n)
        .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

    let mut tx = state.pool.begin().await?;

    let request = sqlx::query_as::<_, MaintenanceRequest>(
        r#"
        INSERT INTO maintenance_requests (
            room_id, description, status, technician, reported_at
        )
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(payload.room_id)
    .bind(payload.description.trim())
    .bind(MaintenanceStatus::Pending)
    .bind(&payload.technician)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    notification_service::notify_admins(
        &mut *tx,
        "maintenance",
        &format!("New maintenance request for room {}", room_number),
    )
    .await?;

    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn update_status(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateMaintenanceStatusRequest>,
) -> AppResult<Json<MaintenanceRequest>> {
    // Completion stamps resolved_at once; other transitions leave it unset.
    let resolved_at = if payload.status == MaintenanceStatus::Completed {
        Some(Utc::now())
    } else {
        None
    };

    let updated = sqlx::query_as::<_, MaintenanceRequest>(
        r#"
        UPDATE maintenance_requests SET
            status = ?,
            technician = COALESCE(?, technician),
            resolved_at = COALESCE(?, resolved_at)
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(payload.status)
    .bind(&payload.technician)
    .bind(resolved_at)
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Maintenance request not found".to_string()))?;

    Ok(Json(updated))
}
