use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::{CreateTenantRequest, Tenant, UpdateTenantRequest};
use crate::services::backup_service;
use crate::utils::validators::validate_email;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tenants))
        .route("/", post(create_tenant))
        .route("/:id", get(get_tenant))
        .route("/:id", put(update_tenant))
        .route("/:id", delete(delete_tenant))
}

pub async fn list_tenants(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<Vec<Tenant>>> {
    let tenants = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants ORDER BY fullname")
        .fetch_all(&state.pool)
        .await?;

    Ok(Json(tenants))
}

pub async fn get_tenant(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Tenant>> {
    let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;

    Ok(Json(tenant))
}

pub async fn create_tenant(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(payload): Json<CreateTenantRequest>,
) -> AppResult<(StatusCode, Json<Tenant>)> {
    if payload.fullname.trim().is_empty() {
        return Err(AppError::Validation("fullname is required".to_string()));
    }

    if let Some(email) = payload.email.as_deref() {
        if !validate_email(email) {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM tenants WHERE email = ?")
            .bind(email)
            .fetch_optional(&state.pool)
            .await?;

        if existing.is_some() {
            return Err(AppError::BadRequest(
                "A tenant with this email already exists".to_string(),
            ));
        }
    }

    let tenant = sqlx::query_as::<_, Tenant>(
        r#"
        INSERT INTO tenants (
            user_id, fullname, email, phone, emergency_contact,
            id_card, vehicle_info, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(payload.user_id)
    .bind(payload.fullname.trim())
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.emergency_contact)
    .bind(&payload.id_card)
    .bind(&payload.vehicle_info)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(tenant)))
}

pub async fn update_tenant(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTenantRequest>,
) -> AppResult<Json<Tenant>> {
    if let Some(email) = payload.email.as_deref() {
        if !validate_email(email) {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }

        let taken: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM tenants WHERE email = ? AND id != ?")
                .bind(email)
                .bind(id)
                .fetch_optional(&state.pool)
                .await?;

        if taken.is_some() {
            return Err(AppError::BadRequest(
                "A tenant with this email already exists".to_string(),
            ));
        }
    }

    let updated = sqlx::query_as::<_, Tenant>(
        r#"
        UPDATE tenants SET
            fullname = COALESCE(?, fullname),
            email = COALESCE(?, email),
            phone = COALESCE(?, phone),
            emergency_contact = COALESCE(?, emergency_contact),
            id_card = COALESCE(?, id_card),
            vehicle_info = COALESCE(?, vehicle_info)
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&payload.fullname)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.emergency_contact)
    .bind(&payload.id_card)
    .bind(&payload.vehicle_info)
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;

    Ok(Json(updated))
}

pub async fn delete_tenant(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))?;

    let active: (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM contracts WHERE tenant_id = ? AND status = 'active'",
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await?;

    if active.0 > 0 {
        return Err(AppError::BadRequest(
            "Tenant has an active contract".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    backup_service::snapshot_row(&mut *tx, "tenants", tenant.id, &tenant, Some(auth_user.user_id))
        .await?;

    sqlx::query("DELETE FROM tenants WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(json!({"message": "Tenant deleted"})))
}
