use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::{
    Contract, ContractResponse, ContractStatus, ContractWithDetails, Room,
    UpdateContractStatusRequest,
};
use crate::services::{
    backup_service,
    file_service::{validate_document_content_type, MAX_DOCUMENT_SIZE},
    room_state, FileService, RoomTransition,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_contracts))
        .route("/", post(create_contract))
        .route("/:id", get(get_contract))
        .route("/:id/status", put(update_contract_status))
        .route("/:id", delete(delete_contract))
}

pub async fn list_contracts(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<Vec<ContractWithDetails>>> {
    let contracts = sqlx::query_as::<_, ContractWithDetails>(
        r#"
        SELECT c.id, c.tenant_id, t.fullname AS tenant_name, c.room_id,
               r.room_number, c.start_date, c.end_date, c.rent_amount,
               c.deposit_amount, c.status, c.guarantor, c.note, c.document,
               c.created_at
        FROM contracts c
        JOIN tenants t ON t.id = c.tenant_id
        JOIN rooms r ON r.id = c.room_id
        ORDER BY c.created_at DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(contracts))
}

pub async fn get_contract(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ContractResponse>> {
    let files = FileService::new(&state.config);

    let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract not found".to_string()))?;

    Ok(Json(ContractResponse::from_contract(contract, &files)))
}

/// Creating a contract occupies the room (from available or reserved) in the
/// same transaction as the insert.
pub async fn create_contract(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Value>)> {
    let files = FileService::new(&state.config);

    let mut tenant_id: Option<i64> = None;
    let mut room_id: Option<i64> = None;
    let mut start_date: Option<NaiveDate> = None;
    let mut end_date: Option<NaiveDate> = None;
    let mut rent_amount: Option<f64> = None;
    let mut deposit_amount: f64 = 0.0;
    let mut guarantor: Option<String> = None;
    let mut note: Option<String> = None;
    let mut document: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "document" {
            let content_type = field
                .content_type()
                .ok_or_else(|| AppError::BadRequest("Missing content type".to_string()))?
                .to_string();

            if !validate_document_content_type(&content_type) {
                return Err(AppError::BadRequest(
                    "Unsupported document format".to_string(),
                ));
            }

            let file_name = field.file_name().unwrap_or("contract.pdf").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?
                .to_vec();

            if data.len() > MAX_DOCUMENT_SIZE {
                return Err(AppError::BadRequest("Document too large".to_string()));
            }

            document = Some((file_name, data));
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;

            match name.as_str() {
                "tenant_id" => tenant_id = text.parse().ok(),
                "room_id" => room_id = text.parse().ok(),
                "start_date" => start_date = text.parse().ok(),
                "end_date" => end_date = text.parse().ok(),
                "rent_amount" => rent_amount = text.parse().ok(),
                "deposit_amount" => deposit_amount = text.parse().unwrap_or(0.0),
                "guarantor" => guarantor = Some(text),
                "note" => note = Some(text),
                _ => {}
            }
        }
    }

    let tenant_id =
        tenant_id.ok_or_else(|| AppError::Validation("tenant_id is required".to_string()))?;
    let room_id = room_id.ok_or_else(|| AppError::Validation("room_id is required".to_string()))?;
    let start_date =
        start_date.ok_or_else(|| AppError::Validation("start_date is required".to_string()))?;
    let end_date =
        end_date.ok_or_else(|| AppError::Validation("end_date is required".to_string()))?;

    if end_date <= start_date {
        return Err(AppError::Validation(
            "end_date must be after start_date".to_string(),
        ));
    }

    let tenant_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM tenants WHERE id = ?")
        .bind(tenant_id)
        .fetch_optional(&state.pool)
        .await?;

    if tenant_exists.is_none() {
        return Err(AppError::NotFound("Tenant not found".to_string()));
    }

    let mut tx = state.pool.begin().await?;

    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(room_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

    let next = room_state::apply(room.status, RoomTransition::Occupy)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let occupied = sqlx::query("UPDATE rooms SET status = ? WHERE id = ? AND status = ?")
        .bind(next)
        .bind(room.id)
        .bind(room.status)
        .execute(&mut *tx)
        .await?;

    if occupied.rows_affected() == 0 {
        return Err(AppError::BadRequest(
            "Room is no longer available".to_string(),
        ));
    }

    let document_key = match document {
        Some((file_name, data)) => Some(files.save_file("contracts", &file_name, data).await?),
        None => None,
    };

    let rent_amount = rent_amount.unwrap_or(room.rent_price);

    let result = sqlx::query(
        r#"
        INSERT INTO contracts (
            tenant_id, room_id, start_date, end_date, rent_amount,
            deposit_amount, status, guarantor, note, document, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(tenant_id)
    .bind(room_id)
    .bind(start_date)
    .bind(end_date)
    .bind(rent_amount)
    .bind(deposit_amount)
    .bind(ContractStatus::Active)
    .bind(&guarantor)
    .bind(&note)
    .bind(&document_key)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Contract created",
            "contract_id": result.last_insert_rowid()
        })),
    ))
}

/// Terminating or completing a contract releases the room.
pub async fn update_contract_status(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateContractStatusRequest>,
) -> AppResult<Json<Value>> {
    let mut tx = state.pool.begin().await?;

    let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract not found".to_string()))?;

    if contract.status != ContractStatus::Active {
        return Err(AppError::BadRequest(
            "Only an active contract can change status".to_string(),
        ));
    }

    if payload.status != ContractStatus::Active {
        let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
            .bind(contract.room_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        if let Ok(next) = room_state::apply(room.status, RoomTransition::Vacate) {
            sqlx::query("UPDATE rooms SET status = ? WHERE id = ? AND status = ?")
                .bind(next)
                .bind(room.id)
                .bind(room.status)
                .execute(&mut *tx)
                .await?;
        }
    }

    sqlx::query("UPDATE contracts SET status = ? WHERE id = ?")
        .bind(payload.status)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(json!({"message": "Contract updated"})))
}

pub async fn delete_contract(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract not found".to_string()))?;

    if contract.status == ContractStatus::Active {
        return Err(AppError::BadRequest(
            "Cannot delete an active contract".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    backup_service::snapshot_row(
        &mut *tx,
        "contracts",
        contract.id,
        &contract,
        Some(auth_user.user_id),
    )
    .await?;

    sqlx::query("DELETE FROM contracts WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(json!({"message": "Contract deleted"})))
}
