use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::{
    BillStatus, Contract, CreateUtilityBillRequest, Room, UpdateBillStatusRequest, UtilityBill,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bills))
        .route("/", post(create_bill))
        .route("/contract/:id", get(bills_for_contract))
        .route("/:id/status", put(update_bill_status))
}

pub async fn list_bills(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<Vec<UtilityBill>>> {
    let bills = sqlx::query_as::<_, UtilityBill>(
        "SELECT * FROM utility_bills ORDER BY billing_date DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(bills))
}

pub async fn bills_for_contract(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(contract_id): Path<i64>,
) -> AppResult<Json<Vec<UtilityBill>>> {
    let bills = sqlx::query_as::<_, UtilityBill>(
        "SELECT * FROM utility_bills WHERE contract_id = ? ORDER BY billing_date DESC",
    )
    .bind(contract_id)
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(bills))
}

/// Unit prices come from the contract's room; the total is computed here, not
/// taken from the client.
pub async fn create_bill(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Json(payload): Json<CreateUtilityBillRequest>,
) -> AppResult<(StatusCode, Json<UtilityBill>)> {
    if payload.water_usage < 0.0 || payload.electricity_usage < 0.0 {
        return Err(AppError::Validation(
            "Usage figures cannot be negative".to_string(),
        ));
    }

    let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = ?")
        .bind(payload.contract_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract not found".to_string()))?;

    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(contract.room_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

    let total_amount =
        payload.water_usage * room.water_price + payload.electricity_usage * room.electricity_price;

    let bill = sqlx::query_as::<_, UtilityBill>(
        r#"
        INSERT INTO utility_bills (
            contract_id, water_usage, water_price, electricity_usage,
            electricity_price, total_amount, billing_date, status, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(payload.contract_id)
    .bind(payload.water_usage)
    .bind(room.water_price)
    .bind(payload.electricity_usage)
    .bind(room.electricity_price)
    .bind(total_amount)
    .bind(payload.billing_date)
    .bind(BillStatus::Pending)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await?;

    Ok((StatusCode::CREATED, Json(bill)))
}

pub async fn update_bill_status(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateBillStatusRequest>,
) -> AppResult<Json<Value>> {
    let result = sqlx::query("UPDATE utility_bills SET status = ? WHERE id = ?")
        .bind(payload.status)
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Utility bill not found".to_string()));
    }

    Ok(Json(json!({"message": "Utility bill updated"})))
}
