use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};

use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::{Checkout, CheckoutResponse, Contract, ContractStatus, Room};
use crate::services::{
    file_service::{validate_image_content_type, MAX_IMAGE_SIZE},
    room_state, FileService, RoomTransition,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_checkout))
        .route("/contract/:id", get(checkouts_for_contract))
}

pub async fn checkouts_for_contract(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(contract_id): Path<i64>,
) -> AppResult<Json<Vec<CheckoutResponse>>> {
    let files = FileService::new(&state.config);

    let checkouts = sqlx::query_as::<_, Checkout>(
        "SELECT * FROM checkouts WHERE contract_id = ? ORDER BY checkout_date DESC",
    )
    .bind(contract_id)
    .fetch_all(&state.pool)
    .await?;

    let response = checkouts
        .into_iter()
        .map(|c| CheckoutResponse::from_checkout(c, &files))
        .collect();

    Ok(Json(response))
}

/// Move-out record. Computes the deposit refund from the recorded deduction,
/// completes the contract and vacates the room, all in one transaction.
pub async fn create_checkout(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<CheckoutResponse>)> {
    let files = FileService::new(&state.config);

    let mut contract_id: Option<i64> = None;
    let mut checkout_date: Option<NaiveDate> = None;
    let mut water_meter: f64 = 0.0;
    let mut electricity_meter: f64 = 0.0;
    let mut condition_notes: Option<String> = None;
    let mut deposit_deduction: f64 = 0.0;
    let mut photos: Vec<(String, Vec<u8>)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "photos" {
            let content_type = field
                .content_type()
                .ok_or_else(|| AppError::BadRequest("Missing content type".to_string()))?
                .to_string();

            if !validate_image_content_type(&content_type) {
                return Err(AppError::BadRequest(
                    "Unsupported image format".to_string(),
                ));
            }

            let file_name = field.file_name().unwrap_or("photo.jpg").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?
                .to_vec();

            if data.len() > MAX_IMAGE_SIZE {
                return Err(AppError::BadRequest("Image too large".to_string()));
            }

            photos.push((file_name, data));
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;

            match name.as_str() {
                "contract_id" => contract_id = text.parse().ok(),
                "checkout_date" => checkout_date = text.parse().ok(),
                "water_meter" => water_meter = text.parse().unwrap_or(0.0),
                "electricity_meter" => electricity_meter = text.parse().unwrap_or(0.0),
                "condition_notes" => condition_notes = Some(text),
                "deposit_deduction" => deposit_deduction = text.parse().unwrap_or(0.0),
                _ => {}
            }
        }
    }

    let contract_id =
        contract_id.ok_or_else(|| AppError::Validation("contract_id is required".to_string()))?;

    if deposit_deduction < 0.0 {
        return Err(AppError::Validation(
            "deposit_deduction cannot be negative".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = ?")
        .bind(contract_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract not found".to_string()))?;

    if contract.status != ContractStatus::Active {
        return Err(AppError::BadRequest(
            "Contract is not active".to_string(),
        ));
    }

    let deposit_refund = (contract.deposit_amount - deposit_deduction).max(0.0);

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

    sqlx::query("UPDATE contracts SET status = ? WHERE id = ?")
        .bind(ContractStatus::Completed)
        .bind(contract.id)
        .execute(&mut *tx)
        .await?;

    let mut photo_keys = Vec::with_capacity(photos.len());
    for (file_name, data) in photos {
        photo_keys.push(files.save_file("checkouts", &file_name, data).await?);
    }
    let photos_json = serde_json::to_string(&photo_keys).unwrap_or_else(|_| "[]".to_string());

    let checkout = sqlx::query_as::<_, Checkout>(
        r#"
        INSERT INTO checkouts (
            contract_id, checkout_date, water_meter, electricity_meter,
            condition_notes, photos, deposit_deduction, deposit_refund, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(contract.id)
    .bind(checkout_date.unwrap_or_else(|| Utc::now().date_naive()))
    .bind(water_meter)
    .bind(electricity_meter)
    .bind(&condition_notes)
    .bind(&photos_json)
    .bind(deposit_deduction)
    .bind(deposit_refund)
    .bind(Utc::now())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse::from_checkout(checkout, &files)),
    ))
}
