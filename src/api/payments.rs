use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::{is_admin, AppState, AuthUser};
use crate::models::{
    Payment, PaymentMethod, PaymentResponse, PaymentStatus, UpdatePaymentStatusRequest,
};
use crate::services::{
    file_service::{validate_image_content_type, MAX_IMAGE_SIZE},
    FileService,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments))
        .route("/", post(create_payment))
        .route("/contract/:id", get(payments_for_contract))
        .route("/:id/status", put(update_payment_status))
}

pub async fn list_payments(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<PaymentResponse>>> {
    if !is_admin(&auth_user.role) {
        return Err(AppError::Forbidden);
    }

    let files = FileService::new(&state.config);

    let payments =
        sqlx::query_as::<_, Payment>("SELECT * FROM payments ORDER BY payment_date DESC")
            .fetch_all(&state.pool)
            .await?;

    let response = payments
        .into_iter()
        .map(|p| PaymentResponse::from_payment(p, &files))
        .collect();

    Ok(Json(response))
}

pub async fn payments_for_contract(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(contract_id): Path<i64>,
) -> AppResult<Json<Vec<PaymentResponse>>> {
    let files = FileService::new(&state.config);

    let payments = sqlx::query_as::<_, Payment>(
        "SELECT * FROM payments WHERE contract_id = ? ORDER BY payment_date DESC",
    )
    .bind(contract_id)
    .fetch_all(&state.pool)
    .await?;

    let response = payments
        .into_iter()
        .map(|p| PaymentResponse::from_payment(p, &files))
        .collect();

    Ok(Json(response))
}

/// Multipart: contract_id, amount, method, payment_date and an optional
/// `slip` image (bank transfer slip).
pub async fn create_payment(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Value>)> {
    let files = FileService::new(&state.config);

    let mut contract_id: Option<i64> = None;
    let mut amount: Option<f64> = None;
    let mut method = PaymentMethod::Cash;
    let mut payment_date: Option<NaiveDate> = None;
    let mut slip: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "slip" {
            let content_type = field
                .content_type()
                .ok_or_else(|| AppError::BadRequest("Missing content type".to_string()))?
                .to_string();

            if !validate_image_content_type(&content_type) {
                return Err(AppError::BadRequest(
                    "Unsupported image format".to_string(),
                ));
            }

            let file_name = field.file_name().unwrap_or("slip.jpg").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?
                .to_vec();

            if data.len() > MAX_IMAGE_SIZE {
                return Err(AppError::BadRequest("Image too large".to_string()));
            }

            slip = Some((file_name, data));
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;

            match name.as_str() {
                "contract_id" => contract_id = text.parse().ok(),
                "amount" => amount = text.parse().ok(),
                "method" => {
                    method = match text.as_str() {
                        "cash" => PaymentMethod::Cash,
                        "bank_transfer" => PaymentMethod::BankTransfer,
                        "credit_card" => PaymentMethod::CreditCard,
                        other => {
                            return Err(AppError::Validation(format!(
                                "Unknown payment method: {}",
                                other
                            )))
                        }
                    }
                }
                "payment_date" => payment_date = text.parse().ok(),
                _ => {}
            }
        }
    }

    let contract_id =
        contract_id.ok_or_else(|| AppError::Validation("contract_id is required".to_string()))?;
    let amount = amount.ok_or_else(|| AppError::Validation("amount is required".to_string()))?;

    if amount <= 0.0 {
        return Err(AppError::Validation("amount must be positive".to_string()));
    }

    let contract_exists: Option<(i64,)> = sqlx::query_as("SELECT id FROM contracts WHERE id = ?")
        .bind(contract_id)
        .fetch_optional(&state.pool)
        .await?;

    if contract_exists.is_none() {
        return Err(AppError::NotFound("Contract not found".to_string()));
    }

    let slip_key = match slip {
        Some((file_name, data)) => Some(files.save_file("payments", &file_name, data).await?),
        None => None,
    };

    let result = sqlx::query(
        r#"
        INSERT INTO payments (
            contract_id, amount, slip_image, payment_date, method, status, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(contract_id)
    .bind(amount)
    .bind(&slip_key)
    .bind(payment_date.unwrap_or_else(|| Utc::now().date_naive()))
    .bind(method)
    .bind(PaymentStatus::Pending)
    .bind(Utc::now())
    .execute(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Payment recorded",
            "payment_id": result.last_insert_rowid()
        })),
    ))
}

pub async fn update_payment_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePaymentStatusRequest>,
) -> AppResult<Json<Value>> {
    if !is_admin(&auth_user.role) {
        return Err(AppError::Forbidden);
    }

    let result = sqlx::query("UPDATE payments SET status = ? WHERE id = ?")
        .bind(payload.status)
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Payment not found".to_string()));
    }

    Ok(Json(json!({"message": "Payment updated"})))
}
