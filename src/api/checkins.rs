use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};

use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::{Checkin, CheckinResponse, Contract};
use crate::services::{
    file_service::{validate_image_content_type, MAX_IMAGE_SIZE},
    FileService,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_checkin))
        .route("/contract/:id", get(checkins_for_contract))
}

pub async fn checkins_for_contract(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(contract_id): Path<i64>,
) -> AppResult<Json<Vec<CheckinResponse>>> {
    let files = FileService::new(&state.config);

    let checkins = sqlx::query_as::<_, Checkin>(
        "SELECT * FROM checkins WHERE contract_id = ? ORDER BY checkin_date DESC",
    )
    .bind(contract_id)
    .fetch_all(&state.pool)
    .await?;

    let response = checkins
        .into_iter()
        .map(|c| CheckinResponse::from_checkin(c, &files))
        .collect();

    Ok(Json(response))
}

/// Move-in record: meter readings, condition notes and condition photos.
pub async fn create_checkin(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<CheckinResponse>)> {
    let files = FileService::new(&state.config);

    let mut contract_id: Option<i64> = None;
    let mut checkin_date: Option<NaiveDate> = None;
    let mut water_meter: f64 = 0.0;
    let mut electricity_meter: f64 = 0.0;
    let mut condition_notes: Option<String> = None;
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
                "checkin_date" => checkin_date = text.parse().ok(),
                "water_meter" => water_meter = text.parse().unwrap_or(0.0),
                "electricity_meter" => electricity_meter = text.parse().unwrap_or(0.0),
                "condition_notes" => condition_notes = Some(text),
                _ => {}
            }
        }
    }

    let contract_id =
        contract_id.ok_or_else(|| AppError::Validation("contract_id is required".to_string()))?;

    let contract = sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = ?")
        .bind(contract_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Contract not found".to_string()))?;

    let mut photo_keys = Vec::with_capacity(photos.len());
    for (file_name, data) in photos {
        photo_keys.push(files.save_file("checkins", &file_name, data).await?);
    }
    let photos_json = serde_json::to_string(&photo_keys).unwrap_or_else(|_| "[]".to_string());

    let checkin = sqlx::query_as::<_, Checkin>(
        r#"
        INSERT INTO checkins (
            contract_id, checkin_date, water_meter, electricity_meter,
            condition_notes, photos, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(contract.id)
    .bind(checkin_date.unwrap_or_else(|| Utc::now().date_naive()))
    .bind(water_meter)
    .bind(electricity_meter)
    .bind(&condition_notes)
    .bind(&photos_json)
    .bind(Utc::now())
    .fetch_one(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckinResponse::from_checkin(checkin, &files)),
    ))
}
