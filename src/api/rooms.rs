use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::{Room, RoomResponse, RoomStatus, UpdateRoomRequest, UpdateRoomStatusRequest};
use crate::services::{
    file_service::{validate_image_content_type, MAX_IMAGE_SIZE},
    room_state, FileService,
};
use crate::utils::validators::validate_room_number;

const MAX_GALLERY_IMAGES: usize = 5;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rooms))
        .route("/", post(create_room))
        .route("/:id", get(get_room))
        .route("/:id", put(update_room))
        .route("/:id/status", put(update_room_status))
        .route("/:id", delete(delete_room))
}

/// List all rooms (public booking site + admin overview)
#[utoipa::path(
    get,
    path = "/api/rooms",
    tag = "rooms",
    responses(
        (status = 200, description = "All rooms with absolute image URLs", body = [RoomResponse])
    )
)]
pub async fn list_rooms(State(state): State<AppState>) -> AppResult<Json<Vec<RoomResponse>>> {
    let files = FileService::new(&state.config);

    let rooms = sqlx::query_as::<_, Room>("SELECT * FROM rooms ORDER BY room_number")
        .fetch_all(&state.pool)
        .await?;

    let response = rooms
        .into_iter()
        .map(|room| RoomResponse::from_room(room, &files))
        .collect();

    Ok(Json(response))
}

/// Get one room by id
#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    tag = "rooms",
    params(("id" = i64, Path, description = "Room id")),
    responses(
        (status = 200, description = "Room", body = RoomResponse),
        (status = 404, description = "Room not found")
    )
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RoomResponse>> {
    let files = FileService::new(&state.config);

    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

    Ok(Json(RoomResponse::from_room(room, &files)))
}

struct BufferedUpload {
    file_name: String,
    data: Vec<u8>,
}

/// Create a room from a multipart form (scalar fields, a cover image and up
/// to five gallery images)
#[utoipa::path(
    post,
    path = "/api/rooms",
    tag = "rooms",
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Room created"),
        (status = 400, description = "Missing room number, duplicate number or invalid upload"),
        (status = 401, description = "Missing bearer token")
    )
)]
pub async fn create_room(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<Value>)> {
    let files = FileService::new(&state.config);

    let mut room_number: Option<String> = None;
    let mut room_type: Option<String> = None;
    let mut floor: Option<i64> = None;
    let mut size: Option<f64> = None;
    let mut rent_price: f64 = 0.0;
    let mut deposit: f64 = 0.0;
    let mut water_price: f64 = 0.0;
    let mut electricity_price: f64 = 0.0;
    let mut facilities: Vec<String> = Vec::new();
    let mut description: Option<String> = None;
    let mut cover: Option<BufferedUpload> = None;
    let mut gallery: Vec<BufferedUpload> = Vec::new();

    // Buffer everything first so nothing is persisted when validation fails.
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "cover_image" | "images" => {
                let content_type = field
                    .content_type()
                    .ok_or_else(|| AppError::BadRequest("Missing content type".to_string()))?
                    .to_string();

                if !validate_image_content_type(&content_type) {
                    return Err(AppError::BadRequest(
                        "Unsupported image format".to_string(),
                    ));
                }

                let file_name = field.file_name().unwrap_or("image.jpg").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?
                    .to_vec();

                if data.len() > MAX_IMAGE_SIZE {
                    return Err(AppError::BadRequest("Image too large".to_string()));
                }

                let upload = BufferedUpload { file_name, data };
                if name == "cover_image" {
                    cover = Some(upload);
                } else {
                    if gallery.len() >= MAX_GALLERY_IMAGES {
                        return Err(AppError::BadRequest(format!(
                            "At most {} gallery images allowed",
                            MAX_GALLERY_IMAGES
                        )));
                    }
                    gallery.push(upload);
                }
            }
            _ => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;

                match name.as_str() {
                    "room_number" => room_number = Some(text.trim().to_string()),
                    "room_type" => room_type = Some(text),
                    "floor" => floor = text.parse().ok(),
                    "size" => size = text.parse().ok(),
                    "rent_price" => rent_price = parse_amount(&name, &text)?,
                    "deposit" => deposit = parse_amount(&name, &text)?,
                    "water_price" => water_price = parse_amount(&name, &text)?,
                    "electricity_price" => electricity_price = parse_amount(&name, &text)?,
                    "facilities" => {
                        facilities = serde_json::from_str(&text)
                            .map_err(|_| {
                                AppError::Validation(
                                    "facilities must be a JSON array of strings".to_string(),
                                )
                            })?
                    }
                    "description" => description = Some(text),
                    _ => {}
                }
            }
        }
    }

    let room_number = room_number
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("room_number is required".to_string()))?;

    if !validate_room_number(&room_number) {
        return Err(AppError::Validation("Invalid room number".to_string()));
    }

    let cover_key = match cover {
        Some(upload) => Some(files.save_file("rooms", &upload.file_name, upload.data).await?),
        None => None,
    };

    let mut gallery_keys = Vec::with_capacity(gallery.len());
    for upload in gallery {
        gallery_keys.push(files.save_file("rooms", &upload.file_name, upload.data).await?);
    }

    let facilities_json = serde_json::to_string(&facilities).unwrap_or_else(|_| "[]".to_string());
    let images_json = serde_json::to_string(&gallery_keys).unwrap_or_else(|_| "[]".to_string());

    // Uniqueness of room_number is left to the UNIQUE constraint; a pre-check
    // would race against a concurrent create.
    let insert = sqlx::query(
        r#"
        INSERT INTO rooms (
            room_number, room_type, floor, size, rent_price, deposit,
            water_price, electricity_price, status, facilities,
            cover_image, images, description, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&room_number)
    .bind(&room_type)
    .bind(floor)
    .bind(size)
    .bind(rent_price)
    .bind(deposit)
    .bind(water_price)
    .bind(electricity_price)
    .bind(RoomStatus::Available)
    .bind(&facilities_json)
    .bind(&cover_key)
    .bind(&images_json)
    .bind(&description)
    .bind(Utc::now())
    .execute(&state.pool)
    .await;

    let result = match insert {
        Ok(result) => result,
        Err(e) => {
            // The row never landed, so the files written for it go too.
            for key in cover_key.iter().chain(gallery_keys.iter()) {
                if let Err(e) = files.delete_file(key).await {
                    tracing::warn!("Failed to remove file {}: {}", key, e);
                }
            }

            if e.as_database_error().map_or(false, |db| db.is_unique_violation()) {
                return Err(AppError::BadRequest(format!(
                    "Room {} already exists",
                    room_number
                )));
            }
            return Err(e.into());
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Room created",
            "room_id": result.last_insert_rowid()
        })),
    ))
}

fn parse_amount(field: &str, text: &str) -> AppResult<f64> {
    text.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("{} must be a number", field)))
}

pub async fn update_room(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRoomRequest>,
) -> AppResult<Json<RoomResponse>> {
    let files = FileService::new(&state.config);

    let facilities_json = payload
        .facilities
        .as_ref()
        .map(|f| serde_json::to_string(f).unwrap_or_else(|_| "[]".to_string()));

    let updated = sqlx::query_as::<_, Room>(
        r#"
        UPDATE rooms SET
            room_type = COALESCE(?, room_type),
            floor = COALESCE(?, floor),
            size = COALESCE(?, size),
            rent_price = COALESCE(?, rent_price),
            deposit = COALESCE(?, deposit),
            water_price = COALESCE(?, water_price),
            electricity_price = COALESCE(?, electricity_price),
            facilities = COALESCE(?, facilities),
            description = COALESCE(?, description)
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(&payload.room_type)
    .bind(payload.floor)
    .bind(payload.size)
    .bind(payload.rent_price)
    .bind(payload.deposit)
    .bind(payload.water_price)
    .bind(payload.electricity_price)
    .bind(&facilities_json)
    .bind(&payload.description)
    .bind(id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

    Ok(Json(RoomResponse::from_room(updated, &files)))
}

/// Maintenance toggling and other manual status changes go through the
/// central transition table; the compare-and-set keeps concurrent writers out.
pub async fn update_room_status(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateRoomStatusRequest>,
) -> AppResult<Json<RoomResponse>> {
    let files = FileService::new(&state.config);

    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

    let next = room_state::apply(room.status, payload.transition)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let result = sqlx::query("UPDATE rooms SET status = ? WHERE id = ? AND status = ?")
        .bind(next)
        .bind(id)
        .bind(room.status)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::BadRequest(
            "Room status changed concurrently, try again".to_string(),
        ));
    }

    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(id)
        .fetch_one(&state.pool)
        .await?;

    Ok(Json(RoomResponse::from_room(room, &files)))
}

/// Delete a room by id
#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    tag = "rooms",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Room id")),
    responses(
        (status = 200, description = "Room deleted"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn delete_room(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

    let mut tx = state.pool.begin().await?;

    crate::services::backup_service::snapshot_row(
        &mut *tx,
        "rooms",
        room.id,
        &room,
        Some(auth_user.user_id),
    )
    .await?;

    sqlx::query("DELETE FROM rooms WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    // Stored images are removed after the commit; a leftover file is harmless.
    let files = FileService::new(&state.config);
    let mut keys: Vec<String> = room
        .images
        .as_deref()
        .and_then(|raw| serde_json::from_str(raw).ok())
        .unwrap_or_default();
    if let Some(cover) = room.cover_image.clone() {
        keys.push(cover);
    }
    for key in &keys {
        if let Err(e) = files.delete_file(key).await {
            tracing::warn!("Failed to remove file {}: {}", key, e);
        }
    }

    Ok(Json(json!({"message": "Room deleted"})))
}
