use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::{is_admin, AppState, AuthUser};
use crate::models::{
    Booking, BookingStatus, BookingWithRoom, CreateBookingRequest, Room,
    UpdateBookingStatusRequest,
};
use crate::services::{backup_service, notification_service, room_state, RoomTransition};
use crate::utils::validators::validate_email;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/", get(list_bookings))
        .route("/:id/status", put(update_booking_status))
        .route("/:id", delete(delete_booking))
}

/// Public booking intake. Reserving the room and inserting the booking happen
/// in one transaction with a compare-and-set on the room status, so two
/// concurrent requests for the same available room cannot both succeed.
#[utoipa::path(
    post,
    path = "/api/bookings",
    tag = "bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 200, description = "Booking created, room reserved"),
        (status = 400, description = "Room is not available"),
        (status = 404, description = "Room not found")
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<Value>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::Validation("name is required".to_string()));
    }

    if let Some(email) = payload.email.as_deref() {
        if !validate_email(email) {
            return Err(AppError::Validation("Invalid email address".to_string()));
        }
    }

    let duration = payload.duration.unwrap_or(1);
    if duration < 1 {
        return Err(AppError::Validation(
            "duration must be at least 1".to_string(),
        ));
    }

    let mut tx = state.pool.begin().await?;

    let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(payload.room_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

    let next = room_state::apply(room.status, RoomTransition::Reserve)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let reserved = sqlx::query("UPDATE rooms SET status = ? WHERE id = ? AND status = ?")
        .bind(next)
        .bind(room.id)
        .bind(room.status)
        .execute(&mut *tx)
        .await?;

    if reserved.rows_affected() == 0 {
        return Err(AppError::BadRequest(
            "Room is no longer available".to_string(),
        ));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO bookings (
            room_id, name, phone, email, check_in_date, duration,
            special_requests, status, created_at
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.room_id)
    .bind(payload.name.trim())
    .bind(&payload.phone)
    .bind(&payload.email)
    .bind(payload.check_in_date)
    .bind(duration)
    .bind(&payload.special_requests)
    .bind(BookingStatus::Pending)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    let booking_id = result.last_insert_rowid();

    notification_service::notify_admins(
        &mut *tx,
        "booking",
        &format!(
            "New booking request for room {} from {}",
            room.room_number,
            payload.name.trim()
        ),
    )
    .await?;

    tx.commit().await?;

    Ok(Json(json!({
        "message": "Booking created",
        "booking_id": booking_id
    })))
}

/// Admin listing, joined with room display fields, newest first
#[utoipa::path(
    get,
    path = "/api/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All bookings", body = [BookingWithRoom]),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<Vec<BookingWithRoom>>> {
    if !is_admin(&auth_user.role) {
        return Err(AppError::Forbidden);
    }

    let bookings = sqlx::query_as::<_, BookingWithRoom>(
        r#"
        SELECT b.id, b.room_id, r.room_number, r.room_type, b.name, b.phone,
               b.email, b.check_in_date, b.duration, b.special_requests,
               b.status, b.created_at
        FROM bookings b
        JOIN rooms r ON r.id = b.room_id
        ORDER BY b.created_at DESC
        "#,
    )
    .fetch_all(&state.pool)
    .await?;

    Ok(Json(bookings))
}

pub async fn update_booking_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> AppResult<Json<Value>> {
    if !is_admin(&auth_user.role) {
        return Err(AppError::Forbidden);
    }

    let mut tx = state.pool.begin().await?;

    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    if booking.status == BookingStatus::Cancelled || booking.status == BookingStatus::Completed {
        return Err(AppError::BadRequest(format!(
            "Booking is already {:?}",
            booking.status
        )));
    }

    // Cancelling releases the reservation in the same transaction.
    if payload.status == BookingStatus::Cancelled {
        let room = sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
            .bind(booking.room_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound("Room not found".to_string()))?;

        if let Ok(next) = room_state::apply(room.status, RoomTransition::CancelReservation) {
            sqlx::query("UPDATE rooms SET status = ? WHERE id = ? AND status = ?")
                .bind(next)
                .bind(room.id)
                .bind(room.status)
                .execute(&mut *tx)
                .await?;
        }
    }

    sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
        .bind(payload.status)
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(json!({"message": "Booking updated"})))
}

pub async fn delete_booking(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Value>> {
    if !is_admin(&auth_user.role) {
        return Err(AppError::Forbidden);
    }

    let booking = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let mut tx = state.pool.begin().await?;

    backup_service::snapshot_row(&mut *tx, "bookings", booking.id, &booking, Some(auth_user.user_id))
        .await?;

    sqlx::query("DELETE FROM bookings WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Json(json!({"message": "Booking deleted"})))
}
