use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: i64,
    pub room_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub check_in_date: NaiveDate,
    pub duration: i64,
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

/// Booking joined with display fields of its room, for the admin listing.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct BookingWithRoom {
    pub id: i64,
    pub room_id: i64,
    pub room_number: String,
    pub room_type: Option<String>,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub check_in_date: NaiveDate,
    pub duration: i64,
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

// DTOs
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub room_id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub check_in_date: NaiveDate,
    pub duration: Option<i64>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}
