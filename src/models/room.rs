use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::services::FileService;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Occupied,
    Reserved,
    Maintenance,
}

impl std::fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RoomStatus::Available => "available",
            RoomStatus::Occupied => "occupied",
            RoomStatus::Reserved => "reserved",
            RoomStatus::Maintenance => "maintenance",
        };
        f.write_str(s)
    }
}

/// Database row. `facilities` and `images` hold JSON text; responses expose
/// them decoded, with stored file keys rewritten to absolute URLs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Room {
    pub id: i64,
    pub room_number: String,
    pub room_type: Option<String>,
    pub floor: Option<i64>,
    pub size: Option<f64>,
    pub rent_price: f64,
    pub deposit: f64,
    pub water_price: f64,
    pub electricity_price: f64,
    pub status: RoomStatus,
    pub facilities: Option<String>,
    pub cover_image: Option<String>,
    pub images: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomResponse {
    pub id: i64,
    pub room_number: String,
    pub room_type: Option<String>,
    pub floor: Option<i64>,
    pub size: Option<f64>,
    pub rent_price: f64,
    pub deposit: f64,
    pub water_price: f64,
    pub electricity_price: f64,
    pub status: RoomStatus,
    pub facilities: Vec<String>,
    pub cover_image_url: Option<String>,
    pub image_urls: Vec<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RoomResponse {
    pub fn from_room(room: Room, files: &FileService) -> Self {
        let facilities: Vec<String> = room
            .facilities
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();

        let image_keys: Vec<String> = room
            .images
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default();

        Self {
            id: room.id,
            room_number: room.room_number,
            room_type: room.room_type,
            floor: room.floor,
            size: room.size,
            rent_price: room.rent_price,
            deposit: room.deposit,
            water_price: room.water_price,
            electricity_price: room.electricity_price,
            status: room.status,
            facilities,
            cover_image_url: room.cover_image.as_deref().map(|key| files.public_url(key)),
            image_urls: image_keys.iter().map(|key| files.public_url(key)).collect(),
            description: room.description,
            created_at: room.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoomRequest {
    pub room_type: Option<String>,
    pub floor: Option<i64>,
    pub size: Option<f64>,
    pub rent_price: Option<f64>,
    pub deposit: Option<f64>,
    pub water_price: Option<f64>,
    pub electricity_price: Option<f64>,
    pub facilities: Option<Vec<String>>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoomStatusRequest {
    pub transition: crate::services::RoomTransition,
}
