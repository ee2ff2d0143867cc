use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceRequest {
    pub id: i64,
    pub room_id: i64,
    pub description: String,
    pub status: MaintenanceStatus,
    pub technician: Option<String>,
    pub reported_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct MaintenanceWithRoom {
    pub id: i64,
    pub room_id: i64,
    pub room_number: String,
    pub description: String,
    pub status: MaintenanceStatus,
    pub technician: Option<String>,
    pub reported_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMaintenanceRequest {
    pub room_id: i64,
    pub description: String,
    pub technician: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMaintenanceStatusRequest {
    pub status: MaintenanceStatus,
    pub technician: Option<String>,
}
