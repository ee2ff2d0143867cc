use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Report {
    pub id: i64,
    pub title: String,
    pub content: Option<String>,
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReportRequest {
    pub title: String,
    pub content: Option<String>,
}

/// JSON snapshot of a deleted row, written by DELETE handlers. There is no
/// restore path; this is an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Backup {
    pub id: i64,
    pub table_name: String,
    pub row_id: i64,
    pub data: String,
    pub deleted_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}
