use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Pending,
    Paid,
    Failed,
    Unpaid,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UtilityBill {
    pub id: i64,
    pub contract_id: i64,
    pub water_usage: f64,
    pub water_price: f64,
    pub electricity_usage: f64,
    pub electricity_price: f64,
    pub total_amount: f64,
    pub billing_date: NaiveDate,
    pub status: BillStatus,
    pub created_at: DateTime<Utc>,
}

// Usage figures come from meter readings; unit prices and the total are
// resolved server-side from the contract's room.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUtilityBillRequest {
    pub contract_id: i64,
    pub water_usage: f64,
    pub electricity_usage: f64,
    pub billing_date: NaiveDate,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBillStatusRequest {
    pub status: BillStatus,
}
