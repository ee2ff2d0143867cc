use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::services::FileService;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    Active,
    Completed,
    Terminated,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Contract {
    pub id: i64,
    pub tenant_id: i64,
    pub room_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_amount: f64,
    pub deposit_amount: f64,
    pub status: ContractStatus,
    pub guarantor: Option<String>,
    pub note: Option<String>,
    pub document: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Contract joined with tenant and room display fields.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ContractWithDetails {
    pub id: i64,
    pub tenant_id: i64,
    pub tenant_name: String,
    pub room_id: i64,
    pub room_number: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_amount: f64,
    pub deposit_amount: f64,
    pub status: ContractStatus,
    pub guarantor: Option<String>,
    pub note: Option<String>,
    pub document: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ContractResponse {
    pub id: i64,
    pub tenant_id: i64,
    pub room_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub rent_amount: f64,
    pub deposit_amount: f64,
    pub status: ContractStatus,
    pub guarantor: Option<String>,
    pub note: Option<String>,
    pub document_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ContractResponse {
    pub fn from_contract(contract: Contract, files: &FileService) -> Self {
        Self {
            id: contract.id,
            tenant_id: contract.tenant_id,
            room_id: contract.room_id,
            start_date: contract.start_date,
            end_date: contract.end_date,
            rent_amount: contract.rent_amount,
            deposit_amount: contract.deposit_amount,
            status: contract.status,
            guarantor: contract.guarantor,
            note: contract.note,
            document_url: contract.document.as_deref().map(|key| files.public_url(key)),
            created_at: contract.created_at,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateContractStatusRequest {
    pub status: ContractStatus,
}
