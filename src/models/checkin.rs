use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::services::FileService;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Checkin {
    pub id: i64,
    pub contract_id: i64,
    pub checkin_date: NaiveDate,
    pub water_meter: f64,
    pub electricity_meter: f64,
    pub condition_notes: Option<String>,
    pub photos: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Checkout {
    pub id: i64,
    pub contract_id: i64,
    pub checkout_date: NaiveDate,
    pub water_meter: f64,
    pub electricity_meter: f64,
    pub condition_notes: Option<String>,
    pub photos: Option<String>,
    pub deposit_deduction: f64,
    pub deposit_refund: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckinResponse {
    pub id: i64,
    pub contract_id: i64,
    pub checkin_date: NaiveDate,
    pub water_meter: f64,
    pub electricity_meter: f64,
    pub condition_notes: Option<String>,
    pub photo_urls: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl CheckinResponse {
    pub fn from_checkin(checkin: Checkin, files: &FileService) -> Self {
        Self {
            id: checkin.id,
            contract_id: checkin.contract_id,
            checkin_date: checkin.checkin_date,
            water_meter: checkin.water_meter,
            electricity_meter: checkin.electricity_meter,
            condition_notes: checkin.condition_notes,
            photo_urls: decode_photo_urls(checkin.photos.as_deref(), files),
            created_at: checkin.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub id: i64,
    pub contract_id: i64,
    pub checkout_date: NaiveDate,
    pub water_meter: f64,
    pub electricity_meter: f64,
    pub condition_notes: Option<String>,
    pub photo_urls: Vec<String>,
    pub deposit_deduction: f64,
    pub deposit_refund: f64,
    pub created_at: DateTime<Utc>,
}

impl CheckoutResponse {
    pub fn from_checkout(checkout: Checkout, files: &FileService) -> Self {
        Self {
            id: checkout.id,
            contract_id: checkout.contract_id,
            checkout_date: checkout.checkout_date,
            water_meter: checkout.water_meter,
            electricity_meter: checkout.electricity_meter,
            condition_notes: checkout.condition_notes,
            photo_urls: decode_photo_urls(checkout.photos.as_deref(), files),
            deposit_deduction: checkout.deposit_deduction,
            deposit_refund: checkout.deposit_refund,
            created_at: checkout.created_at,
        }
    }
}

fn decode_photo_urls(raw: Option<&str>, files: &FileService) -> Vec<String> {
    let keys: Vec<String> = raw
        .and_then(|json| serde_json::from_str(json).ok())
        .unwrap_or_default();
    keys.iter().map(|key| files.public_url(key)).collect()
}
