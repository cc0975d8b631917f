use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use taxbridge_infra::ItemSyncFailure;
use taxbridge_stock::{InsufficientStock, MovementRecord};

pub const RESULT_OK: &str = "000";

/// Response envelope shared by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(rename = "resultCd")]
    pub result_cd: String,
    #[serde(rename = "resultMsg")]
    pub result_msg: String,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            result_cd: RESULT_OK.to_string(),
            result_msg: "Successful".to_string(),
            data: Some(data),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceView {
    #[serde(rename = "itemCd")]
    pub item_cd: String,
    #[serde(rename = "qty", with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
}

/// Detail of a guard rejection.
#[derive(Debug, Serialize)]
pub struct ShortageView {
    #[serde(rename = "itemCd")]
    pub item_cd: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub have: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub need: Decimal,
}

impl From<InsufficientStock> for ShortageView {
    fn from(short: InsufficientStock) -> Self {
        Self {
            item_cd: short.item_cd,
            have: short.have,
            need: short.need,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SyncFailureView {
    #[serde(rename = "itemCd")]
    pub item_cd: String,
    pub error: String,
}

impl From<&ItemSyncFailure> for SyncFailureView {
    fn from(f: &ItemSyncFailure) -> Self {
        Self {
            item_cd: f.item_cd.clone(),
            error: f.error.to_string(),
        }
    }
}

/// Body of a partially successful call: committed locally, sync failed.
#[derive(Debug, Serialize)]
pub struct PartialSuccess<'a> {
    pub movement: &'a MovementRecord,
    #[serde(rename = "syncFailures")]
    pub sync_failures: Vec<SyncFailureView>,
}
