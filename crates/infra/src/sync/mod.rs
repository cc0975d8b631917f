//! Remote stock-master synchronisation boundary.
//!
//! After a movement is durably appended, each touched item's resulting
//! balance is pushed to the tax system. A failed push never unwinds the
//! local append; it is reported and may be retried per `(sarNo, itemCd)`.

pub mod http;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

pub use http::HttpStockMasterClient;

/// Result codes that do not indicate a failure.
pub const RESULT_SUCCESS: &str = "000";
pub const RESULT_NO_SEARCH_RESULT: &str = "001";
pub const RESULT_NO_DATA: &str = "902";

/// Body of a stock-master update call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMasterUpdate {
    pub tin: String,
    #[serde(rename = "bhfId")]
    pub bhf_id: String,
    #[serde(rename = "itemCd")]
    pub item_cd: String,
    /// Remaining on-hand quantity after the movement.
    #[serde(rename = "rsdQty", with = "rust_decimal::serde::float")]
    pub remaining_qty: Decimal,
    #[serde(rename = "regrId")]
    pub registrar_id: String,
    #[serde(rename = "regrNm")]
    pub registrar_name: String,
    #[serde(rename = "modrId")]
    pub modifier_id: String,
    #[serde(rename = "modrNm")]
    pub modifier_name: String,

    /// Movement that triggered the update (not sent).
    #[serde(skip)]
    pub sar_no: u64,
    /// Signed quantity the movement contributed (not sent).
    #[serde(skip)]
    pub delta: Decimal,
}

/// Response envelope of the tax system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(rename = "resultCd")]
    pub result_cd: String,
    #[serde(rename = "resultMsg", default)]
    pub result_msg: String,
    #[serde(rename = "resultDt", default, skip_serializing_if = "Option::is_none")]
    pub result_dt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl ApiResponse {
    /// Success and the two "no data" sentinels are all non-failures.
    pub fn is_success(&self) -> bool {
        matches!(
            self.result_cd.as_str(),
            RESULT_SUCCESS | RESULT_NO_SEARCH_RESULT | RESULT_NO_DATA
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SyncError {
    #[error("stock master update timed out: {0}")]
    Timeout(String),

    #[error("stock master transport failure: {0}")]
    Transport(String),

    /// The call completed but the tax system rejected it.
    #[error("stock master update rejected ({code}): {msg}")]
    Api { code: String, msg: String },

    #[error("stock master response could not be decoded: {0}")]
    Decode(String),
}

/// Pushes per-item balances to the remote stock master.
pub trait StockMasterSync: Send + Sync {
    fn update_stock_master(&self, update: &StockMasterUpdate) -> Result<ApiResponse, SyncError>;
}

impl<T> StockMasterSync for std::sync::Arc<T>
where
    T: StockMasterSync + ?Sized,
{
    fn update_stock_master(&self, update: &StockMasterUpdate) -> Result<ApiResponse, SyncError> {
        (**self).update_stock_master(update)
    }
}
