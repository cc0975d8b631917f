//! Blocking HTTP client for the tax system's stock-master endpoint.

use std::time::Duration;

use reqwest::blocking::Client;

use super::{ApiResponse, StockMasterSync, StockMasterUpdate, SyncError};

const SAVE_STOCK_MASTER_PATH: &str = "/stockMaster/saveStockMaster";

#[derive(Debug, Clone)]
pub struct HttpStockMasterClient {
    client: Client,
    base_url: String,
    cmc_key: String,
}

impl HttpStockMasterClient {
    /// Build a client whose every request is bounded by `timeout`.
    pub fn new(base_url: impl Into<String>, cmc_key: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Transport(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cmc_key: cmc_key.into(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}{SAVE_STOCK_MASTER_PATH}", self.base_url)
    }
}

impl StockMasterSync for HttpStockMasterClient {
    fn update_stock_master(&self, update: &StockMasterUpdate) -> Result<ApiResponse, SyncError> {
        let url = self.endpoint();
        tracing::debug!(
            url = %url,
            item_cd = %update.item_cd,
            rsd_qty = %update.remaining_qty,
            "stock master request"
        );

        let response = self
            .client
            .post(&url)
            .header("CMC-KEY", &self.cmc_key)
            .header("tin", &update.tin)
            .header("bhfId", &update.bhf_id)
            .json(update)
            .send()
            .map_err(classify)?;

        let status = response.status();
        let body = response.text().map_err(classify)?;
        tracing::debug!(status = %status, body = %body, "stock master response");

        let parsed: ApiResponse = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                SyncError::Decode(e.to_string())
            } else {
                SyncError::Transport(format!("http status {status}"))
            }
        })?;

        if !parsed.is_success() {
            return Err(SyncError::Api {
                code: parsed.result_cd,
                msg: parsed.result_msg,
            });
        }

        Ok(parsed)
    }
}

fn classify(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::Timeout(err.to_string())
    } else {
        SyncError::Transport(err.to_string())
    }
}
