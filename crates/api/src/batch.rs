//! Batch processing of transaction files.
//!
//! A directory holds `purchase.json` and `sales.json`; each file is either a
//! single transaction object or an array of them. Purchases run first so the
//! sales that follow can draw on the received stock.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use taxbridge_infra::RecordError;
use taxbridge_stock::{PurchaseTransaction, SaleTransaction};

use crate::app::services::Recorder;

pub const PURCHASE_FILE: &str = "purchase.json";
pub const SALES_FILE: &str = "sales.json";

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(Box<T>),
}

/// Outcome counts for one batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub recorded: usize,
    /// Committed locally but the stock master push failed.
    pub unsynced: usize,
    pub rejected: usize,
}

/// Read a transaction file; a missing file yields no transactions.
pub fn read_transactions<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Vec<T>> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "no transaction file; skipping");
        return Ok(Vec::new());
    }
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let parsed: OneOrMany<T> =
        serde_json::from_slice(&bytes).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(match parsed {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![*item],
    })
}

/// Record every purchase, then every sale, found in `dir`.
///
/// Business rejections (validation, insufficient stock) and sync failures are
/// logged and counted; storage failures abort the run.
pub fn process_dir(recorder: &Recorder, dir: &Path) -> anyhow::Result<BatchSummary> {
    let purchases: Vec<PurchaseTransaction> = read_transactions(&dir.join(PURCHASE_FILE))?;
    let sales: Vec<SaleTransaction> = read_transactions(&dir.join(SALES_FILE))?;

    let mut summary = BatchSummary::default();
    for purchase in &purchases {
        let outcome = recorder.record_purchase(purchase);
        tally(&mut summary, "purchase", &purchase.invoice_no, outcome)?;
    }
    for sale in &sales {
        let outcome = recorder.record_sale(sale);
        tally(&mut summary, "sale", &sale.invoice_no, outcome)?;
    }

    tracing::info!(
        recorded = summary.recorded,
        unsynced = summary.unsynced,
        rejected = summary.rejected,
        "batch complete"
    );
    Ok(summary)
}

fn tally(
    summary: &mut BatchSummary,
    kind: &str,
    invoice_no: &str,
    outcome: Result<taxbridge_stock::MovementRecord, RecordError>,
) -> anyhow::Result<()> {
    match outcome {
        Ok(record) => {
            tracing::info!(kind, invoice_no, sar_no = record.sar_no, "recorded");
            summary.recorded += 1;
        }
        Err(RecordError::Sync { record, failures }) => {
            tracing::warn!(kind, invoice_no, sar_no = record.sar_no, failed_items = failures.len(), "recorded but not synced");
            summary.unsynced += 1;
        }
        Err(e @ (RecordError::Validation(_) | RecordError::InsufficientStock(_))) => {
            tracing::warn!(kind, invoice_no, error = %e, "rejected");
            summary.rejected += 1;
        }
        Err(e) => return Err(e).with_context(|| format!("{kind} {invoice_no} failed")),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use taxbridge_core::LedgerScope;
    use taxbridge_infra::{InMemoryLedgerStore, LedgerStore, StockMovementRecorder};

    fn recorder() -> Recorder {
        let store: Arc<dyn LedgerStore> = Arc::new(InMemoryLedgerStore::new(LedgerScope::parse("P1", "00").unwrap()));
        StockMovementRecorder::new(store)
    }

    const PURCHASE: &str = r#"{
        "tin": "P1", "bhfId": "00", "invcNo": "1", "spplrTin": "S1", "spplrNm": "Supplier",
        "pchsDt": "20240101", "regrId": "Admin", "regrNm": "Admin", "modrId": "Admin", "modrNm": "Admin",
        "itemList": [{"itemSeq": 1, "itemCd": "X", "itemNm": "Widget", "qty": 10}]
    }"#;

    fn sale(invoice: &str, qty: u32) -> String {
        format!(
            r#"{{"tin": "P1", "bhfId": "00", "invcNo": "{invoice}", "salesDt": "20240102",
                "itemList": [{{"itemSeq": 1, "itemCd": "X", "itemNm": "Widget", "qty": {qty}}}]}}"#
        )
    }

    #[test]
    fn processes_object_purchase_then_array_of_sales() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(PURCHASE_FILE), PURCHASE).unwrap();
        std::fs::write(
            dir.path().join(SALES_FILE),
            format!("[{}, {}]", sale("2", 15), sale("3", 4)),
        )
        .unwrap();

        let recorder = recorder();
        let summary = process_dir(&recorder, dir.path()).unwrap();
        assert_eq!(
            summary,
            BatchSummary {
                recorded: 2,
                unsynced: 0,
                rejected: 1
            }
        );
        assert_eq!(recorder.balances().current_stock("X").unwrap(), rust_decimal_macros::dec!(6));
    }

    #[test]
    fn missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let summary = process_dir(&recorder(), dir.path()).unwrap();
        assert_eq!(summary, BatchSummary::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(SALES_FILE), "[{").unwrap();
        assert!(process_dir(&recorder(), dir.path()).is_err());
    }
}
