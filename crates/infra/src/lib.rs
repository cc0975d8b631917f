//! Infrastructure layer: ledger storage, recording pipeline, remote sync, config.

pub mod balance;
pub mod config;
pub mod ledger_store;
pub mod recorder;
pub mod sync;

pub use balance::BalanceCalculator;
pub use config::{AppConfig, ConfigError};
pub use ledger_store::{InMemoryLedgerStore, JsonFileLedgerStore, LedgerStore, LedgerStoreError};
pub use recorder::{ItemSyncFailure, RecordError, StockMovementRecorder};
pub use sync::{ApiResponse, HttpStockMasterClient, StockMasterSync, StockMasterUpdate, SyncError};

#[cfg(test)]
mod test_support;
