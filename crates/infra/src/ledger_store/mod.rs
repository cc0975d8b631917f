//! Append-only movement ledger boundary.
//!
//! One store holds the journal of exactly one tenant+branch scope. Stores
//! number records on append and return them in ascending `sarNo`.

pub mod in_memory;
pub mod json_file;
pub mod r#trait;

pub use in_memory::InMemoryLedgerStore;
pub use json_file::JsonFileLedgerStore;
pub use r#trait::{LedgerStore, LedgerStoreError};
