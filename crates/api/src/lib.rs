//! HTTP API and batch entry points for the stock movement ledger.

pub mod app;
pub mod batch;
