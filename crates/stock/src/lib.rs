//! Stock movement domain module.
//!
//! This crate contains the business rules of the stock ledger, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage):
//! movement records, the transactions they are derived from, stock-level
//! replay and the availability guard.

pub mod availability;
pub mod balance;
pub mod derive;
pub mod movement;
pub mod transaction;

pub use availability::{InsufficientStock, check_availability};
pub use balance::{StockLevels, current_stock};
pub use derive::{from_purchase, from_sale, reversal_of};
pub use movement::{MovementLine, MovementRecord, MovementType, RegistrationType};
pub use transaction::{PurchaseTransaction, Receipt, SaleTransaction, TransactionLine};
