//! `taxbridge-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! ledger scope identifiers, sequence-number rules and the domain error model.

pub mod error;
pub mod id;
pub mod sequence;

pub use error::{DomainError, DomainResult};
pub use id::{BranchId, LedgerScope, TenantId};
pub use sequence::{SequenceConflict, SequenceRequest};
