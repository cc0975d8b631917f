//! Sequence-number (`sarNo`) assignment rules.
//!
//! A ledger scope numbers its movements 1, 2, 3, ... with no gaps. A caller may
//! leave the number unset and let the store assign it, or pre-assign it, in
//! which case it must be exactly the next number.

use thiserror::Error;

/// How the caller wants the next `sarNo` chosen.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SequenceRequest {
    /// Let the store assign `last + 1`.
    Next,
    /// Require this exact number (must equal `last + 1`).
    Exact(u64),
}

/// The caller pre-assigned a `sarNo` that is not the next one in the ledger.
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
#[error("sequence conflict: expected sarNo {expected}, got {requested}")]
pub struct SequenceConflict {
    pub expected: u64,
    pub requested: u64,
}

impl SequenceRequest {
    /// Interpret the `sarNo` carried on a pending record (`0` means unset).
    pub fn from_requested(sar_no: u64) -> Self {
        if sar_no == 0 {
            SequenceRequest::Next
        } else {
            SequenceRequest::Exact(sar_no)
        }
    }

    /// Resolve the number to assign given the last stored `sarNo`.
    pub fn resolve(self, last: u64) -> Result<u64, SequenceConflict> {
        let expected = last + 1;
        match self {
            SequenceRequest::Next => Ok(expected),
            SequenceRequest::Exact(requested) if requested == expected => Ok(requested),
            SequenceRequest::Exact(requested) => Err(SequenceConflict { expected, requested }),
        }
    }
}
