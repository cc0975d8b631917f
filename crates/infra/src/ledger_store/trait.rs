use std::sync::Arc;

use thiserror::Error;

use taxbridge_core::{DomainError, LedgerScope, SequenceConflict, SequenceRequest};
use taxbridge_stock::MovementRecord;

/// Ledger store operation error.
///
/// These are infrastructure errors (numbering races, storage, corruption) as
/// opposed to domain errors raised before a record reaches the store.
#[derive(Debug, Error)]
pub enum LedgerStoreError {
    #[error(transparent)]
    SequenceConflict(#[from] SequenceConflict),

    #[error("record for {found} appended to ledger {expected}")]
    ScopeMismatch { expected: String, found: String },

    #[error("invalid record: {0}")]
    InvalidRecord(#[from] DomainError),

    #[error("ledger storage failed: {0}")]
    Storage(String),

    #[error("ledger is corrupt: {0}")]
    Corrupt(String),
}

/// Append-only, scope-bound movement journal.
///
/// ## Append semantics
///
/// `append()`:
/// - rejects records whose `tin`/`bhfId` differ from the store's scope
/// - runs `MovementRecord::validate()`
/// - assigns `sarNo = last_sar_no() + 1` when the record carries `0`, and
///   fails with `SequenceConflict` when it carries anything but that number
/// - persists the whole journal atomically (all or nothing)
///
/// Implementations serialize their own read-modify-write; callers that need
/// a check-then-append critical section must hold their own gate.
pub trait LedgerStore: Send + Sync {
    fn scope(&self) -> &LedgerScope;

    /// Append one record and return it as stored (numbered).
    fn append(&self, record: MovementRecord) -> Result<MovementRecord, LedgerStoreError>;

    /// All records in ascending `sarNo`. An empty or missing journal yields no records.
    fn load_all(&self) -> Result<Vec<MovementRecord>, LedgerStoreError>;

    /// Highest stored `sarNo`, or 0 when empty.
    fn last_sar_no(&self) -> Result<u64, LedgerStoreError> {
        Ok(self.load_all()?.last().map(|r| r.sar_no).unwrap_or(0))
    }

    fn exists(&self, sar_no: u64) -> Result<bool, LedgerStoreError> {
        Ok(self.load_all()?.iter().any(|r| r.sar_no == sar_no))
    }
}

impl<S> LedgerStore for Arc<S>
where
    S: LedgerStore + ?Sized,
{
    fn scope(&self) -> &LedgerScope {
        (**self).scope()
    }

    fn append(&self, record: MovementRecord) -> Result<MovementRecord, LedgerStoreError> {
        (**self).append(record)
    }

    fn load_all(&self) -> Result<Vec<MovementRecord>, LedgerStoreError> {
        (**self).load_all()
    }

    fn last_sar_no(&self) -> Result<u64, LedgerStoreError> {
        (**self).last_sar_no()
    }

    fn exists(&self, sar_no: u64) -> Result<bool, LedgerStoreError> {
        (**self).exists(sar_no)
    }
}

impl<S> LedgerStore for &S
where
    S: LedgerStore + ?Sized,
{
    fn scope(&self) -> &LedgerScope {
        (**self).scope()
    }

    fn append(&self, record: MovementRecord) -> Result<MovementRecord, LedgerStoreError> {
        (**self).append(record)
    }

    fn load_all(&self) -> Result<Vec<MovementRecord>, LedgerStoreError> {
        (**self).load_all()
    }
}

/// Shared append preparation: scope check, structural validation, numbering.
pub(crate) fn prepare_append(
    scope: &LedgerScope,
    mut record: MovementRecord,
    last_sar_no: u64,
) -> Result<MovementRecord, LedgerStoreError> {
    if !scope.matches(&record.tin, &record.bhf_id) {
        return Err(LedgerStoreError::ScopeMismatch {
            expected: scope.to_string(),
            found: format!("{}/{}", record.tin, record.bhf_id),
        });
    }

    record.sar_no = SequenceRequest::from_requested(record.sar_no).resolve(last_sar_no)?;
    record.validate()?;
    Ok(record)
}

/// Check a loaded journal: one scope, strictly increasing positive `sarNo`.
pub(crate) fn check_journal(scope: &LedgerScope, records: &[MovementRecord]) -> Result<(), LedgerStoreError> {
    let mut last = 0u64;
    for (idx, r) in records.iter().enumerate() {
        if !scope.matches(&r.tin, &r.bhf_id) {
            return Err(LedgerStoreError::Corrupt(format!(
                "record at index {idx} belongs to {}/{}, not {scope}",
                r.tin, r.bhf_id
            )));
        }
        if r.sar_no <= last {
            return Err(LedgerStoreError::Corrupt(format!(
                "non-monotonic sarNo in journal (last={last}, found={})",
                r.sar_no
            )));
        }
        last = r.sar_no;
    }
    Ok(())
}
