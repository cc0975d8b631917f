use std::sync::RwLock;

use taxbridge_core::LedgerScope;
use taxbridge_stock::MovementRecord;

use super::r#trait::{LedgerStore, LedgerStoreError, prepare_append};

/// In-memory append-only ledger.
///
/// Intended for tests/dev. Nothing survives the process.
#[derive(Debug)]
pub struct InMemoryLedgerStore {
    scope: LedgerScope,
    records: RwLock<Vec<MovementRecord>>,
}

impl InMemoryLedgerStore {
    pub fn new(scope: LedgerScope) -> Self {
        Self {
            scope,
            records: RwLock::new(Vec::new()),
        }
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn scope(&self) -> &LedgerScope {
        &self.scope
    }

    fn append(&self, record: MovementRecord) -> Result<MovementRecord, LedgerStoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|_| LedgerStoreError::Storage("lock poisoned".to_string()))?;

        let last = records.last().map(|r| r.sar_no).unwrap_or(0);
        let stored = prepare_append(&self.scope, record, last)?;
        records.push(stored.clone());

        tracing::debug!(scope = %self.scope, sar_no = stored.sar_no, "movement appended");
        Ok(stored)
    }

    fn load_all(&self) -> Result<Vec<MovementRecord>, LedgerStoreError> {
        let records = self
            .records
            .read()
            .map_err(|_| LedgerStoreError::Storage("lock poisoned".to_string()))?;
        Ok(records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{receipt_record as record, scope};

    #[test]
    fn numbers_unset_records_and_accepts_exact_successor() {
        let store = InMemoryLedgerStore::new(scope());
        assert_eq!(store.last_sar_no().unwrap(), 0);

        assert_eq!(store.append(record("P1", 0)).unwrap().sar_no, 1);
        assert_eq!(store.append(record("P1", 2)).unwrap().sar_no, 2);
        assert_eq!(store.last_sar_no().unwrap(), 2);
        assert!(store.exists(2).unwrap());
        assert!(!store.exists(3).unwrap());
    }

    #[test]
    fn stale_number_is_a_sequence_conflict() {
        let store = InMemoryLedgerStore::new(scope());
        store.append(record("P1", 0)).unwrap();

        let err = store.append(record("P1", 1)).unwrap_err();
        assert!(matches!(err, LedgerStoreError::SequenceConflict(c) if c.expected == 2 && c.requested == 1));
        assert_eq!(store.load_all().unwrap().len(), 1);
    }

    #[test]
    fn foreign_scope_and_invalid_records_are_rejected() {
        let store = InMemoryLedgerStore::new(scope());
        assert!(matches!(
            store.append(record("P2", 0)),
            Err(LedgerStoreError::ScopeMismatch { .. })
        ));

        let mut bad = record("P1", 0);
        bad.item_count = 5;
        assert!(matches!(store.append(bad), Err(LedgerStoreError::InvalidRecord(_))));
        assert!(store.load_all().unwrap().is_empty());
    }
}
