//! Stock movement recording pipeline (application-level orchestration).
//!
//! ```text
//! Transaction (sale | purchase)
//!   ↓
//! 1. Validate against the ledger scope
//!   ↓
//! 2. Derive the pending movement (pure)
//!   ↓  ── gate held ──────────────────────────
//! 3. Replay the ledger into stock levels
//!   ↓
//! 4. Availability guard (stock-out only)
//!   ↓
//! 5. Append (numbering, durable write)
//!   ↓
//! 6. Push resulting balances to the stock master (optional)
//!   ↓  ── gate released ──────────────────────
//! ```
//!
//! The guard's read and the append share one critical section per scope, so
//! two concurrent sales can never both pass against the same snapshot. Pushes
//! carry absolute balances and leave inside the same section, so the stock
//! master sees them in `sarNo` order. A sync failure after step 5 is reported
//! with the committed record attached; the append is never rolled back.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDateTime;
use thiserror::Error;

use taxbridge_core::{DomainError, LedgerScope, SequenceConflict};
use taxbridge_stock::{
    InsufficientStock, MovementRecord, MovementType, PurchaseTransaction, SaleTransaction, StockLevels,
    check_availability, from_purchase, from_sale, reversal_of,
};

use crate::balance::BalanceCalculator;
use crate::ledger_store::{LedgerStore, LedgerStoreError};
use crate::sync::{StockMasterSync, StockMasterUpdate, SyncError};

/// Source of release timestamps for derived movements.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// One item whose stock-master update failed.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSyncFailure {
    pub item_cd: String,
    pub error: SyncError,
}

#[derive(Debug, Error)]
pub enum RecordError {
    /// Malformed input; nothing was appended.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Guard rejection; nothing was appended.
    #[error(transparent)]
    InsufficientStock(#[from] InsufficientStock),

    /// Numbering race at the store; retry with a fresh `sarNo`.
    #[error(transparent)]
    SequenceConflict(SequenceConflict),

    /// I/O or serialization failure; the ledger is unchanged.
    #[error(transparent)]
    Storage(LedgerStoreError),

    /// The movement is committed, but pushing balances failed.
    #[error(
        "movement #{} committed but stock master sync failed for {} item(s)",
        .record.sar_no,
        .failures.len()
    )]
    Sync {
        record: Box<MovementRecord>,
        failures: Vec<ItemSyncFailure>,
    },
}

impl RecordError {
    /// The committed record, if the error happened after the append.
    pub fn committed_record(&self) -> Option<&MovementRecord> {
        match self {
            RecordError::Sync { record, .. } => Some(&**record),
            _ => None,
        }
    }
}

impl From<DomainError> for RecordError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::NotFound(msg) => RecordError::NotFound(msg),
            DomainError::Validation(msg)
            | DomainError::InvariantViolation(msg)
            | DomainError::InvalidId(msg)
            | DomainError::Conflict(msg) => RecordError::Validation(msg),
        }
    }
}

impl From<LedgerStoreError> for RecordError {
    fn from(value: LedgerStoreError) -> Self {
        match value {
            LedgerStoreError::SequenceConflict(c) => RecordError::SequenceConflict(c),
            LedgerStoreError::InvalidRecord(e) => RecordError::from(e),
            other => RecordError::Storage(other),
        }
    }
}

/// Records stock movements for one ledger scope.
///
/// Generic over the ledger store so tests run against `InMemoryLedgerStore`
/// and the service against `JsonFileLedgerStore` with the same pipeline.
pub struct StockMovementRecorder<S> {
    store: S,
    sync: Option<Arc<dyn StockMasterSync>>,
    clock: Clock,
    gate: Mutex<()>,
}

impl<S> StockMovementRecorder<S>
where
    S: LedgerStore,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            sync: None,
            clock: Arc::new(|| chrono::Local::now().naive_local()),
            gate: Mutex::new(()),
        }
    }

    pub fn with_sync(mut self, sync: Arc<dyn StockMasterSync>) -> Self {
        self.sync = Some(sync);
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn scope(&self) -> &LedgerScope {
        self.store.scope()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn balances(&self) -> BalanceCalculator<'_, S> {
        BalanceCalculator::new(&self.store)
    }

    pub fn movements(&self) -> Result<Vec<MovementRecord>, RecordError> {
        Ok(self.store.load_all()?)
    }

    pub fn movement(&self, sar_no: u64) -> Result<MovementRecord, RecordError> {
        self.store
            .load_all()?
            .into_iter()
            .find(|r| r.sar_no == sar_no)
            .ok_or_else(|| unknown_movement(sar_no))
    }

    /// Record the stock-in movement for a purchase.
    pub fn record_purchase(&self, purchase: &PurchaseTransaction) -> Result<MovementRecord, RecordError> {
        purchase.validate_for(self.scope())?;
        let candidate = from_purchase(purchase, (self.clock)());

        let (stored, failures) = self.commit(|_| Ok(candidate))?;
        tracing::info!(
            scope = %self.scope(),
            sar_no = stored.sar_no,
            invoice_no = %purchase.invoice_no,
            items = stored.item_count,
            "stock in recorded"
        );

        sync_outcome(stored, failures)
    }

    /// Record the stock-out movement for a sale, gated on availability.
    pub fn record_sale(&self, sale: &SaleTransaction) -> Result<MovementRecord, RecordError> {
        sale.validate_for(self.scope())?;
        let candidate = from_sale(sale, (self.clock)());

        let (stored, failures) = self.commit(|_| Ok(candidate)).inspect_err(|e| {
            if let RecordError::InsufficientStock(short) = e {
                tracing::warn!(
                    scope = %self.scope(),
                    invoice_no = %sale.invoice_no,
                    item_cd = %short.item_cd,
                    have = %short.have,
                    need = %short.need,
                    "sale rejected"
                );
            }
        })?;
        tracing::info!(
            scope = %self.scope(),
            sar_no = stored.sar_no,
            invoice_no = %sale.invoice_no,
            items = stored.item_count,
            "stock out recorded"
        );

        sync_outcome(stored, failures)
    }

    /// Append the compensating movement for `sar_no`.
    pub fn reverse_movement(&self, sar_no: u64) -> Result<MovementRecord, RecordError> {
        let released_at = (self.clock)();

        let (stored, failures) = self.commit(|history| {
            let original = history
                .iter()
                .find(|r| r.sar_no == sar_no)
                .ok_or_else(|| unknown_movement(sar_no))?;

            if let Some(existing) = history.iter().find(|r| r.org_sar_no == sar_no) {
                return Err(DomainError::conflict(format!(
                    "stock movement #{sar_no} is already reversed by #{}",
                    existing.sar_no
                ))
                .into());
            }

            Ok(reversal_of(original, released_at)?)
        })?;
        tracing::info!(
            scope = %self.scope(),
            sar_no = stored.sar_no,
            org_sar_no = stored.org_sar_no,
            "stock movement reversed"
        );

        sync_outcome(stored, failures)
    }

    /// Re-push balances for an already committed movement. The ledger is not touched.
    pub fn resync_movement(&self, sar_no: u64) -> Result<MovementRecord, RecordError> {
        let _guard = self.lock_gate()?;

        let history = self.store.load_all()?;
        let record = history
            .iter()
            .find(|r| r.sar_no == sar_no)
            .cloned()
            .ok_or_else(|| unknown_movement(sar_no))?;

        let levels = StockLevels::replay(&history);
        let failures = self.push_balances(&record, &levels);
        sync_outcome(record, failures)
    }

    fn lock_gate(&self) -> Result<MutexGuard<'_, ()>, RecordError> {
        self.gate
            .lock()
            .map_err(|_| RecordError::Storage(LedgerStoreError::Storage("recorder gate poisoned".to_string())))
    }

    /// Run `derive` against the current journal, append its result and push the
    /// new balances, all under the gate.
    ///
    /// Returns the stored record and the items whose push failed.
    fn commit<F>(&self, derive: F) -> Result<(MovementRecord, Vec<ItemSyncFailure>), RecordError>
    where
        F: FnOnce(&[MovementRecord]) -> Result<MovementRecord, RecordError>,
    {
        let _guard = self.lock_gate()?;

        let history = self.store.load_all()?;
        let candidate = derive(&history)?;

        let mut levels = StockLevels::replay(&history);
        if candidate.movement_type == MovementType::StockOut {
            check_availability(&candidate, &levels)?;
        }

        let stored = self.store.append(candidate)?;
        levels.apply(&stored);

        let failures = self.push_balances(&stored, &levels);
        Ok((stored, failures))
    }

    fn push_balances(&self, record: &MovementRecord, levels: &StockLevels) -> Vec<ItemSyncFailure> {
        let Some(sync) = &self.sync else {
            tracing::debug!(sar_no = record.sar_no, "stock master sync disabled");
            return Vec::new();
        };

        let mut failures = Vec::new();
        for line in &record.lines {
            let update = StockMasterUpdate {
                tin: record.tin.clone(),
                bhf_id: record.bhf_id.clone(),
                item_cd: line.item_cd.clone(),
                remaining_qty: levels.get(&line.item_cd),
                registrar_id: record.registrar_id.clone(),
                registrar_name: record.registrar_name.clone(),
                modifier_id: record.modifier_id.clone(),
                modifier_name: record.modifier_name.clone(),
                sar_no: record.sar_no,
                delta: line.quantity,
            };

            match sync.update_stock_master(&update) {
                Ok(response) => tracing::debug!(
                    sar_no = record.sar_no,
                    item_cd = %line.item_cd,
                    result_cd = %response.result_cd,
                    "stock master updated"
                ),
                Err(error) => {
                    tracing::warn!(
                        sar_no = record.sar_no,
                        item_cd = %line.item_cd,
                        delta = %update.delta,
                        error = %error,
                        "stock master update failed"
                    );
                    failures.push(ItemSyncFailure {
                        item_cd: line.item_cd.clone(),
                        error,
                    });
                }
            }
        }

        failures
    }
}

fn unknown_movement(sar_no: u64) -> RecordError {
    DomainError::not_found(format!("stock movement #{sar_no}")).into()
}

fn sync_outcome(record: MovementRecord, failures: Vec<ItemSyncFailure>) -> Result<MovementRecord, RecordError> {
    if failures.is_empty() {
        Ok(record)
    } else {
        Err(RecordError::Sync {
            record: Box::new(record),
            failures,
        })
    }
}
