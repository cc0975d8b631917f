//! On-hand quantity replay.
//!
//! Balances are never stored: they are the signed sum of line quantities
//! across the ledger, recomputed on demand.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::movement::MovementRecord;

/// Per-item on-hand quantities for one ledger snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockLevels {
    by_item: BTreeMap<String, Decimal>,
}

impl StockLevels {
    /// Replay records (in any order; addition commutes) into stock levels.
    pub fn replay<'a>(records: impl IntoIterator<Item = &'a MovementRecord>) -> Self {
        let mut levels = Self::default();
        for record in records {
            levels.apply(record);
        }
        levels
    }

    /// Fold one record into the levels.
    pub fn apply(&mut self, record: &MovementRecord) {
        for line in &record.lines {
            *self.by_item.entry(line.item_cd.clone()).or_default() += line.quantity;
        }
    }

    /// On-hand quantity for `item_cd`; unknown items have zero stock.
    pub fn get(&self, item_cd: &str) -> Decimal {
        self.by_item.get(item_cd).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.by_item.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.by_item.is_empty()
    }

    pub fn into_map(self) -> BTreeMap<String, Decimal> {
        self.by_item
    }
}

/// Signed sum of `qty` for `item_cd` across `records`.
pub fn current_stock<'a>(records: impl IntoIterator<Item = &'a MovementRecord>, item_cd: &str) -> Decimal {
    records.into_iter().map(|r| r.quantity_of(item_cd)).sum()
}
