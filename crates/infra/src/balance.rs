//! Balance calculator: on-hand quantities replayed from a ledger store.
//!
//! There is no cache; every query reloads the journal, so balances always
//! agree with what is durably stored.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use taxbridge_stock::{StockLevels, current_stock};

use crate::ledger_store::{LedgerStore, LedgerStoreError};

#[derive(Debug)]
pub struct BalanceCalculator<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> BalanceCalculator<'a, S>
where
    S: LedgerStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Signed sum of `qty` over every ledger line for `item_cd`.
    pub fn current_stock(&self, item_cd: &str) -> Result<Decimal, LedgerStoreError> {
        let records = self.store.load_all()?;
        Ok(current_stock(&records, item_cd))
    }

    /// Stock levels of every item the ledger has seen.
    pub fn levels(&self) -> Result<StockLevels, LedgerStoreError> {
        let records = self.store.load_all()?;
        Ok(StockLevels::replay(&records))
    }

    pub fn balances(&self) -> Result<BTreeMap<String, Decimal>, LedgerStoreError> {
        Ok(self.levels()?.into_map())
    }
}
