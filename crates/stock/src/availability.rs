//! Availability guard for stock-reducing movements.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::balance::StockLevels;
use crate::movement::MovementRecord;

/// A stock-out would drive `item_cd` below zero.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("insufficient stock for item {item_cd}: have {}, need {}", .have.normalize(), .need.normalize())]
pub struct InsufficientStock {
    pub item_cd: String,
    pub have: Decimal,
    pub need: Decimal,
}

/// Check that every reducing line of `candidate` is covered by `levels`.
///
/// `levels` must be the ledger state before the candidate is appended. Lines of
/// the same item accumulate, so a movement cannot split one shortfall across
/// several lines. The first short line fails the whole movement.
pub fn check_availability(candidate: &MovementRecord, levels: &StockLevels) -> Result<(), InsufficientStock> {
    let mut needed: Vec<(&str, Decimal)> = Vec::new();

    for line in candidate.lines.iter().filter(|l| l.quantity < Decimal::ZERO) {
        let need = match needed.iter_mut().find(|(item, _)| *item == line.item_cd) {
            Some((_, total)) => {
                *total += -line.quantity;
                *total
            }
            None => {
                needed.push((line.item_cd.as_str(), -line.quantity));
                -line.quantity
            }
        };

        let have = levels.get(&line.item_cd);
        if have < need {
            return Err(InsufficientStock {
                item_cd: line.item_cd.clone(),
                have,
                need,
            });
        }
    }

    Ok(())
}
