//! Movement derivation: pure mapping from transactions to pending movements.
//!
//! Derived records are pending (`sar_no == 0`); numbering happens on append.
//! The release time is passed in so derivation stays deterministic.

use chrono::NaiveDateTime;

use taxbridge_core::{DomainError, DomainResult};

use crate::movement::{MovementLine, MovementRecord, MovementType, RegistrationType};
use crate::transaction::{PurchaseTransaction, SaleTransaction, TransactionLine};

const DATE_FORMAT: &str = "%Y%m%d";
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Derive the stock-in movement for a purchase.
pub fn from_purchase(purchase: &PurchaseTransaction, released_at: NaiveDateTime) -> MovementRecord {
    let remark = format!("Stock in from purchase invoice #{}", purchase.invoice_no);
    let release_date = released_at.format(DATE_FORMAT).to_string();
    let lines = map_lines(&purchase.lines, MovementType::StockIn, &release_date, &remark);

    MovementRecord {
        tin: purchase.tin.clone(),
        bhf_id: purchase.bhf_id.clone(),
        sar_no: 0,
        org_sar_no: 0,
        registration_type: RegistrationType::Manual,
        customer_tin: non_empty(&purchase.supplier_tin),
        customer_name: non_empty(&purchase.supplier_name),
        customer_bhf_id: non_empty(&purchase.supplier_bhf_id),
        movement_type: MovementType::StockIn,
        occurred_on: occurrence_date(&purchase.purchase_date, &release_date),
        released_at: released_at.format(TIMESTAMP_FORMAT).to_string(),
        item_count: lines.len(),
        total_taxable_amount: purchase.total_taxable_amount,
        total_tax_amount: purchase.total_tax_amount,
        total_amount: purchase.total_amount,
        remark,
        registrar_id: purchase.registrar_id.clone(),
        registrar_name: purchase.registrar_name.clone(),
        modifier_id: purchase.modifier_id.clone(),
        modifier_name: purchase.modifier_name.clone(),
        lines,
    }
}

/// Derive the stock-out movement for a sale.
///
/// Every line quantity is recorded as `-abs(qty)`: a stock-out can never be an increase.
pub fn from_sale(sale: &SaleTransaction, released_at: NaiveDateTime) -> MovementRecord {
    let remark = format!("Stock out for sales invoice #{}", sale.invoice_no);
    let release_date = released_at.format(DATE_FORMAT).to_string();
    let lines = map_lines(&sale.lines, MovementType::StockOut, &release_date, &remark);

    let customer_tin = non_empty(&sale.customer_tin).or_else(|| non_empty(&sale.receipt.customer_tin));

    MovementRecord {
        tin: sale.tin.clone(),
        bhf_id: sale.bhf_id.clone(),
        sar_no: 0,
        org_sar_no: 0,
        registration_type: RegistrationType::Manual,
        customer_tin,
        customer_name: non_empty(&sale.customer_name),
        customer_bhf_id: None,
        movement_type: MovementType::StockOut,
        occurred_on: occurrence_date(&sale.sales_date, &release_date),
        released_at: released_at.format(TIMESTAMP_FORMAT).to_string(),
        item_count: lines.len(),
        total_taxable_amount: sale.total_taxable_amount,
        total_tax_amount: sale.total_tax_amount,
        total_amount: sale.total_amount,
        remark,
        registrar_id: sale.registrar_id.clone(),
        registrar_name: sale.registrar_name.clone(),
        modifier_id: sale.modifier_id.clone(),
        modifier_name: sale.modifier_name.clone(),
        lines,
    }
}

/// Derive the compensating movement for a stored one.
///
/// The reversal points back via `org_sar_no`, runs in the opposite direction and
/// carries the same magnitudes. History is never edited.
pub fn reversal_of(original: &MovementRecord, released_at: NaiveDateTime) -> DomainResult<MovementRecord> {
    if original.sar_no == 0 {
        return Err(DomainError::validation("cannot reverse a movement that was never stored"));
    }
    if original.is_reversal() {
        return Err(DomainError::validation(format!(
            "movement #{} is itself a reversal of #{}",
            original.sar_no, original.org_sar_no
        )));
    }

    let direction = original.movement_type.opposite();
    let remark = format!("Reversal of stock movement #{}", original.sar_no);
    let lines = original
        .lines
        .iter()
        .map(|l| MovementLine {
            quantity: direction.signed(l.quantity),
            stock_type: direction,
            remark: remark.clone(),
            ..l.clone()
        })
        .collect::<Vec<_>>();

    Ok(MovementRecord {
        sar_no: 0,
        org_sar_no: original.sar_no,
        movement_type: direction,
        occurred_on: released_at.format(DATE_FORMAT).to_string(),
        released_at: released_at.format(TIMESTAMP_FORMAT).to_string(),
        item_count: lines.len(),
        remark,
        lines,
        ..original.clone()
    })
}

fn map_lines(
    lines: &[TransactionLine],
    direction: MovementType,
    release_date: &str,
    remark: &str,
) -> Vec<MovementLine> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, item)| MovementLine {
            item_seq: idx as u32 + 1,
            item_cd: item.item_cd.clone(),
            item_class_cd: item.item_class_cd.clone(),
            item_name: item.item_name.clone(),
            package_unit_cd: item.package_unit_cd.clone(),
            package: item.package,
            quantity_unit_cd: item.quantity_unit_cd.clone(),
            quantity: direction.signed(item.quantity),
            unit_price: item.unit_price,
            supply_amount: item.supply_amount,
            discount_rate: item.discount_rate,
            discount_amount: item.discount_amount,
            total_discount_amount: item.discount_amount,
            tax_type_cd: item.tax_type_cd.clone(),
            taxable_amount: item.taxable_amount,
            tax_amount: item.tax_amount,
            total_amount: item.total_amount,
            stock_type: direction,
            expiry_date: item
                .expiry_date
                .as_deref()
                .and_then(non_empty)
                .unwrap_or_else(|| release_date.to_string()),
            remark: remark.to_string(),
        })
        .collect()
}

/// Use the transaction's own date when it is a well-formed `YYYYMMDD`.
fn occurrence_date(candidate: &str, release_date: &str) -> String {
    match chrono::NaiveDate::parse_from_str(candidate, DATE_FORMAT) {
        Ok(_) => candidate.to_string(),
        Err(_) => release_date.to_string(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::fixtures::{line, purchase, sale};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn released_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(12, 30, 5)
            .unwrap()
    }

    #[test]
    fn purchase_becomes_stock_in_with_supplier_as_customer() {
        let p = purchase("INV1", vec![line("X", dec!(10.0)), line("Y", dec!(-3.0))]);
        let rec = from_purchase(&p, released_at());

        assert_eq!(rec.sar_no, 0);
        assert_eq!(rec.movement_type, MovementType::StockIn);
        assert_eq!(rec.item_count, 2);
        assert_eq!(rec.lines[0].quantity, dec!(10));
        assert_eq!(rec.lines[1].quantity, dec!(3));
        assert_eq!(rec.lines[1].item_seq, 2);
        assert_eq!(rec.customer_tin.as_deref(), Some("A000000001Z"));
        assert_eq!(rec.customer_name.as_deref(), Some("Supplier Co"));
        assert_eq!(rec.customer_bhf_id.as_deref(), Some("00"));
        assert_eq!(rec.remark, "Stock in from purchase invoice #INV1");
        assert_eq!(rec.total_amount, 580.0);
        assert_eq!(rec.occurred_on, "20240101");
        assert_eq!(rec.released_at, "20240102123005");
        rec.validate().unwrap();
    }

    #[test]
    fn sale_becomes_stock_out_with_expiry_defaulting_to_release_date() {
        let s = sale("INV2", vec![line("X", dec!(4.0))]);
        let rec = from_sale(&s, released_at());

        assert_eq!(rec.movement_type, MovementType::StockOut);
        assert_eq!(rec.lines[0].quantity, dec!(-4));
        assert_eq!(rec.lines[0].stock_type, MovementType::StockOut);
        assert_eq!(rec.lines[0].expiry_date, "20240102");
        assert_eq!(rec.lines[0].remark, "Stock out for sales invoice #INV2");
        assert_eq!(rec.registrar_id, "cashier");
        assert_eq!(rec.customer_bhf_id, None);
        rec.validate().unwrap();
    }

    #[test]
    fn sale_customer_falls_back_to_receipt_block() {
        let mut s = sale("INV2", vec![line("X", dec!(1.0))]);
        s.customer_tin.clear();
        s.receipt.customer_tin = "B000000002Y".to_string();
        let rec = from_sale(&s, released_at());
        assert_eq!(rec.customer_tin.as_deref(), Some("B000000002Y"));
    }

    #[test]
    fn malformed_transaction_date_falls_back_to_release_date() {
        let mut s = sale("INV2", vec![line("X", dec!(1.0))]);
        s.sales_date = "2024-01-02".to_string();
        assert_eq!(from_sale(&s, released_at()).occurred_on, "20240102");
    }

    #[test]
    fn empty_transaction_still_derives_an_empty_record() {
        let rec = from_sale(&sale("INV3", vec![]), released_at());
        assert_eq!(rec.item_count, 0);
        assert!(rec.lines.is_empty());
    }

    #[test]
    fn reversal_flips_direction_and_points_at_original() {
        let mut original = from_sale(&sale("INV2", vec![line("X", dec!(4.0))]), released_at());
        original.sar_no = 2;

        let rev = reversal_of(&original, released_at()).unwrap();
        assert_eq!(rev.sar_no, 0);
        assert_eq!(rev.org_sar_no, 2);
        assert_eq!(rev.movement_type, MovementType::StockIn);
        assert_eq!(rev.lines[0].quantity, dec!(4));
        assert_eq!(rev.lines[0].stock_type, MovementType::StockIn);
        assert_eq!(rev.remark, "Reversal of stock movement #2");
        rev.validate().unwrap();
    }

    #[test]
    fn reversal_of_reversal_or_pending_is_rejected() {
        let pending = from_sale(&sale("INV2", vec![line("X", dec!(4.0))]), released_at());
        assert!(reversal_of(&pending, released_at()).is_err());

        let mut rev = pending.clone();
        rev.sar_no = 5;
        rev.org_sar_no = 2;
        assert!(matches!(
            reversal_of(&rev, released_at()),
            Err(DomainError::Validation(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: purchases record `abs(q)` and sales record `-abs(q)` for any input sign.
        #[test]
        fn sign_convention_holds_for_any_input_quantity(
            cents in prop::collection::vec(-1_000_000i64..1_000_000, 1..8)
        ) {
            let quantities: Vec<Decimal> = cents.iter().map(|c| Decimal::new(*c, 2)).collect();
            let lines: Vec<_> = quantities.iter().map(|q| line("X", *q)).collect();

            let stock_in = from_purchase(&purchase("P", lines.clone()), released_at());
            let stock_out = from_sale(&sale("S", lines), released_at());

            for (idx, q) in quantities.iter().enumerate() {
                prop_assert_eq!(stock_in.lines[idx].quantity, q.abs());
                prop_assert_eq!(stock_out.lines[idx].quantity, -q.abs());
            }
            prop_assert!(stock_in.validate().is_ok());
            prop_assert!(stock_out.validate().is_ok());
        }
    }
}
