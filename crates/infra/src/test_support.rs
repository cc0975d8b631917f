//! Shared builders for infra tests.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use taxbridge_core::LedgerScope;
use taxbridge_stock::{
    MovementLine, MovementRecord, MovementType, PurchaseTransaction, Receipt, RegistrationType,
    SaleTransaction, TransactionLine,
};

pub fn scope() -> LedgerScope {
    LedgerScope::parse("P1", "00").unwrap()
}

pub fn fixed_clock() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap()
}

pub fn item(item_cd: &str, quantity: Decimal) -> TransactionLine {
    let magnitude = quantity.to_f64().unwrap_or_default();
    TransactionLine {
        item_seq: 1,
        item_cd: item_cd.to_string(),
        item_class_cd: "5059690800".to_string(),
        item_name: format!("Item {item_cd}"),
        package_unit_cd: "NT".to_string(),
        package: 1.0,
        quantity_unit_cd: "U".to_string(),
        quantity,
        unit_price: 100.0,
        supply_amount: 100.0 * magnitude,
        discount_rate: 0.0,
        discount_amount: 0.0,
        tax_type_cd: "B".to_string(),
        taxable_amount: 100.0 * magnitude,
        tax_amount: 16.0 * magnitude,
        total_amount: 116.0 * magnitude,
        expiry_date: None,
    }
}

pub fn purchase(invoice_no: &str, lines: Vec<TransactionLine>) -> PurchaseTransaction {
    PurchaseTransaction {
        tin: "P1".to_string(),
        bhf_id: "00".to_string(),
        invoice_no: invoice_no.to_string(),
        supplier_tin: "S000000001A".to_string(),
        supplier_name: "Supplier Co".to_string(),
        supplier_bhf_id: "00".to_string(),
        purchase_date: "20240101".to_string(),
        total_taxable_amount: 1000.0,
        total_tax_amount: 160.0,
        total_amount: 1160.0,
        registrar_id: "Admin".to_string(),
        registrar_name: "Admin".to_string(),
        modifier_id: "Admin".to_string(),
        modifier_name: "Admin".to_string(),
        lines,
    }
}

pub fn sale(invoice_no: &str, lines: Vec<TransactionLine>) -> SaleTransaction {
    SaleTransaction {
        tin: "P1".to_string(),
        bhf_id: "00".to_string(),
        invoice_no: invoice_no.to_string(),
        customer_tin: "C000000001B".to_string(),
        customer_name: "Customer".to_string(),
        sales_date: "20240102".to_string(),
        total_taxable_amount: 400.0,
        total_tax_amount: 64.0,
        total_amount: 464.0,
        registrar_id: "cashier".to_string(),
        registrar_name: "Cashier".to_string(),
        modifier_id: "cashier".to_string(),
        modifier_name: "Cashier".to_string(),
        receipt: Receipt::default(),
        lines,
    }
}

/// A one-line stock-in record for `tin`/`00` carrying `sar_no`.
pub fn receipt_record(tin: &str, sar_no: u64) -> MovementRecord {
    MovementRecord {
        tin: tin.to_string(),
        bhf_id: "00".to_string(),
        sar_no,
        org_sar_no: 0,
        registration_type: RegistrationType::Manual,
        customer_tin: None,
        customer_name: None,
        customer_bhf_id: None,
        movement_type: MovementType::StockIn,
        occurred_on: "20240101".to_string(),
        released_at: "20240101120000".to_string(),
        item_count: 1,
        total_taxable_amount: 100.0,
        total_tax_amount: 16.0,
        total_amount: 116.0,
        remark: String::new(),
        registrar_id: "Admin".to_string(),
        registrar_name: "Admin".to_string(),
        modifier_id: "Admin".to_string(),
        modifier_name: "Admin".to_string(),
        lines: vec![MovementLine {
            item_seq: 1,
            item_cd: "X".to_string(),
            item_class_cd: "5059690800".to_string(),
            item_name: "Item X".to_string(),
            package_unit_cd: "NT".to_string(),
            package: 1.0,
            quantity_unit_cd: "U".to_string(),
            quantity: Decimal::ONE,
            unit_price: 100.0,
            supply_amount: 100.0,
            discount_rate: 0.0,
            discount_amount: 0.0,
            total_discount_amount: 0.0,
            tax_type_cd: "B".to_string(),
            taxable_amount: 100.0,
            tax_amount: 16.0,
            total_amount: 116.0,
            stock_type: MovementType::StockIn,
            expiry_date: "20240101".to_string(),
            remark: String::new(),
        }],
    }
}
