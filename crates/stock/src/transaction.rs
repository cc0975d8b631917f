//! Inbound business transactions that move stock.
//!
//! These mirror the sale/purchase payloads submitted to the tax system; only
//! the fields the ledger consumes are modelled; unknown fields are ignored.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use taxbridge_core::{DomainError, DomainResult, LedgerScope};

/// One item line of a sale or purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionLine {
    #[serde(rename = "itemSeq", default)]
    pub item_seq: u32,
    #[serde(rename = "itemCd", default)]
    pub item_cd: String,
    #[serde(rename = "itemClsCd", default)]
    pub item_class_cd: String,
    #[serde(rename = "itemNm", default)]
    pub item_name: String,
    #[serde(rename = "pkgUnitCd", default)]
    pub package_unit_cd: String,
    #[serde(rename = "pkg", default)]
    pub package: f64,
    #[serde(rename = "qtyUnitCd", default)]
    pub quantity_unit_cd: String,
    #[serde(rename = "qty", with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    #[serde(rename = "prc", default)]
    pub unit_price: f64,
    #[serde(rename = "splyAmt", default)]
    pub supply_amount: f64,
    #[serde(rename = "dcRt", default)]
    pub discount_rate: f64,
    #[serde(rename = "dcAmt", default)]
    pub discount_amount: f64,
    #[serde(rename = "taxTyCd", default)]
    pub tax_type_cd: String,
    #[serde(rename = "taxblAmt", default)]
    pub taxable_amount: f64,
    #[serde(rename = "taxAmt", default)]
    pub tax_amount: f64,
    #[serde(rename = "totAmt", default)]
    pub total_amount: f64,
    #[serde(rename = "itemExprDt", default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
}

/// Receipt block printed on a sale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(rename = "custTin", default)]
    pub customer_tin: String,
    #[serde(rename = "custMblNo", default)]
    pub customer_mobile: String,
    #[serde(rename = "trdeNm", default)]
    pub trade_name: String,
}

/// A sales invoice (stock leaves the branch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleTransaction {
    #[serde(default)]
    pub tin: String,
    #[serde(rename = "bhfId", default)]
    pub bhf_id: String,
    #[serde(rename = "invcNo", default)]
    pub invoice_no: String,
    #[serde(rename = "custTin", default)]
    pub customer_tin: String,
    #[serde(rename = "custNm", default)]
    pub customer_name: String,
    /// Sale date, `YYYYMMDD`.
    #[serde(rename = "salesDt", default)]
    pub sales_date: String,
    #[serde(rename = "totTaxblAmt", default)]
    pub total_taxable_amount: f64,
    #[serde(rename = "totTaxAmt", default)]
    pub total_tax_amount: f64,
    #[serde(rename = "totAmt", default)]
    pub total_amount: f64,
    #[serde(rename = "regrId", default)]
    pub registrar_id: String,
    #[serde(rename = "regrNm", default)]
    pub registrar_name: String,
    #[serde(rename = "modrId", default)]
    pub modifier_id: String,
    #[serde(rename = "modrNm", default)]
    pub modifier_name: String,
    #[serde(default)]
    pub receipt: Receipt,
    #[serde(rename = "itemList", default)]
    pub lines: Vec<TransactionLine>,
}

/// A purchase invoice (stock enters the branch).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseTransaction {
    #[serde(default)]
    pub tin: String,
    #[serde(rename = "bhfId", default)]
    pub bhf_id: String,
    #[serde(rename = "invcNo", default)]
    pub invoice_no: String,
    #[serde(rename = "spplrTin", default)]
    pub supplier_tin: String,
    #[serde(rename = "spplrNm", default)]
    pub supplier_name: String,
    #[serde(rename = "spplrBhfId", default)]
    pub supplier_bhf_id: String,
    /// Purchase date, `YYYYMMDD`.
    #[serde(rename = "pchsDt", default)]
    pub purchase_date: String,
    #[serde(rename = "totTaxblAmt", default)]
    pub total_taxable_amount: f64,
    #[serde(rename = "totTaxAmt", default)]
    pub total_tax_amount: f64,
    #[serde(rename = "totAmt", default)]
    pub total_amount: f64,
    #[serde(rename = "regrId", default)]
    pub registrar_id: String,
    #[serde(rename = "regrNm", default)]
    pub registrar_name: String,
    #[serde(rename = "modrId", default)]
    pub modifier_id: String,
    #[serde(rename = "modrNm", default)]
    pub modifier_name: String,
    #[serde(rename = "itemList", default)]
    pub lines: Vec<TransactionLine>,
}

impl SaleTransaction {
    /// Reject sales that must not reach the ledger.
    pub fn validate_for(&self, scope: &LedgerScope) -> DomainResult<()> {
        validate_header(scope, &self.tin, &self.bhf_id, &self.invoice_no)?;
        validate_lines(&self.lines)
    }
}

impl PurchaseTransaction {
    /// Reject purchases that must not reach the ledger.
    pub fn validate_for(&self, scope: &LedgerScope) -> DomainResult<()> {
        validate_header(scope, &self.tin, &self.bhf_id, &self.invoice_no)?;
        validate_lines(&self.lines)
    }
}

fn validate_header(scope: &LedgerScope, tin: &str, bhf_id: &str, invoice_no: &str) -> DomainResult<()> {
    if tin.trim().is_empty() {
        return Err(DomainError::validation("tin is required"));
    }
    if bhf_id.trim().is_empty() {
        return Err(DomainError::validation("bhfId is required"));
    }
    if !scope.matches(tin, bhf_id) {
        return Err(DomainError::validation(format!(
            "transaction for {tin}/{bhf_id} does not belong to ledger {scope}"
        )));
    }
    if invoice_no.trim().is_empty() {
        return Err(DomainError::validation("invcNo is required"));
    }
    Ok(())
}

fn validate_lines(lines: &[TransactionLine]) -> DomainResult<()> {
    if lines.is_empty() {
        return Err(DomainError::validation("at least one item is required"));
    }
    for (idx, line) in lines.iter().enumerate() {
        if line.item_cd.trim().is_empty() {
            return Err(DomainError::validation(format!("itemCd is required for item {}", idx + 1)));
        }
        if line.item_name.trim().is_empty() {
            return Err(DomainError::validation(format!("itemNm is required for item {}", idx + 1)));
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use rust_decimal::prelude::ToPrimitive;

    pub fn line(item_cd: &str, quantity: Decimal) -> TransactionLine {
        let magnitude = quantity.abs().to_f64().unwrap_or_default();
        TransactionLine {
            item_seq: 1,
            item_cd: item_cd.to_string(),
            item_class_cd: "5059690800".to_string(),
            item_name: format!("Item {item_cd}"),
            package_unit_cd: "NT".to_string(),
            package: 1.0,
            quantity_unit_cd: "U".to_string(),
            quantity,
            unit_price: 50.0,
            supply_amount: 50.0 * magnitude,
            discount_rate: 0.0,
            discount_amount: 0.0,
            tax_type_cd: "B".to_string(),
            taxable_amount: 50.0 * magnitude,
            tax_amount: 8.0 * magnitude,
            total_amount: 58.0 * magnitude,
            expiry_date: None,
        }
    }

    pub fn sale(invoice_no: &str, lines: Vec<TransactionLine>) -> SaleTransaction {
        SaleTransaction {
            tin: "P1".to_string(),
            bhf_id: "00".to_string(),
            invoice_no: invoice_no.to_string(),
            customer_tin: "A000000001Z".to_string(),
            customer_name: "Walk-in Customer".to_string(),
            sales_date: "20240102".to_string(),
            total_taxable_amount: 200.0,
            total_tax_amount: 32.0,
            total_amount: 232.0,
            registrar_id: "cashier".to_string(),
            registrar_name: "Cashier".to_string(),
            modifier_id: "cashier".to_string(),
            modifier_name: "Cashier".to_string(),
            receipt: Receipt::default(),
            lines,
        }
    }

    pub fn purchase(invoice_no: &str, lines: Vec<TransactionLine>) -> PurchaseTransaction {
        PurchaseTransaction {
            tin: "P1".to_string(),
            bhf_id: "00".to_string(),
            invoice_no: invoice_no.to_string(),
            supplier_tin: "A000000001Z".to_string(),
            supplier_name: "Supplier Co".to_string(),
            supplier_bhf_id: "00".to_string(),
            purchase_date: "20240101".to_string(),
            total_taxable_amount: 500.0,
            total_tax_amount: 80.0,
            total_amount: 580.0,
            registrar_id: "Admin".to_string(),
            registrar_name: "Admin".to_string(),
            modifier_id: "Admin".to_string(),
            modifier_name: "Admin".to_string(),
            lines,
        }
    }
}
