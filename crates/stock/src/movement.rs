use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use taxbridge_core::{DomainError, DomainResult};

/// How a movement was registered with the tax system (`regTyCd`).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegistrationType {
    #[default]
    #[serde(rename = "M")]
    Manual,
}

/// Movement direction (`sarTyCd` on the record, `stockTyCd` on each line).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementType {
    #[serde(rename = "01")]
    StockIn,
    #[serde(rename = "02")]
    StockOut,
}

impl MovementType {
    pub fn code(self) -> &'static str {
        match self {
            MovementType::StockIn => "01",
            MovementType::StockOut => "02",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            MovementType::StockIn => MovementType::StockOut,
            MovementType::StockOut => MovementType::StockIn,
        }
    }

    /// Apply this direction's sign convention to a magnitude.
    ///
    /// Stock-in is non-negative, stock-out is non-positive, whatever the input sign.
    pub fn signed(self, quantity: Decimal) -> Decimal {
        match self {
            MovementType::StockIn => quantity.abs(),
            MovementType::StockOut => -quantity.abs(),
        }
    }

    /// Whether `quantity` respects this direction's sign convention.
    pub fn admits(self, quantity: Decimal) -> bool {
        match self {
            MovementType::StockIn => quantity >= Decimal::ZERO,
            MovementType::StockOut => quantity <= Decimal::ZERO,
        }
    }
}

/// One stock-affecting event, as persisted in the ledger.
///
/// A record is created once (by the deriver), appended, and never mutated.
/// `sar_no == 0` marks a pending record that the store has not numbered yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementRecord {
    pub tin: String,
    #[serde(rename = "bhfId")]
    pub bhf_id: String,
    #[serde(rename = "sarNo")]
    pub sar_no: u64,
    /// `sarNo` of the movement this one reverses; 0 when not a reversal.
    #[serde(rename = "orgSarNo", default)]
    pub org_sar_no: u64,
    #[serde(rename = "regTyCd", default)]
    pub registration_type: RegistrationType,
    #[serde(rename = "custTin", default, skip_serializing_if = "Option::is_none")]
    pub customer_tin: Option<String>,
    #[serde(rename = "custNm", default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(rename = "custBhfId", default, skip_serializing_if = "Option::is_none")]
    pub customer_bhf_id: Option<String>,
    #[serde(rename = "sarTyCd")]
    pub movement_type: MovementType,
    /// Occurrence date, `YYYYMMDD`.
    #[serde(rename = "ocrnDt", default)]
    pub occurred_on: String,
    /// Release timestamp, `YYYYMMDDhhmmss`.
    #[serde(rename = "stockRlsDt", default)]
    pub released_at: String,
    #[serde(rename = "totItemCnt", default)]
    pub item_count: usize,
    #[serde(rename = "totTaxblAmt", default)]
    pub total_taxable_amount: f64,
    #[serde(rename = "totTaxAmt", default)]
    pub total_tax_amount: f64,
    #[serde(rename = "totAmt", default)]
    pub total_amount: f64,
    #[serde(default)]
    pub remark: String,
    #[serde(rename = "regrId", default)]
    pub registrar_id: String,
    #[serde(rename = "regrNm", default)]
    pub registrar_name: String,
    #[serde(rename = "modrId", default)]
    pub modifier_id: String,
    #[serde(rename = "modrNm", default)]
    pub modifier_name: String,
    #[serde(rename = "itemList", default)]
    pub lines: Vec<MovementLine>,
}

/// One item's contribution to a movement. Owned by its record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementLine {
    #[serde(rename = "itemSeq")]
    pub item_seq: u32,
    #[serde(rename = "itemCd")]
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
    /// Signed quantity; the sign encodes direction.
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
    #[serde(rename = "totDcAmt", default)]
    pub total_discount_amount: f64,
    #[serde(rename = "taxTyCd", default)]
    pub tax_type_cd: String,
    #[serde(rename = "taxblAmt", default)]
    pub taxable_amount: f64,
    #[serde(rename = "taxAmt", default)]
    pub tax_amount: f64,
    #[serde(rename = "totAmt", default)]
    pub total_amount: f64,
    #[serde(rename = "stockTyCd")]
    pub stock_type: MovementType,
    #[serde(rename = "itemExprDt", default)]
    pub expiry_date: String,
    #[serde(default)]
    pub remark: String,
}

impl MovementRecord {
    pub fn is_reversal(&self) -> bool {
        self.org_sar_no != 0
    }

    /// Signed quantity this record contributes to `item_cd`.
    pub fn quantity_of(&self, item_cd: &str) -> Decimal {
        self.lines
            .iter()
            .filter(|l| l.item_cd == item_cd)
            .map(|l| l.quantity)
            .sum()
    }

    /// Check the structural invariants every stored record must hold.
    pub fn validate(&self) -> DomainResult<()> {
        if self.tin.trim().is_empty() {
            return Err(DomainError::validation("tin is required"));
        }
        if self.bhf_id.trim().is_empty() {
            return Err(DomainError::validation("bhfId is required"));
        }
        if self.item_count != self.lines.len() {
            return Err(DomainError::invariant(format!(
                "totItemCnt is {} but itemList has {} lines",
                self.item_count,
                self.lines.len()
            )));
        }
        if self.sar_no != 0 && self.org_sar_no >= self.sar_no {
            return Err(DomainError::invariant(format!(
                "orgSarNo {} must precede sarNo {}",
                self.org_sar_no, self.sar_no
            )));
        }

        for (idx, line) in self.lines.iter().enumerate() {
            let expected_seq = idx as u32 + 1;
            if line.item_seq != expected_seq {
                return Err(DomainError::invariant(format!(
                    "line {expected_seq} has itemSeq {}",
                    line.item_seq
                )));
            }
            if line.item_cd.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "itemCd is required for line {expected_seq}"
                )));
            }
            if line.stock_type != self.movement_type {
                return Err(DomainError::invariant(format!(
                    "line {expected_seq} stockTyCd {} does not match sarTyCd {}",
                    line.stock_type.code(),
                    self.movement_type.code()
                )));
            }
            if !self.movement_type.admits(line.quantity) {
                return Err(DomainError::invariant(format!(
                    "line {expected_seq} quantity {} violates the sign convention for sarTyCd {}",
                    line.quantity,
                    self.movement_type.code()
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use rust_decimal::prelude::ToPrimitive;

    pub fn line(seq: u32, item_cd: &str, quantity: Decimal, stock_type: MovementType) -> MovementLine {
        let magnitude = quantity.abs().to_f64().unwrap_or_default();
        MovementLine {
            item_seq: seq,
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
            total_discount_amount: 0.0,
            tax_type_cd: "B".to_string(),
            taxable_amount: 50.0 * magnitude,
            tax_amount: 8.0 * magnitude,
            total_amount: 58.0 * magnitude,
            stock_type,
            expiry_date: "20240101".to_string(),
            remark: String::new(),
        }
    }

    pub fn record(movement_type: MovementType, lines: Vec<MovementLine>) -> MovementRecord {
        MovementRecord {
            tin: "P1".to_string(),
            bhf_id: "00".to_string(),
            sar_no: 0,
            org_sar_no: 0,
            registration_type: RegistrationType::Manual,
            customer_tin: None,
            customer_name: None,
            customer_bhf_id: None,
            movement_type,
            occurred_on: "20240101".to_string(),
            released_at: "20240101120000".to_string(),
            item_count: lines.len(),
            total_taxable_amount: 0.0,
            total_tax_amount: 0.0,
            total_amount: 0.0,
            remark: String::new(),
            registrar_id: "Admin".to_string(),
            registrar_name: "Admin".to_string(),
            modifier_id: "Admin".to_string(),
            modifier_name: "Admin".to_string(),
            lines,
        }
    }
}
