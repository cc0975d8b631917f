//! Strongly-typed identifiers for the two-level ledger scope.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Taxpayer identification number of the tenant (`tin`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

/// Branch identifier within a tenant (`bhfId`, e.g. `"00"` for head office).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchId(String);

macro_rules! impl_code_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Parse an identifier, rejecting blank values.
            pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(DomainError::invalid_id(format!("{} cannot be empty", $name)));
                }
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl PartialEq<str> for $t {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }
    };
}

impl_code_newtype!(TenantId, "tin");
impl_code_newtype!(BranchId, "bhfId");

/// Tenant + branch pair scoping one independent ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LedgerScope {
    pub tin: TenantId,
    pub bhf_id: BranchId,
}

impl LedgerScope {
    pub fn new(tin: TenantId, bhf_id: BranchId) -> Self {
        Self { tin, bhf_id }
    }

    /// Build a scope from raw codes, validating both.
    pub fn parse(tin: &str, bhf_id: &str) -> Result<Self, DomainError> {
        Ok(Self {
            tin: TenantId::parse(tin)?,
            bhf_id: BranchId::parse(bhf_id)?,
        })
    }

    /// Whether raw `tin`/`bhfId` codes (as carried on records) belong to this scope.
    pub fn matches(&self, tin: &str, bhf_id: &str) -> bool {
        self.tin == *tin && self.bhf_id == *bhf_id
    }
}

impl core::fmt::Display for LedgerScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.tin, self.bhf_id)
    }
}
