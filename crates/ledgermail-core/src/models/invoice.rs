//! Normalized invoice record produced from an OCR expense document.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An invoice as understood by the posting step.
///
/// Every field the OCR engine may fail to find is optional; absence is not an
/// error at extraction time. The posting step decides which fields it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// Supplier's invoice identifier (e.g. "INV-001").
    pub invoice_id: Option<String>,

    /// Net charge, excluding tax.
    pub net_charge: Option<Decimal>,

    /// ISO currency code of `net_charge`.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Date printed on the invoice.
    pub receipt_date: Option<NaiveDate>,
}

fn default_currency() -> String {
    "GBP".to_string()
}

impl InvoiceRecord {
    /// Create an empty record in the given currency.
    pub fn new(currency: impl Into<String>) -> Self {
        Self {
            invoice_id: None,
            net_charge: None,
            currency: currency.into(),
            receipt_date: None,
        }
    }

    /// Names of the fields that were not found.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.invoice_id.is_none() {
            missing.push("invoice_id");
        }
        if self.net_charge.is_none() {
            missing.push("net_charge");
        }
        if self.receipt_date.is_none() {
            missing.push("receipt_date");
        }
        missing
    }

    /// Whether every field was found.
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

impl Default for InvoiceRecord {
    fn default() -> Self {
        Self::new(default_currency())
    }
}
