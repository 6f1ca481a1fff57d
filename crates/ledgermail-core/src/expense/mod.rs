//! Expense field extraction module.

mod parser;
pub mod rules;

pub use parser::ExpenseFieldParser;

use crate::error::ExtractionError;
use crate::models::expense::ExpenseResponse;
use crate::models::invoice::InvoiceRecord;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for turning an OCR expense response into an invoice record.
pub trait ExpenseParser {
    /// Parse a decoded OCR response.
    fn parse(&self, response: &ExpenseResponse) -> Result<InvoiceRecord>;

    /// Parse an OCR response from its JSON text.
    fn parse_json(&self, text: &str) -> Result<InvoiceRecord> {
        self.parse(&ExpenseResponse::from_json(text)?)
    }
}
