//! Expense document parser producing an [`InvoiceRecord`].

use tracing::{debug, info};

use crate::models::config::ExtractionConfig;
use crate::models::expense::{ExpenseDocument, ExpenseField, ExpenseResponse};
use crate::models::invoice::InvoiceRecord;

use super::rules::parse_invoice_date;
use super::{ExpenseParser, Result};

/// Best-effort parser over OCR expense documents.
///
/// Every document, line item and summary field is scanned; later matches
/// overwrite earlier ones. Absent fields stay `None`. Only a date value that
/// does not fit the configured format is an error.
#[derive(Debug, Clone)]
pub struct ExpenseFieldParser {
    config: ExtractionConfig,
}

impl ExpenseFieldParser {
    /// Create a parser from the extraction configuration.
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    fn scan_line_items(&self, document: &ExpenseDocument, record: &mut InvoiceRecord) {
        let fields = document
            .line_item_groups
            .iter()
            .flat_map(|group| &group.line_items)
            .flat_map(|item| &item.line_item_expense_fields);

        for field in fields {
            let Some(text) = field.value() else {
                continue;
            };

            for rule in &self.config.charge_rules {
                if let Some(charge) = rule.apply(text) {
                    debug!(amount = %charge.amount, currency = %charge.currency, "Matched charge");
                    record.net_charge = Some(charge.amount);
                    record.currency = charge.currency;
                }
            }
        }
    }

    fn scan_summary(&self, document: &ExpenseDocument, record: &mut InvoiceRecord) -> Result<()> {
        for field in &document.summary_fields {
            let Some((label, value)) = label_and_value(field) else {
                continue;
            };

            if label == self.config.invoice_number_label {
                debug!(invoice_id = %value, "Matched invoice number");
                record.invoice_id = Some(value.to_string());
            } else if label == self.config.invoice_date_label {
                let date = parse_invoice_date(value, &self.config.date_format)?;
                debug!(%date, "Matched invoice date");
                record.receipt_date = Some(date);
            }
        }
        Ok(())
    }
}

impl ExpenseParser for ExpenseFieldParser {
    fn parse(&self, response: &ExpenseResponse) -> Result<InvoiceRecord> {
        let mut record = InvoiceRecord::new(self.config.currency.clone());

        for document in &response.expense_documents {
            self.scan_line_items(document, &mut record);
            self.scan_summary(document, &mut record)?;
        }

        let missing = record.missing_fields();
        if missing.is_empty() {
            info!("Parsed complete invoice record");
        } else {
            info!(?missing, "Parsed invoice record with missing fields");
        }

        Ok(record)
    }
}

/// Label and value of a summary field. Labels are compared verbatim.
fn label_and_value(field: &ExpenseField) -> Option<(&str, &str)> {
    Some((field.label()?, field.value()?))
}
