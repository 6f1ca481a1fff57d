//! Invoice date parsing.

use chrono::NaiveDate;

use crate::error::ExtractionError;

/// Parse an invoice date value with a `strftime` format, e.g. `"%B %d, %Y"`.
///
/// Surrounding whitespace is ignored. Anything else that does not fit the
/// format is an error rather than an absent date.
pub fn parse_invoice_date(value: &str, format: &str) -> Result<NaiveDate, ExtractionError> {
    NaiveDate::parse_from_str(value.trim(), format).map_err(|_| ExtractionError::DateParse {
        value: value.to_string(),
        format: format.to_string(),
    })
}
