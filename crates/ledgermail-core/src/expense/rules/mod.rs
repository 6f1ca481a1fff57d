//! Rule tables for expense field extraction.

pub mod charges;
pub mod dates;
pub mod patterns;

pub use charges::{parse_amount, ChargeMatch, ChargeRule};
pub use dates::parse_invoice_date;
pub use patterns::*;
