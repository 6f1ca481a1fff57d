//! Common regex patterns for expense field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Plain decimal amount, optional thousands commas: 1,234.56 / 123.45 / 7
    pub static ref AMOUNT_TOKEN: Regex = Regex::new(
        r"-?\d[\d,]*(?:\.\d+)?"
    ).unwrap();

    // Whole-string amount, used to accept a segment as-is
    pub static ref AMOUNT_EXACT: Regex = Regex::new(
        r"^-?\d[\d,]*(?:\.\d+)?$"
    ).unwrap();
}
