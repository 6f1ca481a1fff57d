//! Declarative charge rules for line-item text.
//!
//! A rule is keyed by a label substring and a currency token. The value text
//! of a line-item field is matched when it contains both; the amount is then
//! read from the text following the label:
//!
//! 1. take the text after the label,
//! 2. cut it at the first discard token (sibling amounts in other currencies),
//! 3. read the amount that follows the currency token, or, when the currency
//!    token trails the amount (`123.45 GBP`), the last amount before it.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::patterns::{AMOUNT_EXACT, AMOUNT_TOKEN};

/// A single label/currency charge rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeRule {
    /// Label substring that introduces the charge.
    pub label: String,

    /// Currency token that marks the amount, e.g. `GBP`.
    pub currency: String,

    /// Tokens after which the remainder is ignored.
    #[serde(default)]
    pub discard_tokens: Vec<String>,
}

/// Amount read by a [`ChargeRule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargeMatch {
    pub amount: Decimal,
    pub currency: String,
}

impl ChargeRule {
    /// Create a rule with no discard tokens.
    pub fn new(label: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            currency: currency.into(),
            discard_tokens: Vec::new(),
        }
    }

    /// Add a discard token.
    pub fn discarding(mut self, token: impl Into<String>) -> Self {
        self.discard_tokens.push(token.into());
        self
    }

    /// Net charges in GBP, ignoring any USD figure printed alongside.
    pub fn net_charges_gbp() -> Self {
        Self::new("Net Charges (After Credits/Discounts, excl. Tax)", "GBP").discarding("USD")
    }

    /// Whether the text carries both the label and the currency token.
    pub fn matches(&self, text: &str) -> bool {
        !self.label.is_empty()
            && !self.currency.is_empty()
            && text.contains(&self.label)
            && text.contains(&self.currency)
    }

    /// Apply the rule to a field's value text.
    ///
    /// Returns `None` when the rule does not match or when a matched text
    /// holds no readable amount.
    pub fn apply(&self, text: &str) -> Option<ChargeMatch> {
        if !self.matches(text) {
            return None;
        }

        let remainder = text.split(self.label.as_str()).nth(1).unwrap_or_default();
        let remainder = self.cut_at_discard(remainder);

        let Some(raw) = self.amount_text(remainder) else {
            warn!(rule = %self.label, "Charge label matched but no amount follows it");
            return None;
        };

        match parse_amount(raw) {
            Some(amount) => Some(ChargeMatch {
                amount,
                currency: self.currency.clone(),
            }),
            None => {
                warn!(rule = %self.label, value = %raw, "Unreadable charge amount");
                None
            }
        }
    }

    fn cut_at_discard<'a>(&self, text: &'a str) -> &'a str {
        let end = self
            .discard_tokens
            .iter()
            .filter(|t| !t.is_empty())
            .filter_map(|t| text.find(t.as_str()))
            .min()
            .unwrap_or(text.len());
        &text[..end]
    }

    fn amount_text<'a>(&self, remainder: &'a str) -> Option<&'a str> {
        let mut segments = remainder.split(self.currency.as_str());
        let before = segments.next()?;
        let after = segments.next()?.trim();

        if AMOUNT_EXACT.is_match(after) {
            return Some(after);
        }
        if let Some(m) = AMOUNT_TOKEN.find(after) {
            return Some(m.as_str());
        }
        AMOUNT_TOKEN.find_iter(before).last().map(|m| m.as_str())
    }
}

/// Parse a plain decimal amount, dropping thousands separators.
pub fn parse_amount(text: &str) -> Option<Decimal> {
    Decimal::from_str(&text.trim().replace(',', "")).ok()
}
