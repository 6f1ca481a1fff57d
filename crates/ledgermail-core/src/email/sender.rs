//! Sender address parsing for the allow-list check.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::EmailError;

lazy_static! {
    /// First `<...>` group of a From header.
    static ref BRACKETED_ADDRESS: Regex = Regex::new(r"<(.*?)>").unwrap();
}

/// Sender of an inbound email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sender {
    /// Bare address, e.g. `billing@example.com`.
    pub address: String,
    /// Portion after the first `@`.
    pub domain: String,
}

impl Sender {
    /// Parse the bracketed address out of a From header value.
    ///
    /// Only the `Name <user@domain>` / `<user@domain>` forms are accepted; a bare
    /// address is treated as malformed.
    pub fn parse(from_header: &str) -> Result<Self, EmailError> {
        let address = BRACKETED_ADDRESS
            .captures(from_header)
            .map(|caps| caps[1].to_string())
            .ok_or_else(|| EmailError::MalformedSender(from_header.to_string()))?;

        let domain = address
            .split('@')
            .nth(1)
            .ok_or_else(|| EmailError::MalformedSender(from_header.to_string()))?
            .to_string();

        Ok(Self { address, domain })
    }

    /// Exact, case-sensitive domain comparison.
    pub fn is_from(&self, domain: &str) -> bool {
        self.domain == domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_sender() {
        let sender = Sender::parse("Billing Team <billing@invoices.example.com>").unwrap();
        assert_eq!(sender.address, "billing@invoices.example.com");
        assert_eq!(sender.domain, "invoices.example.com");
    }

    #[test]
    fn test_first_bracket_wins() {
        let sender = Sender::parse("<a@one.com>, <b@two.com>").unwrap();
        assert_eq!(sender.domain, "one.com");
    }

    #[test]
    fn test_bare_address_is_malformed() {
        assert!(matches!(
            Sender::parse("billing@example.com"),
            Err(EmailError::MalformedSender(_))
        ));
    }

    #[test]
    fn test_address_without_at_is_malformed() {
        assert!(matches!(
            Sender::parse("Someone <nobody>"),
            Err(EmailError::MalformedSender(_))
        ));
    }

    #[test]
    fn test_domain_match_is_case_sensitive() {
        let sender = Sender::parse("<billing@Example.com>").unwrap();
        assert!(sender.is_from("Example.com"));
        assert!(!sender.is_from("example.com"));
    }
}
