//! Configuration structures for the ingestion pipeline.
//!
//! A single [`PipelineConfig`] is built once at the edge (file or environment)
//! and handed to each component at construction.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::LedgerMailError;
use crate::expense::rules::ChargeRule;

/// Main configuration for the ledgermail pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Inbound email handling.
    pub email: EmailConfig,

    /// OCR expense field extraction.
    pub extraction: ExtractionConfig,

    /// Accounting system credentials and schema.
    pub accounting: AccountingConfig,

    /// Archival copy of the attachment.
    pub archive: ArchiveConfig,

    /// First-page rasterization.
    pub pdf: PdfConfig,

    /// Directory for the scoped temporary attachment file (default: system temp).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<PathBuf>,
}

/// Inbound email configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    /// Sender domain that is allowed to submit invoices (exact, case-sensitive).
    pub allowed_domain: String,

    /// Which part of the message supplies the attachment payload.
    pub attachment_selection: AttachmentSelection,
}

/// Attachment payload selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AttachmentSelection {
    /// Payload of the top-level part at `index`; the filename still comes from
    /// the last qualifying part found by the walk.
    FixedPosition { index: usize },

    /// Payload and filename both from the last qualifying part.
    LastCandidate,
}

impl Default for AttachmentSelection {
    fn default() -> Self {
        Self::FixedPosition { index: 1 }
    }
}

/// Expense field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Currency recorded when no charge rule matched.
    pub currency: String,

    /// Line-item charge rules, tried in order on every field.
    pub charge_rules: Vec<ChargeRule>,

    /// Summary label whose value is the invoice identifier.
    pub invoice_number_label: String,

    /// Summary label whose value is the invoice date.
    pub invoice_date_label: String,

    /// `strftime` format of the invoice date value.
    pub date_format: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            currency: "GBP".to_string(),
            charge_rules: vec![ChargeRule::net_charges_gbp()],
            invoice_number_label: "VAT Invoice Number:".to_string(),
            invoice_date_label: "VAT Invoice Date:".to_string(),
            date_format: "%B %d, %Y".to_string(),
        }
    }
}

/// Accounting system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountingConfig {
    /// Supplier the purchases are booked against.
    pub supplier_id: String,

    /// Account number used in the submission envelope.
    pub account_number: String,

    /// API key mixed into the envelope digest. Never sent in clear.
    pub api_key: String,

    /// Application identifier used in the submission envelope.
    pub application_id: String,

    /// Purchase creation endpoint URL.
    pub purchase_endpoint: String,

    /// Document attachment endpoint URL.
    pub document_endpoint: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Fixed codes of the target accounting schema.
    pub schema: PurchaseSchema,
}

impl Default for AccountingConfig {
    fn default() -> Self {
        Self {
            supplier_id: String::new(),
            account_number: String::new(),
            api_key: String::new(),
            application_id: String::new(),
            purchase_endpoint: String::new(),
            document_endpoint: String::new(),
            timeout_secs: 30,
            schema: PurchaseSchema::default(),
        }
    }
}

/// Nominal codes and payment defaults for created purchases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseSchema {
    pub item_nominal_code: String,
    pub item_description: String,
    /// VAT rate in percent.
    pub vat_rate: u32,
    pub term_days: u32,
    pub bank_nominal_code: String,
    pub pay_method: String,
}

impl Default for PurchaseSchema {
    fn default() -> Self {
        Self {
            item_nominal_code: "7506".to_string(),
            item_description: "AWS Services".to_string(),
            vat_rate: 20,
            term_days: 0,
            bank_nominal_code: "1201".to_string(),
            pay_method: "DCARD".to_string(),
        }
    }
}

/// Archival copy destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Destination bucket.
    pub bucket: String,

    /// Key prefix; the key is `<prefix><filename>.pdf`.
    pub key_prefix: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            bucket: "awsreceipts2".to_string(),
            key_prefix: "invoices/".to_string(),
        }
    }
}

/// Rasterization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// `pdftoppm` executable for pages that are not a single scanned image.
    /// Empty disables rendering.
    pub renderer: PathBuf,

    /// Render resolution.
    pub dpi: u32,

    /// JPEG quality (1-100).
    pub jpeg_quality: u8,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            renderer: PathBuf::from("pdftoppm"),
            dpi: 200,
            jpeg_quality: 90,
        }
    }
}

impl ArchiveConfig {
    /// Archive key for an attachment filename.
    pub fn key_for(&self, filename: &str) -> String {
        format!("{}{}.pdf", self.key_prefix, filename)
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Read the deployment environment variables over the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from a key lookup, using the deployment variable names.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let set = |key: &str, target: &mut String| {
            if let Some(value) = lookup(key) {
                *target = value;
            }
        };

        set("EmailDomain", &mut config.email.allowed_domain);
        set("SupplierId", &mut config.accounting.supplier_id);
        set("AccNumber", &mut config.accounting.account_number);
        set("APIKey", &mut config.accounting.api_key);
        set("AppId", &mut config.accounting.application_id);
        set("PurchaseEndpoint", &mut config.accounting.purchase_endpoint);
        set("DocumentEndpoint", &mut config.accounting.document_endpoint);
        set("ArchiveBucket", &mut config.archive.bucket);

        config
    }

    /// Check that every externally supplied value is present.
    pub fn validate(&self) -> Result<(), LedgerMailError> {
        let required = [
            ("email.allowed_domain", &self.email.allowed_domain),
            ("accounting.supplier_id", &self.accounting.supplier_id),
            ("accounting.account_number", &self.accounting.account_number),
            ("accounting.api_key", &self.accounting.api_key),
            ("accounting.application_id", &self.accounting.application_id),
            ("accounting.purchase_endpoint", &self.accounting.purchase_endpoint),
            ("accounting.document_endpoint", &self.accounting.document_endpoint),
            ("archive.bucket", &self.archive.bucket),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LedgerMailError::Config(format!(
                "missing values: {}",
                missing.join(", ")
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_match_accounting_schema() {
        let config = PipelineConfig::default();
        assert_eq!(config.accounting.schema.vat_rate, 20);
        assert_eq!(config.accounting.schema.term_days, 0);
        assert_eq!(config.extraction.currency, "GBP");
        assert_eq!(
            config.email.attachment_selection,
            AttachmentSelection::FixedPosition { index: 1 }
        );
        assert_eq!(config.archive.key_for("march"), "invoices/march.pdf");
        assert_eq!(config.pdf.renderer, PathBuf::from("pdftoppm"));
        assert_eq!(config.pdf.dpi, 200);
    }

    #[test]
    fn test_email_defaults() {
        let email = EmailConfig::default();
        assert!(email.allowed_domain.is_empty());
        assert_eq!(email.attachment_selection, AttachmentSelection::FixedPosition { index: 1 });
    }

    #[test]
    fn test_from_lookup_reads_deployment_names() {
        let vars: HashMap<&str, &str> = [
            ("EmailDomain", "billing.example.com"),
            ("SupplierId", "42"),
            ("AccNumber", "6130000000"),
            ("APIKey", "secret"),
            ("AppId", "app-1"),
            ("PurchaseEndpoint", "https://acc.example/purchase"),
            ("DocumentEndpoint", "https://acc.example/document"),
        ]
        .into_iter()
        .collect();

        let config = PipelineConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(config.email.allowed_domain, "billing.example.com");
        assert_eq!(config.accounting.supplier_id, "42");
        assert_eq!(config.accounting.api_key, "secret");
        assert_eq!(config.archive.bucket, "awsreceipts2");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_lists_missing_values() {
        let err = PipelineConfig::default().validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("email.allowed_domain"));
        assert!(message.contains("accounting.api_key"));
        assert!(!message.contains("archive.bucket"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "email": {"allowed_domain": "example.com", "attachment_selection": {"mode": "last_candidate"}},
            "accounting": {"supplier_id": "7"}
        }"#;
        let config: PipelineConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.email.allowed_domain, "example.com");
        assert_eq!(
            config.email.attachment_selection,
            AttachmentSelection::LastCandidate
        );
        assert_eq!(config.accounting.supplier_id, "7");
        assert_eq!(config.accounting.timeout_secs, 30);
        assert_eq!(config.extraction.date_format, "%B %d, %Y");
    }
}
