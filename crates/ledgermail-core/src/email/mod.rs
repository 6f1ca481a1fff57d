//! Inbound email handling: sender allow-list and attachment extraction.

mod message;
mod sender;

pub use message::{EmailMessage, MimePart};
pub use sender::Sender;

use tracing::{debug, info, warn};

use crate::error::EmailError;
use crate::models::config::{AttachmentSelection, EmailConfig};

/// Result type for email operations.
pub type Result<T> = std::result::Result<T, EmailError>;

/// Attachment bytes lifted out of an email.
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Why an email was filtered out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The sender's domain is not the allowed one.
    SenderDomain { domain: String },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::SenderDomain { domain } => {
                write!(f, "sender domain {domain:?} is not allowed")
            }
        }
    }
}

/// Outcome of attachment extraction.
///
/// Rejection is a normal filtering result, distinct from the malformed-input
/// errors returned as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Accepted(Attachment),
    Rejected(RejectReason),
}

/// Extracts the invoice attachment from a raw email.
#[derive(Debug, Clone)]
pub struct AttachmentExtractor {
    allowed_domain: String,
    selection: AttachmentSelection,
}

impl AttachmentExtractor {
    /// Create an extractor from the email configuration.
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            allowed_domain: config.allowed_domain.clone(),
            selection: config.attachment_selection,
        }
    }

    /// Create an extractor for a domain with the default selection policy.
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            allowed_domain: domain.into(),
            selection: AttachmentSelection::default(),
        }
    }

    /// Set the attachment selection policy.
    pub fn with_selection(mut self, selection: AttachmentSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Check the sender and pull the attachment out of `raw`.
    pub fn extract(&self, raw: &[u8]) -> Result<Extraction> {
        let message = EmailMessage::parse(raw)?;

        let from = message.from_header.as_deref().unwrap_or_default();
        let sender = Sender::parse(from)?;

        if !sender.is_from(&self.allowed_domain) {
            info!(domain = %sender.domain, "Sender not allowed, skipping email");
            return Ok(Extraction::Rejected(RejectReason::SenderDomain {
                domain: sender.domain,
            }));
        }

        let last_candidate = message.attachment_candidates().last().ok_or_else(|| {
            EmailError::AttachmentNotFound("no part with a non-inline Content-Disposition".into())
        })?;

        let filename = last_candidate
            .filename
            .clone()
            .ok_or_else(|| EmailError::AttachmentNotFound("attachment has no filename".into()))?;

        let payload_part = match self.selection {
            AttachmentSelection::FixedPosition { index } => {
                let part = message.top_level_part(index).ok_or_else(|| {
                    EmailError::AttachmentNotFound(format!("no top-level part at index {index}"))
                })?;
                if !part.is_attachment_candidate() {
                    warn!(
                        index,
                        content_type = %part.content_type,
                        "Fixed-position payload part is not itself an attachment"
                    );
                }
                part
            }
            AttachmentSelection::LastCandidate => last_candidate,
        };

        debug!(
            content_type = %payload_part.content_type,
            depth = payload_part.depth,
            "Selected attachment payload"
        );
        info!(filename = %filename, size = payload_part.payload.len(), "Accepted attachment");

        Ok(Extraction::Accepted(Attachment {
            filename,
            content_type: payload_part.content_type.clone(),
            bytes: payload_part.payload.clone(),
        }))
    }
}
