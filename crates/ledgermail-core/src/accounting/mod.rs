//! Accounting system client.
//!
//! Every request is wrapped in a signed submission envelope
//! ([`envelope`]); [`AccountingPoster`] sequences the purchase and document
//! calls.

pub mod envelope;
mod poster;
pub mod requests;

pub use envelope::Credentials;
pub use poster::AccountingPoster;
pub use requests::{amount_paid, DocumentRequest, PurchaseCreated, PurchaseRequest};

use crate::error::PostingError;

/// Result type for posting operations.
pub type Result<T> = std::result::Result<T, PostingError>;
