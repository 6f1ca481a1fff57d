//! Error types for the ledgermail-core library.

use thiserror::Error;

/// Main error type for the ledgermail library.
#[derive(Error, Debug)]
pub enum LedgerMailError {
    /// Email parsing or attachment selection error.
    #[error("email error: {0}")]
    Email(#[from] EmailError),

    /// OCR response interpretation error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Accounting system posting error.
    #[error("posting error: {0}")]
    Posting(#[from] PostingError),

    /// Object storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// PDF rasterization error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR service error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The inbound trigger event could not be interpreted.
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to the inbound email.
#[derive(Error, Debug)]
pub enum EmailError {
    /// The stored object is not valid UTF-8 text.
    #[error("email is not valid UTF-8")]
    InvalidUtf8,

    /// The bytes could not be parsed as a MIME message.
    #[error("failed to parse MIME message: {0}")]
    Parse(String),

    /// The From header carries no bracketed address.
    #[error("malformed sender: {0:?}")]
    MalformedSender(String),

    /// No part of the message qualifies as the attachment.
    #[error("attachment not found: {0}")]
    AttachmentNotFound(String),
}

/// Errors related to expense field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The invoice date did not match the expected format.
    #[error("failed to parse date {value:?} with format {format:?}")]
    DateParse { value: String, format: String },

    /// The OCR response was not valid JSON of the expected shape.
    #[error("invalid OCR response: {0}")]
    Json(String),
}

/// Errors related to the accounting system protocol.
#[derive(Error, Debug)]
pub enum PostingError {
    /// The record lacks a field the purchase body requires.
    #[error("invoice record is missing {0}")]
    IncompleteRecord(&'static str),

    /// The accounting endpoint could not be reached.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The purchase could not be created or its id was absent.
    #[error("purchase creation failed: {0}")]
    PurchaseCreation(String),

    /// The gross amount could not be computed from the net charge.
    #[error("amount out of range: net charge {net} at {vat_rate}% VAT")]
    AmountOutOfRange { net: String, vat_rate: u32 },

    /// The document could not be attached to an existing purchase.
    #[error("document attach failed for purchase {purchase_id}: {reason}")]
    DocumentAttach { purchase_id: String, reason: String },
}

/// Errors related to object storage.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The object does not exist.
    #[error("object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// The archival copy of the attachment could not be written.
    #[error("archival upload of {key} failed: {reason}")]
    ArchivalUpload { key: String, reason: String },

    /// The key would resolve outside the store.
    #[error("invalid object key: {0}")]
    InvalidKey(String),

    /// Local filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Remote storage backend error.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors related to PDF rasterization.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// No decodable image was found on the page.
    #[error("no image found on page {0}")]
    NoImage(u32),

    /// The external page renderer failed or is not installed.
    #[error("page rendering failed: {0}")]
    Render(String),

    /// The page image could not be re-encoded.
    #[error("failed to encode page image: {0}")]
    Encode(String),
}

/// Errors related to the OCR service.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The OCR endpoint could not be reached.
    #[error("OCR request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The OCR service answered with an error or an unexpected body.
    #[error("unexpected OCR response: {0}")]
    Response(String),

    /// A recorded response could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the ledgermail library.
pub type Result<T> = std::result::Result<T, LedgerMailError>;
