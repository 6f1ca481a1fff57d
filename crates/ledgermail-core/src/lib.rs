//! Core library for emailed-invoice ingestion.
//!
//! This crate provides:
//! - Attachment extraction from raw emails, with a sender domain allow-list
//! - First-page rasterization of the attached PDF
//! - OCR expense response parsing into a normalized invoice record
//! - Posting to the accounting system (purchase, then document)
//! - A pipeline that runs the above for one stored email

pub mod accounting;
pub mod email;
pub mod error;
pub mod expense;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod storage;

pub use accounting::AccountingPoster;
pub use email::{Attachment, AttachmentExtractor, Extraction, RejectReason};
pub use error::{LedgerMailError, Result};
pub use expense::{ExpenseFieldParser, ExpenseParser};
pub use models::config::PipelineConfig;
pub use models::event::{InvocationResponse, StorageEvent};
pub use models::expense::ExpenseResponse;
pub use models::invoice::InvoiceRecord;
pub use ocr::{ExpenseAnalyzer, HttpExpenseAnalyzer, ReplayAnalyzer};
pub use pdf::{PageRasterizer, PdfRasterizer, PopplerRenderer};
pub use pipeline::{PipelineOrchestrator, PipelineOutcome};
pub use storage::{LocalObjectStore, ObjectStore};
#[cfg(feature = "s3")]
pub use storage::S3ObjectStore;
