//! OCR expense analysis.
//!
//! The OCR service is opaque: any provider that turns a page image into the
//! [`ExpenseResponse`] shape can stand behind [`ExpenseAnalyzer`].

mod http;
mod replay;

pub use http::HttpExpenseAnalyzer;
pub use replay::ReplayAnalyzer;

use async_trait::async_trait;

use crate::error::OcrError;
use crate::models::expense::ExpenseResponse;

/// Result type for OCR operations.
pub type Result<T> = std::result::Result<T, OcrError>;

/// Trait for OCR expense analysis backends.
#[async_trait]
pub trait ExpenseAnalyzer: Send + Sync {
    /// Analyze a JPEG page image.
    async fn analyze(&self, jpeg: &[u8]) -> Result<ExpenseResponse>;
}

fn decode_response(text: &str) -> Result<ExpenseResponse> {
    ExpenseResponse::from_json(text).map_err(|e| OcrError::Response(e.to_string()))
}
