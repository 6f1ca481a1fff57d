//! PDF processing module.

mod poppler;
mod rasterizer;

pub use poppler::PopplerRenderer;
pub use rasterizer::PdfRasterizer;

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for turning a PDF into the image sent to OCR.
pub trait PageRasterizer: Send + Sync {
    /// Render the first page as JPEG bytes.
    fn first_page_jpeg(&self, pdf: &[u8]) -> Result<Vec<u8>>;
}
