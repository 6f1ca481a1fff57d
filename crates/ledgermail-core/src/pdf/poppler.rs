//! Full page rendering through poppler's `pdftoppm`.
//!
//! Text invoices have no page image to lift out, so the page is rendered the
//! way a viewer would draw it.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, error, instrument};

use super::{PageRasterizer, Result};
use crate::error::PdfError;

/// Renders the first page with an external `pdftoppm` executable.
#[derive(Debug, Clone)]
pub struct PopplerRenderer {
    executable: PathBuf,
    dpi: u32,
    jpeg_quality: u8,
}

impl PopplerRenderer {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            dpi: 200,
            jpeg_quality: 90,
        }
    }

    /// Set the render resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi.max(1);
        self
    }

    /// Set the JPEG quality (1-100).
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Whether the executable can be started.
    pub fn is_available(&self) -> bool {
        Command::new(&self.executable)
            .arg("-v")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok()
    }
}

impl Default for PopplerRenderer {
    fn default() -> Self {
        Self::new("pdftoppm")
    }
}

impl PageRasterizer for PopplerRenderer {
    #[instrument(skip(self, pdf), fields(size = pdf.len()))]
    fn first_page_jpeg(&self, pdf: &[u8]) -> Result<Vec<u8>> {
        let render_err = |what: &str, e: std::io::Error| PdfError::Render(format!("{what}: {e}"));

        let mut input = tempfile::Builder::new()
            .prefix("render-")
            .suffix(".pdf")
            .tempfile()
            .map_err(|e| render_err("failed to create temp file", e))?;
        input
            .write_all(pdf)
            .and_then(|()| input.flush())
            .map_err(|e| render_err("failed to write temp file", e))?;

        let output_dir = tempfile::tempdir().map_err(|e| render_err("failed to create temp dir", e))?;
        let prefix = output_dir.path().join("page");

        let mut cmd = Command::new(&self.executable);
        cmd.arg("-jpeg")
            .arg("-jpegopt")
            .arg(format!("quality={}", self.jpeg_quality))
            .arg("-r")
            .arg(self.dpi.to_string())
            .args(["-f", "1", "-l", "1", "-singlefile"])
            .arg(input.path())
            .arg(&prefix)
            .stdin(Stdio::null());

        debug!("Running pdftoppm: {:?}", cmd);

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PdfError::Render(format!(
                    "pdftoppm not found at '{}'. Please install poppler-utils.",
                    self.executable.display()
                ))
            } else {
                render_err("failed to run pdftoppm", e)
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            error!("pdftoppm failed: {}", stderr);
            return Err(PdfError::Render(format!(
                "pdftoppm exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let jpeg = std::fs::read(prefix.with_extension("jpg"))
            .map_err(|e| render_err("failed to read pdftoppm output", e))?;

        if jpeg.is_empty() {
            return Err(PdfError::Render("pdftoppm produced empty output".to_string()));
        }

        Ok(jpeg)
    }
}
