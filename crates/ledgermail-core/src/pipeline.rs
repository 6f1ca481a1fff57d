//! End-to-end processing of one stored email.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::accounting::AccountingPoster;
use crate::email::{Attachment, AttachmentExtractor, Extraction, RejectReason};
use crate::error::{EmailError, Result};
use crate::expense::{ExpenseFieldParser, ExpenseParser};
use crate::models::config::PipelineConfig;
use crate::models::event::{InvocationResponse, StorageEvent};
use crate::models::invoice::InvoiceRecord;
use crate::ocr::ExpenseAnalyzer;
use crate::pdf::PageRasterizer;
use crate::storage::ObjectStore;

/// What one invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The email was filtered out; nothing was posted.
    Skipped(RejectReason),

    /// The invoice was posted and its document attached.
    Posted {
        record: InvoiceRecord,
        confirmation: String,
    },
}

impl PipelineOutcome {
    /// Response returned to the trigger. Identical for both outcomes.
    pub fn response(&self) -> InvocationResponse {
        InvocationResponse::ok()
    }
}

/// Sequences extraction, archival, OCR, parsing and posting.
pub struct PipelineOrchestrator {
    config: PipelineConfig,
    store: Arc<dyn ObjectStore>,
    rasterizer: Arc<dyn PageRasterizer>,
    analyzer: Arc<dyn ExpenseAnalyzer>,
    extractor: AttachmentExtractor,
    parser: ExpenseFieldParser,
    poster: AccountingPoster,
}

impl PipelineOrchestrator {
    /// Build the pipeline. Every component is configured from `config` here.
    pub fn new(
        config: PipelineConfig,
        store: Arc<dyn ObjectStore>,
        rasterizer: Arc<dyn PageRasterizer>,
        analyzer: Arc<dyn ExpenseAnalyzer>,
    ) -> Result<Self> {
        Ok(Self {
            extractor: AttachmentExtractor::new(&config.email),
            parser: ExpenseFieldParser::new(config.extraction.clone()),
            poster: AccountingPoster::new(&config.accounting)?,
            config,
            store,
            rasterizer,
            analyzer,
        })
    }

    /// Handle a storage notification: fetch the email it names and process it.
    #[instrument(skip(self, event))]
    pub async fn handle_event(&self, event: &StorageEvent) -> Result<PipelineOutcome> {
        let location = event.first_location()?;
        info!(bucket = %location.bucket, key = %location.key, "Processing stored email");

        let raw = self.store.fetch(&location.bucket, &location.key).await?;
        self.process_email(&raw).await
    }

    /// Process one raw email.
    pub async fn process_email(&self, raw: &[u8]) -> Result<PipelineOutcome> {
        let text = std::str::from_utf8(raw).map_err(|_| EmailError::InvalidUtf8)?;

        let attachment = match self.extractor.extract(text.as_bytes())? {
            Extraction::Accepted(attachment) => attachment,
            Extraction::Rejected(reason) => {
                info!(%reason, "Email skipped");
                return Ok(PipelineOutcome::Skipped(reason));
            }
        };

        let temp = self.temp_file()?;
        tokio::fs::write(temp.path(), &attachment.bytes).await?;
        debug!(path = %temp.path().display(), "Wrote attachment to temp file");

        let result = self.process_attachment(&attachment, temp.path()).await;

        match temp.close() {
            Ok(()) => debug!("Removed temp attachment"),
            Err(e) => warn!(error = %e, "Failed to remove temp attachment"),
        }

        result
    }

    async fn process_attachment(
        &self,
        attachment: &Attachment,
        path: &Path,
    ) -> Result<PipelineOutcome> {
        let key = self.config.archive.key_for(&attachment.filename);
        self.store
            .upload(&self.config.archive.bucket, &key, path)
            .await?;

        let jpeg = self.rasterizer.first_page_jpeg(&attachment.bytes)?;
        let response = self.analyzer.analyze(&jpeg).await?;
        let record = self.parser.parse(&response)?;

        let confirmation = self
            .poster
            .post(&record, &attachment.filename, &attachment.bytes)
            .await?;

        info!(invoice_id = ?record.invoice_id, "Invoice posted");
        Ok(PipelineOutcome::Posted {
            record,
            confirmation,
        })
    }

    fn temp_file(&self) -> Result<tempfile::NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("invoice-").suffix(".pdf");
        let file = match &self.config.work_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{LedgerMailError, PdfError};
    use crate::models::expense::ExpenseResponse;
    use crate::ocr::ReplayAnalyzer;
    use crate::storage::LocalObjectStore;

    struct FailingRasterizer;

    impl PageRasterizer for FailingRasterizer {
        fn first_page_jpeg(&self, _pdf: &[u8]) -> crate::pdf::Result<Vec<u8>> {
            Err(PdfError::NoPages)
        }
    }

    const EMAIL: &str = "From: Billing <billing@example.com>\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"b\"\r\n\
\r\n\
--b\r\n\
Content-Type: text/plain\r\n\
\r\n\
Invoice attached.\r\n\
--b\r\n\
Content-Type: application/pdf\r\n\
Content-Disposition: attachment; filename=\"march\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
JVBERi0xLjQK\r\n\
--b--\r\n";

    fn pipeline(root: &Path, work: &Path, domain: &str) -> PipelineOrchestrator {
        let mut config = PipelineConfig::default();
        config.email.allowed_domain = domain.to_string();
        config.work_dir = Some(work.to_path_buf());
        PipelineOrchestrator::new(
            config,
            Arc::new(LocalObjectStore::new(root)),
            Arc::new(FailingRasterizer),
            Arc::new(ReplayAnalyzer::new(ExpenseResponse::default())),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_rejected_sender_is_skipped() {
        let root = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let outcome = pipeline(root.path(), work.path(), "other.org")
            .process_email(EMAIL.as_bytes())
            .await
            .unwrap();

        assert!(matches!(outcome, PipelineOutcome::Skipped(_)));
        assert_eq!(outcome.response(), InvocationResponse::ok());
        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_non_utf8_email() {
        let root = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let result = pipeline(root.path(), work.path(), "example.com")
            .process_email(&[0xff, 0xfe, 0x00])
            .await;
        assert!(matches!(
            result,
            Err(LedgerMailError::Email(EmailError::InvalidUtf8))
        ));
    }

    #[tokio::test]
    async fn test_temp_file_removed_on_failure() {
        let root = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let result = pipeline(root.path(), work.path(), "example.com")
            .process_email(EMAIL.as_bytes())
            .await;

        assert!(matches!(result, Err(LedgerMailError::Pdf(PdfError::NoPages))));
        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);

        // Archived before rasterization.
        let archived = root.path().join("awsreceipts2/invoices/march.pdf");
        assert_eq!(std::fs::read(archived).unwrap(), b"%PDF-1.4\n");
    }

    #[tokio::test]
    async fn test_event_for_missing_object() {
        let root = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();
        let result = pipeline(root.path(), work.path(), "example.com")
            .handle_event(&StorageEvent::single("inbox", "nothing"))
            .await;
        assert!(matches!(result, Err(LedgerMailError::Storage(_))));
    }
}
