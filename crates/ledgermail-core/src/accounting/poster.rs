//! Two-step posting: create the purchase, then attach the document to it.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::error::PostingError;
use crate::models::config::{AccountingConfig, PurchaseSchema};
use crate::models::invoice::InvoiceRecord;

use super::envelope::Credentials;
use super::requests::{DocumentRequest, PostableFields, PurchaseCreated, PurchaseRequest};
use super::Result;

/// Posts invoices to the accounting system.
///
/// The document call is only made once the purchase call has returned a
/// purchase id. A failed document call leaves an orphaned purchase, which is
/// reported as [`PostingError::DocumentAttach`] carrying that id.
#[derive(Debug, Clone)]
pub struct AccountingPoster {
    client: Client,
    credentials: Credentials,
    supplier_id: String,
    purchase_endpoint: String,
    document_endpoint: String,
    schema: PurchaseSchema,
}

impl AccountingPoster {
    /// Create a poster from the accounting configuration.
    pub fn new(config: &AccountingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            credentials: Credentials::from_config(config),
            supplier_id: config.supplier_id.clone(),
            purchase_endpoint: config.purchase_endpoint.clone(),
            document_endpoint: config.document_endpoint.clone(),
            schema: config.schema.clone(),
        })
    }

    /// Post `record` and its attachment. Returns the document response text.
    #[instrument(skip(self, record, attachment), fields(invoice_id = ?record.invoice_id))]
    pub async fn post(
        &self,
        record: &InvoiceRecord,
        filename: &str,
        attachment: &[u8],
    ) -> Result<String> {
        let fields = PostableFields::from_record(record)?;
        let purchase = PurchaseRequest::new(record, &self.supplier_id, &self.schema)?;

        let created = self.create_purchase(&purchase).await?;
        info!(purchase_id = created.purchase_id(), "Purchase created");

        let document = DocumentRequest::new(&created, filename, attachment, fields.receipt_date);
        match self.attach_document(&document).await {
            Ok(confirmation) => {
                info!(purchase_id = created.purchase_id(), "Document attached");
                Ok(confirmation)
            }
            Err(reason) => {
                error!(
                    purchase_id = created.purchase_id(),
                    %reason,
                    "Document attach failed, purchase left without document"
                );
                Err(PostingError::DocumentAttach {
                    purchase_id: created.purchase_id().to_string(),
                    reason,
                })
            }
        }
    }

    async fn create_purchase(&self, request: &PurchaseRequest) -> Result<PurchaseCreated> {
        let (status, text) = self.submit(&self.purchase_endpoint, request).await?;

        if !status.is_success() {
            return Err(PostingError::PurchaseCreation(format!(
                "endpoint returned {status}: {text}"
            )));
        }

        PurchaseCreated::from_response(&text)
    }

    async fn attach_document(&self, request: &DocumentRequest) -> std::result::Result<String, String> {
        let (status, text) = self
            .submit(&self.document_endpoint, request)
            .await
            .map_err(|e| e.to_string())?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(format!("endpoint returned {status}: {text}"))
        }
    }

    async fn submit<B: Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<(reqwest::StatusCode, String)> {
        let envelope = self.credentials.envelope(body);
        debug!(url, submission = envelope.submission_number(), "Sending submission");

        let response = self.client.post(url).json(&envelope).send().await?;
        let status = response.status();
        let text = response.text().await?;

        debug!(url, %status, "Submission answered");
        Ok((status, text))
    }
}
