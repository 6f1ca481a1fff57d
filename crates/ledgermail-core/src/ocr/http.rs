//! OCR backend reached over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};

use super::{decode_response, ExpenseAnalyzer, Result};
use crate::error::OcrError;
use crate::models::expense::ExpenseResponse;

/// Posts the page image to an endpoint that answers with an expense response.
#[derive(Debug, Clone)]
pub struct HttpExpenseAnalyzer {
    client: Client,
    endpoint: String,
}

impl HttpExpenseAnalyzer {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl ExpenseAnalyzer for HttpExpenseAnalyzer {
    #[instrument(skip(self, jpeg), fields(endpoint = %self.endpoint, size = jpeg.len()))]
    async fn analyze(&self, jpeg: &[u8]) -> Result<ExpenseResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "image/jpeg")
            .body(jpeg.to_vec())
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        debug!(%status, len = text.len(), "OCR answered");

        if !status.is_success() {
            return Err(OcrError::Response(format!("endpoint returned {status}")));
        }

        decode_response(&text)
    }
}
