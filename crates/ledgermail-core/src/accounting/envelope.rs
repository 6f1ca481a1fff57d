//! Submission envelope and request signing.
//!
//! Every outbound call is its own submission: it gets a fresh UUID v4 and a
//! digest of `account_number + api_key + submission_id`. The key itself never
//! leaves the process.

use md5::{Digest, Md5};
use serde::Serialize;
use uuid::Uuid;

use crate::models::config::AccountingConfig;

const MESSAGE_TYPE: &str = "Request";

/// Account credentials used to sign submissions.
#[derive(Clone)]
pub struct Credentials {
    account_number: String,
    api_key: String,
    application_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("account_number", &self.account_number)
            .field("api_key", &"<redacted>")
            .field("application_id", &self.application_id)
            .finish()
    }
}

impl Credentials {
    pub fn new(
        account_number: impl Into<String>,
        api_key: impl Into<String>,
        application_id: impl Into<String>,
    ) -> Self {
        Self {
            account_number: account_number.into(),
            api_key: api_key.into(),
            application_id: application_id.into(),
        }
    }

    pub fn from_config(config: &AccountingConfig) -> Self {
        Self::new(
            &config.account_number,
            &config.api_key,
            &config.application_id,
        )
    }

    /// Lowercase hex MD5 of `account_number + api_key + submission_id`.
    pub fn sign(&self, submission_id: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(self.account_number.as_bytes());
        hasher.update(self.api_key.as_bytes());
        hasher.update(submission_id.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Wrap `body` in a freshly numbered, signed envelope.
    pub fn envelope<'a, B: Serialize>(&'a self, body: &'a B) -> Envelope<'a, B> {
        self.envelope_with_id(Uuid::new_v4().to_string(), body)
    }

    /// Wrap `body` using a caller-chosen submission id.
    pub fn envelope_with_id<'a, B: Serialize>(
        &'a self,
        submission_id: String,
        body: &'a B,
    ) -> Envelope<'a, B> {
        let md5_value = self.sign(&submission_id);
        Envelope {
            payload: EnvelopePayload {
                header: Header {
                    message_type: MESSAGE_TYPE,
                    submission_number: submission_id,
                    authentication: Authentication {
                        acc_number: &self.account_number,
                        md5_value,
                        application_id: &self.application_id,
                    },
                },
                body,
            },
        }
    }
}

/// `{"payload": {"Header": ..., "Body": ...}}`
#[derive(Debug, Serialize)]
pub struct Envelope<'a, B> {
    payload: EnvelopePayload<'a, B>,
}

impl<B> Envelope<'_, B> {
    pub fn submission_number(&self) -> &str {
        &self.payload.header.submission_number
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct EnvelopePayload<'a, B> {
    header: Header<'a>,
    body: &'a B,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Header<'a> {
    message_type: &'static str,
    submission_number: String,
    authentication: Authentication<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct Authentication<'a> {
    acc_number: &'a str,
    #[serde(rename = "MD5Value")]
    md5_value: String,
    #[serde(rename = "ApplicationID")]
    application_id: &'a str,
}
