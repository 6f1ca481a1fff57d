//! Inbound storage-notification event and the invocation response.

use serde::{Deserialize, Serialize};

use crate::error::LedgerMailError;

/// Object-created notification carrying one or more records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct S3Entity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketRef {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectRef {
    pub key: String,
}

/// Location of the raw email object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl StorageEvent {
    /// Build a single-record event.
    pub fn single(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            records: vec![EventRecord {
                s3: S3Entity {
                    bucket: BucketRef { name: bucket.into() },
                    object: ObjectRef { key: key.into() },
                },
            }],
        }
    }

    /// Location named by the first record. Further records are ignored.
    ///
    /// Object keys arrive URL-encoded (`+` for space), so they are decoded here.
    pub fn first_location(&self) -> Result<ObjectLocation, LedgerMailError> {
        let record = self
            .records
            .first()
            .ok_or_else(|| LedgerMailError::InvalidEvent("event has no records".to_string()))?;

        let raw_key = record.s3.object.key.replace('+', " ");
        let key = urlencoding::decode(&raw_key)
            .map_err(|e| LedgerMailError::InvalidEvent(format!("undecodable key: {e}")))?
            .into_owned();

        Ok(ObjectLocation {
            bucket: record.s3.bucket.name.clone(),
            key,
        })
    }
}

/// Synchronous result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    /// Success with an empty JSON array body.
    pub fn ok() -> Self {
        Self {
            status_code: 200,
            body: "[]".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_record_is_used() {
        let json = r#"{"Records": [
            {"s3": {"bucket": {"name": "inbox"}, "object": {"key": "mail/one"}}},
            {"s3": {"bucket": {"name": "other"}, "object": {"key": "mail/two"}}}
        ]}"#;
        let event: StorageEvent = serde_json::from_str(json).unwrap();
        let location = event.first_location().unwrap();
        assert_eq!(location.bucket, "inbox");
        assert_eq!(location.key, "mail/one");
    }

    #[test]
    fn test_key_is_url_decoded() {
        let event = StorageEvent::single("inbox", "mail/March+invoice%3A1");
        assert_eq!(event.first_location().unwrap().key, "mail/March invoice:1");
    }

    #[test]
    fn test_empty_event_is_invalid() {
        let event = StorageEvent::default();
        assert!(matches!(
            event.first_location(),
            Err(LedgerMailError::InvalidEvent(_))
        ));
    }

    #[test]
    fn test_ok_response_shape() {
        let json = serde_json::to_value(InvocationResponse::ok()).unwrap();
        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["body"], "[]");
    }
}
