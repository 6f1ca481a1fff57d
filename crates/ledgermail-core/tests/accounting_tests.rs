//! Integration tests for the accounting poster using WireMock.

mod common;

use std::str::FromStr;

use chrono::NaiveDate;
use ledgermail_core::accounting::{AccountingPoster, Credentials};
use ledgermail_core::error::PostingError;
use ledgermail_core::models::config::AccountingConfig;
use ledgermail_core::InvoiceRecord;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn record() -> InvoiceRecord {
    InvoiceRecord {
        invoice_id: Some("INV-001".to_string()),
        net_charge: Some(Decimal::from_str("100.00").unwrap()),
        currency: "GBP".to_string(),
        receipt_date: NaiveDate::from_ymd_opt(2024, 3, 4),
    }
}

fn accounting_config(server: &MockServer) -> AccountingConfig {
    let dir = std::env::temp_dir();
    common::config(&server.uri(), &dir).accounting
}

async fn mount_purchase(server: &MockServer, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/purchase"))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

async fn mount_document(server: &MockServer, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/document"))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

async fn request_bodies(server: &MockServer) -> Vec<(String, Value)> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| (r.url.path().to_string(), r.body_json::<Value>().unwrap()))
        .collect()
}

mod post_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn purchase_then_document() {
        let server = MockServer::start().await;
        mount_purchase(
            &server,
            ResponseTemplate::new(200).set_body_json(common::purchase_created(981)),
            1,
        )
        .await;
        mount_document(
            &server,
            ResponseTemplate::new(200).set_body_string(r#"{"Document_Upload": "ok"}"#),
            1,
        )
        .await;

        let poster = AccountingPoster::new(&accounting_config(&server)).unwrap();
        let confirmation = poster
            .post(&record(), "march.pdf", b"%PDF-1.4\n")
            .await
            .unwrap();
        assert_eq!(confirmation, r#"{"Document_Upload": "ok"}"#);

        let requests = request_bodies(&server).await;
        let paths: Vec<&str> = requests.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(paths, vec!["/purchase", "/document"]);

        let purchase = &requests[0].1["payload"]["Body"]["PurchaseData"];
        assert_eq!(purchase["SupplierID"], "42");
        assert_eq!(purchase["SupplierReference"], "INV-001");
        assert_eq!(purchase["InvoiceLines"]["ItemLine"]["SubTotal"], "100.00");
        assert_eq!(purchase["PaymentData"]["AmountPaid"], "120.0");

        let document = &requests[1].1["payload"]["Body"]["DocumentDetails"];
        assert_eq!(
            document,
            &json!({
                "FileName": "march.pdf",
                "EmbeddedFileBinaryObject": "JVBERi0xLjQK",
                "Type": {
                    "Receipt": {
                        "PurchaseId": "981",
                        "CaptureDateTime": "2024-03-04T00:00:00Z",
                        "ReceiptName": "march.pdf"
                    }
                }
            })
        );
    }

    #[tokio::test]
    async fn each_call_is_separately_signed() {
        let server = MockServer::start().await;
        mount_purchase(
            &server,
            ResponseTemplate::new(200).set_body_json(common::purchase_created(1)),
            1,
        )
        .await;
        mount_document(&server, ResponseTemplate::new(200), 1).await;

        let config = accounting_config(&server);
        AccountingPoster::new(&config)
            .unwrap()
            .post(&record(), "march.pdf", b"pdf")
            .await
            .unwrap();

        let credentials = Credentials::from_config(&config);
        let headers: Vec<Value> = request_bodies(&server)
            .await
            .into_iter()
            .map(|(_, body)| body["payload"]["Header"].clone())
            .collect();
        assert_eq!(headers.len(), 2);

        for header in &headers {
            let submission = header["SubmissionNumber"].as_str().unwrap();
            assert_eq!(header["MessageType"], "Request");
            assert_eq!(header["Authentication"]["AccNumber"], "6130000000");
            assert_eq!(header["Authentication"]["ApplicationID"], "app-1");
            assert_eq!(
                header["Authentication"]["MD5Value"],
                credentials.sign(submission)
            );
        }
        assert_ne!(headers[0]["SubmissionNumber"], headers[1]["SubmissionNumber"]);
        assert_ne!(
            headers[0]["Authentication"]["MD5Value"],
            headers[1]["Authentication"]["MD5Value"]
        );

        // The key is only ever sent hashed.
        for (_, body) in request_bodies(&server).await {
            assert!(!body.to_string().contains("test-api-key"));
        }
    }
}

mod failure_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn no_document_without_purchase_id() {
        let server = MockServer::start().await;
        mount_purchase(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({"Errors": {"Error": "Invalid MD5"}})),
            1,
        )
        .await;
        mount_document(&server, ResponseTemplate::new(200), 0).await;

        let result = AccountingPoster::new(&accounting_config(&server))
            .unwrap()
            .post(&record(), "march.pdf", b"pdf")
            .await;

        assert!(matches!(result, Err(PostingError::PurchaseCreation(_))));
    }

    #[tokio::test]
    async fn purchase_endpoint_error_status() {
        let server = MockServer::start().await;
        mount_purchase(
            &server,
            ResponseTemplate::new(500).set_body_json(common::purchase_created(5)),
            1,
        )
        .await;
        mount_document(&server, ResponseTemplate::new(200), 0).await;

        let result = AccountingPoster::new(&accounting_config(&server))
            .unwrap()
            .post(&record(), "march.pdf", b"pdf")
            .await;

        assert!(matches!(result, Err(PostingError::PurchaseCreation(_))));
    }

    #[tokio::test]
    async fn unreachable_purchase_endpoint() {
        let config = AccountingConfig {
            purchase_endpoint: "http://127.0.0.1:1/purchase".to_string(),
            document_endpoint: "http://127.0.0.1:1/document".to_string(),
            timeout_secs: 2,
            ..AccountingConfig::default()
        };

        let result = AccountingPoster::new(&config)
            .unwrap()
            .post(&record(), "march.pdf", b"pdf")
            .await;

        assert!(matches!(result, Err(PostingError::Transport(_))));
    }

    #[tokio::test]
    async fn document_failure_reports_orphaned_purchase() {
        let server = MockServer::start().await;
        mount_purchase(
            &server,
            ResponseTemplate::new(200).set_body_json(common::purchase_created(981)),
            1,
        )
        .await;
        mount_document(&server, ResponseTemplate::new(503), 1).await;

        let result = AccountingPoster::new(&accounting_config(&server))
            .unwrap()
            .post(&record(), "march.pdf", b"pdf")
            .await;

        match result {
            Err(PostingError::DocumentAttach { purchase_id, .. }) => assert_eq!(purchase_id, "981"),
            other => panic!("expected DocumentAttach, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn incomplete_record_sends_nothing() {
        let server = MockServer::start().await;
        mount_purchase(&server, ResponseTemplate::new(200), 0).await;
        mount_document(&server, ResponseTemplate::new(200), 0).await;

        let mut record = record();
        record.receipt_date = None;

        let result = AccountingPoster::new(&accounting_config(&server))
            .unwrap()
            .post(&record, "march.pdf", b"pdf")
            .await;

        assert!(matches!(
            result,
            Err(PostingError::IncompleteRecord("receipt_date"))
        ));
        assert!(request_bodies(&server).await.is_empty());
    }

    #[tokio::test]
    async fn out_of_range_charge_sends_nothing() {
        use ledgermail_core::models::config::ExtractionConfig;
        use ledgermail_core::{ExpenseFieldParser, ExpenseParser};

        let server = MockServer::start().await;
        mount_purchase(&server, ResponseTemplate::new(200), 0).await;
        mount_document(&server, ResponseTemplate::new(200), 0).await;

        let response = common::expense_response(
            "GBP 79228162514264337593543950335",
            "INV-001",
            "March 04, 2024",
        );
        let record = ExpenseFieldParser::new(ExtractionConfig::default())
            .parse_json(&response.to_string())
            .unwrap();
        assert_eq!(record.net_charge, Some(Decimal::MAX));

        let result = AccountingPoster::new(&accounting_config(&server))
            .unwrap()
            .post(&record, "march.pdf", b"pdf")
            .await;

        assert!(matches!(
            result,
            Err(PostingError::AmountOutOfRange { .. })
        ));
        assert!(request_bodies(&server).await.is_empty());
    }
}
