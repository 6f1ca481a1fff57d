//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb};
use ledgermail_core::PipelineConfig;
use lopdf::{Document, Object, Stream, dictionary};
use serde_json::{Value, json};

pub const DOMAIN: &str = "billing.example.com";
pub const CHARGE_LABEL: &str = "Net Charges (After Credits/Discounts, excl. Tax)";

/// Single-page PDF whose page is one JPEG image, like a scanned invoice.
pub fn scanned_pdf() -> Vec<u8> {
    let pixels = ImageBuffer::from_pixel(16, 12, Rgb([240u8, 240, 240]));
    let mut jpeg = Vec::new();
    JpegEncoder::new(&mut jpeg).encode_image(&pixels).unwrap();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 16,
            "Height" => 12,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "DCTDecode",
        },
        jpeg,
    ));
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        b"q 160 0 0 120 0 0 cm /Im0 Do Q".to_vec(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
        "MediaBox" => vec![0.into(), 0.into(), 160.into(), 120.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Single-page PDF that only draws text, like a generated billing invoice.
pub fn text_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        format!("BT /F1 10 Tf 40 700 Td ({CHARGE_LABEL} GBP 123.45) Tj ET").into_bytes(),
    ));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        },
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// multipart/mixed email with a text body and one PDF attachment.
pub fn email_with_attachment(from: &str, filename: &str, pdf: &[u8]) -> String {
    let encoded = STANDARD.encode(pdf);
    let body: Vec<&str> = encoded
        .as_bytes()
        .chunks(76)
        .map(|chunk| std::str::from_utf8(chunk).unwrap())
        .collect();

    format!(
        "From: {from}\r\n\
To: invoices@example.org\r\n\
Subject: Your invoice is available\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"=_boundary\"\r\n\
\r\n\
--=_boundary\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
Your invoice is attached.\r\n\
--=_boundary\r\n\
Content-Type: application/pdf; name=\"{filename}\"\r\n\
Content-Disposition: attachment; filename=\"{filename}\"\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
{}\r\n\
--=_boundary--\r\n",
        body.join("\r\n")
    )
}

/// OCR expense response carrying one charge, invoice number and date.
pub fn expense_response(charge: &str, invoice_id: &str, date: &str) -> Value {
    json!({
        "DocumentMetadata": {"Pages": 1},
        "ExpenseDocuments": [{
            "ExpenseIndex": 1,
            "SummaryFields": [
                {
                    "Type": {"Text": "INVOICE_RECEIPT_ID"},
                    "LabelDetection": {"Text": "VAT Invoice Number:"},
                    "ValueDetection": {"Text": invoice_id}
                },
                {
                    "Type": {"Text": "INVOICE_RECEIPT_DATE"},
                    "LabelDetection": {"Text": "VAT Invoice Date:"},
                    "ValueDetection": {"Text": date}
                }
            ],
            "LineItemGroups": [{
                "LineItemGroupIndex": 1,
                "LineItems": [
                    {"LineItemExpenseFields": [{
                        "Type": {"Text": "EXPENSE_ROW"},
                        "ValueDetection": {"Text": "Charges 120.00 GBP"}
                    }]},
                    {"LineItemExpenseFields": [{
                        "Type": {"Text": "EXPENSE_ROW"},
                        "ValueDetection": {"Text": format!("{CHARGE_LABEL} {charge}")}
                    }]}
                ]
            }]
        }]
    })
}

/// Purchase creation response.
pub fn purchase_created(purchase_id: u64) -> Value {
    json!({
        "Purchase_Create": {
            "Header": {"MessageType": "Response", "SubmissionNumber": "x"},
            "Body": {"PurchaseID": purchase_id}
        }
    })
}

/// Pipeline configuration pointing at a mock server.
pub fn config(server_uri: &str, work_dir: &Path) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.email.allowed_domain = DOMAIN.to_string();
    config.accounting.supplier_id = "42".to_string();
    config.accounting.account_number = "6130000000".to_string();
    config.accounting.api_key = "test-api-key".to_string();
    config.accounting.application_id = "app-1".to_string();
    config.accounting.purchase_endpoint = format!("{server_uri}/purchase");
    config.accounting.document_endpoint = format!("{server_uri}/document");
    config.accounting.timeout_secs = 5;
    config.work_dir = Some(work_dir.to_path_buf());
    config
}
