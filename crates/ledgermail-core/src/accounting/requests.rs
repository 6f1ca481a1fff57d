//! Purchase and document request bodies.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use crate::error::PostingError;
use crate::models::config::PurchaseSchema;
use crate::models::invoice::InvoiceRecord;

/// Fields of an [`InvoiceRecord`] that posting cannot do without.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostableFields {
    pub net_charge: Decimal,
    pub receipt_date: NaiveDate,
}

impl PostableFields {
    pub fn from_record(record: &InvoiceRecord) -> Result<Self, PostingError> {
        Ok(Self {
            net_charge: record
                .net_charge
                .ok_or(PostingError::IncompleteRecord("net_charge"))?,
            receipt_date: record
                .receipt_date
                .ok_or(PostingError::IncompleteRecord("receipt_date"))?,
        })
    }
}

/// Body of the purchase-creation call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PurchaseRequest {
    pub purchase_data: PurchaseData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PurchaseData {
    #[serde(rename = "SupplierID")]
    pub supplier_id: String,
    pub receipt_date: String,
    pub term_days: String,
    pub supplier_reference: Option<String>,
    pub currency: String,
    pub invoice_lines: InvoiceLines,
    pub payment_data: PaymentData,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceLines {
    pub item_line: ItemLine,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemLine {
    pub item_nominal_code: String,
    pub item_description: String,
    pub sub_total: String,
    pub vat_rate: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PaymentData {
    pub paid_date: String,
    pub bank_nominal_code: String,
    pub pay_method: String,
    pub amount_paid: String,
}

impl PurchaseRequest {
    /// Build the purchase body. Fails before any I/O if the record is incomplete.
    pub fn new(
        record: &InvoiceRecord,
        supplier_id: &str,
        schema: &PurchaseSchema,
    ) -> Result<Self, PostingError> {
        let fields = PostableFields::from_record(record)?;
        let date = fields.receipt_date.format("%Y-%m-%d").to_string();
        let paid = amount_paid(fields.net_charge, schema.vat_rate)?;

        Ok(Self {
            purchase_data: PurchaseData {
                supplier_id: supplier_id.to_string(),
                receipt_date: date.clone(),
                term_days: schema.term_days.to_string(),
                supplier_reference: record.invoice_id.clone(),
                currency: record.currency.clone(),
                invoice_lines: InvoiceLines {
                    item_line: ItemLine {
                        item_nominal_code: schema.item_nominal_code.clone(),
                        item_description: schema.item_description.clone(),
                        sub_total: fields.net_charge.to_string(),
                        vat_rate: schema.vat_rate.to_string(),
                    },
                },
                payment_data: PaymentData {
                    paid_date: date,
                    bank_nominal_code: schema.bank_nominal_code.clone(),
                    pay_method: schema.pay_method.clone(),
                    amount_paid: paid,
                },
            },
        })
    }
}

/// Net charge grossed up by `vat_rate` percent, with at least one fractional digit.
///
/// The net charge comes from OCR text, so out-of-range values are an error
/// rather than an arithmetic overflow.
pub fn amount_paid(net: Decimal, vat_rate: u32) -> Result<String, PostingError> {
    let gross = Decimal::ONE_HUNDRED
        .checked_add(Decimal::from(vat_rate))
        .and_then(|factor| net.checked_mul(factor))
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(|| PostingError::AmountOutOfRange {
            net: net.to_string(),
            vat_rate,
        })?
        .normalize();

    if gross.scale() == 0 {
        Ok(format!("{gross}.0"))
    } else {
        Ok(gross.to_string())
    }
}

/// A purchase the accounting system has accepted.
///
/// Only obtainable from a successful creation response, so a document
/// request cannot be built without one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseCreated {
    purchase_id: String,
}

impl PurchaseCreated {
    /// Read `Purchase_Create.Body.PurchaseID` from a creation response.
    pub fn from_response(text: &str) -> Result<Self, PostingError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| PostingError::PurchaseCreation(format!("unparseable response: {e}")))?;

        let purchase_id = match value.pointer("/Purchase_Create/Body/PurchaseID") {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                return Err(PostingError::PurchaseCreation(
                    "response has no Purchase_Create.Body.PurchaseID".to_string(),
                ));
            }
        };

        Ok(Self { purchase_id })
    }

    pub fn purchase_id(&self) -> &str {
        &self.purchase_id
    }
}

/// Body of the document-attachment call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentRequest {
    pub document_details: DocumentDetails,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentDetails {
    pub file_name: String,
    pub embedded_file_binary_object: String,
    #[serde(rename = "Type")]
    pub document_type: DocumentType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DocumentType {
    pub receipt: Receipt,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Receipt {
    pub purchase_id: String,
    pub capture_date_time: String,
    pub receipt_name: String,
}

impl DocumentRequest {
    /// Build the document body for an accepted purchase.
    pub fn new(
        purchase: &PurchaseCreated,
        filename: &str,
        attachment: &[u8],
        receipt_date: NaiveDate,
    ) -> Self {
        Self {
            document_details: DocumentDetails {
                file_name: filename.to_string(),
                embedded_file_binary_object: STANDARD.encode(attachment),
                document_type: DocumentType {
                    receipt: Receipt {
                        purchase_id: purchase.purchase_id.clone(),
                        capture_date_time: receipt_date.format("%Y-%m-%dT00:00:00Z").to_string(),
                        receipt_name: filename.to_string(),
                    },
                },
            },
        }
    }
}
