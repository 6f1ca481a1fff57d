//! OCR expense-analysis response shape.
//!
//! Mirrors the JSON returned by an AnalyzeExpense-style OCR service. Only the
//! parts the parser reads are modelled; unknown keys are ignored and every
//! collection defaults to empty, so partial responses still deserialize.

use serde::{Deserialize, Serialize};

/// Top-level OCR response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpenseResponse {
    /// Analyzed documents (practically one per image).
    #[serde(default)]
    pub expense_documents: Vec<ExpenseDocument>,
}

/// One analyzed receipt or invoice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpenseDocument {
    /// Index of the document within the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_index: Option<u32>,

    /// Itemized charge groups.
    #[serde(default)]
    pub line_item_groups: Vec<LineItemGroup>,

    /// Document-level label/value pairs.
    #[serde(default)]
    pub summary_fields: Vec<ExpenseField>,
}

/// A group of line items (usually one table).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItemGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_item_group_index: Option<u32>,

    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

/// A single itemized row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItem {
    #[serde(default)]
    pub line_item_expense_fields: Vec<ExpenseField>,
}

/// A detected field with optional label and value text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpenseField {
    /// Normalized field type assigned by the OCR engine.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<FieldType>,

    /// Detected label, e.g. "VAT Invoice Number:".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_detection: Option<Detection>,

    /// Detected value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_detection: Option<Detection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,
}

/// OCR engine's normalized field type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FieldType {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

/// Detected text with its confidence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Detection {
    #[serde(default)]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl ExpenseField {
    /// Label text, if a label was detected.
    pub fn label(&self) -> Option<&str> {
        self.label_detection.as_ref()?.text.as_deref()
    }

    /// Value text, if a value was detected.
    pub fn value(&self) -> Option<&str> {
        self.value_detection.as_ref()?.text.as_deref()
    }

    /// Build a field from label and value text.
    pub fn labelled(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label_detection: Some(Detection {
                text: Some(label.into()),
                confidence: None,
            }),
            value_detection: Some(Detection {
                text: Some(value.into()),
                confidence: None,
            }),
            ..Self::default()
        }
    }

    /// Build a field that only carries a value.
    pub fn value_only(value: impl Into<String>) -> Self {
        Self {
            value_detection: Some(Detection {
                text: Some(value.into()),
                confidence: None,
            }),
            ..Self::default()
        }
    }
}

impl ExpenseResponse {
    /// Parse a response from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, crate::error::ExtractionError> {
        serde_json::from_str(text).map_err(|e| crate::error::ExtractionError::Json(e.to_string()))
    }
}
