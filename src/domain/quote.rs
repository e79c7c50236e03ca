use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::Deserializer, Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Amounted, Displayable, Identifiable};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
    /// Computed by the editor and taken as given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub is_heading: bool,
}

impl LineItem {
    pub fn new(description: impl Into<String>, quantity: f64, unit_price: f64) -> Self {
        Self {
            description: description.into(),
            quantity,
            unit_price,
            total_price: Some(quantity * unit_price),
            is_heading: false,
        }
    }

    pub fn heading(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            is_heading: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LabourItem {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
}

impl LabourItem {
    pub fn new(hours: f64) -> Self {
        Self {
            hours,
            ..Self::default()
        }
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = Some(rate);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Section {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub labour_items: Vec<LabourItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labour_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labour_rate: Option<f64>,
    /// Direct labour figure; ignored when itemized labour exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labour_cost: Option<f64>,
    /// Replaces materials + labour for the section, zero included.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subsection_price: Option<f64>,
}

impl Section {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }
}

/// Discount and part-payment discriminator. Anything not explicitly a
/// percentage is applied as a fixed amount.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentKind {
    Percentage,
    #[default]
    Fixed,
}

impl AdjustmentKind {
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" => AdjustmentKind::Percentage,
            _ => AdjustmentKind::Fixed,
        }
    }
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AdjustmentKind::Percentage => "percentage",
            AdjustmentKind::Fixed => "fixed",
        };
        f.write_str(label)
    }
}

impl<'de> Deserialize<'de> for AdjustmentKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(AdjustmentKind::parse_lenient(&value))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PartPayment {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<AdjustmentKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// Per-document display toggles. A tax line only applies when the business
/// enables it and the document shows it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayOptions {
    #[serde(default = "DisplayOptions::default_shown")]
    pub show_vat: bool,
    #[serde(default)]
    pub show_cis: bool,
}

impl DisplayOptions {
    fn default_shown() -> bool {
        true
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_vat: true,
            show_cis: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    #[default]
    Quote,
    Invoice,
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentType::Quote => f.write_str("Quote"),
            DocumentType::Invoice => f.write_str("Invoice"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Declined,
    Paid,
    Overdue,
}

/// A quote or invoice. Totals are always derived from the sections and
/// settings; `total` is only a display snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteDocument {
    pub id: Uuid,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub document_type: DocumentType,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labour_rate: Option<f64>,
    #[serde(default)]
    pub markup_percent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_type: Option<AdjustmentKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cis_percent: Option<f64>,
    #[serde(default)]
    pub part_payment: PartPayment,
    #[serde(default)]
    pub display: DisplayOptions,
    #[serde(default)]
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl QuoteDocument {
    pub fn new(reference: impl Into<String>, client_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            reference: reference.into(),
            client_name: client_name.into(),
            document_type: DocumentType::Quote,
            status: DocumentStatus::Draft,
            sections: Vec::new(),
            labour_rate: None,
            markup_percent: 0.0,
            discount_type: None,
            discount_value: None,
            tax_percent: None,
            cis_percent: None,
            part_payment: PartPayment::default(),
            display: DisplayOptions::default(),
            total: 0.0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn invoice(reference: impl Into<String>, client_name: impl Into<String>) -> Self {
        let mut doc = Self::new(reference, client_name);
        doc.document_type = DocumentType::Invoice;
        doc
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn is_invoice(&self) -> bool {
        self.document_type == DocumentType::Invoice
    }

    /// Only paid invoices take part in bank reconciliation.
    pub fn is_settled_invoice(&self) -> bool {
        self.is_invoice() && self.status == DocumentStatus::Paid
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Identifiable for QuoteDocument {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Amounted for QuoteDocument {
    fn amount(&self) -> f64 {
        self.total
    }
}

impl Displayable for QuoteDocument {
    fn display_label(&self) -> String {
        let kind = match self.document_type {
            DocumentType::Quote => "quote",
            DocumentType::Invoice => "invoice",
        };
        format!("{kind}:{} [{:?}] {}", self.reference, self.status, self.client_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_sparse_documents_with_defaults() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z",
            "sections": [{ "items": [{ "total_price": 12.5 }] }]
        }"#;
        let doc: QuoteDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.document_type, DocumentType::Quote);
        assert!(doc.discount_type.is_none());
        assert!(doc.display.show_vat);
        assert!(!doc.display.show_cis);
        assert_eq!(doc.sections[0].items[0].total_price, Some(12.5));
        assert!(!doc.sections[0].items[0].is_heading);
    }

    #[test]
    fn part_payment_type_uses_lowercase_tag() {
        let json = r#"{ "enabled": true, "type": "percentage", "value": 25 }"#;
        let payment: PartPayment = serde_json::from_str(json).unwrap();
        assert_eq!(payment.kind, Some(AdjustmentKind::Percentage));
        assert_eq!(payment.value, Some(25.0));
    }

    #[test]
    fn unknown_adjustment_tags_fall_back_to_fixed() {
        let json = r#"{ "enabled": true, "type": "amount", "value": 200 }"#;
        let payment: PartPayment = serde_json::from_str(json).unwrap();
        assert_eq!(payment.kind, Some(AdjustmentKind::Fixed));
    }

    #[test]
    fn only_paid_invoices_are_settled() {
        let mut doc = QuoteDocument::invoice("INV-1", "Acme");
        assert!(!doc.is_settled_invoice());
        doc.status = DocumentStatus::Paid;
        assert!(doc.is_settled_invoice());

        let mut quote = QuoteDocument::new("Q-1", "Acme");
        quote.status = DocumentStatus::Paid;
        assert!(!quote.is_settled_invoice());
    }
}
