//! Quote and invoice totals.
//!
//! Every figure is derived from the document's sections and settings on each
//! call. Inputs are treated permissively: absent numbers count as zero and an
//! absent adjustment type is applied as a fixed amount, so a half-filled
//! document still yields a usable total. No rounding happens here; callers
//! round at presentation time.

use serde::{Deserialize, Serialize};

use crate::config::CalculationSettings;
use crate::domain::{
    first_present, AdjustmentKind, DisplayOptions, PartPayment, QuoteDocument, Section,
};

/// Business-level switches and fallbacks passed explicitly into the engine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct CalculationOptions {
    pub enable_vat: bool,
    pub enable_cis: bool,
    pub default_labour_rate: f64,
}

impl From<&CalculationSettings> for CalculationOptions {
    fn from(settings: &CalculationSettings) -> Self {
        Self {
            enable_vat: settings.enable_vat,
            enable_cis: settings.enable_cis,
            default_labour_rate: settings.default_labour_rate,
        }
    }
}

/// Document-level figures.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Totals {
    pub materials_total: f64,
    pub labour_total: f64,
    pub sections_total: f64,
    pub client_subtotal: f64,
    pub markup_amount: f64,
    pub discount_amount: f64,
    pub after_discount: f64,
    pub tax_amount: f64,
    pub cis_amount: f64,
    pub grand_total: f64,
    pub part_payment_amount: f64,
}

/// Per-section figures, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionTotals {
    pub title: String,
    pub materials: f64,
    pub labour: f64,
    pub price: f64,
    pub overridden: bool,
}

/// Sum of `total_price` over non-heading items.
pub fn calculate_section_materials(section: &Section) -> f64 {
    section
        .items
        .iter()
        .filter(|item| !item.is_heading)
        .map(|item| item.total_price.unwrap_or(0.0))
        .sum()
}

/// Section rate, then document rate, then the global default.
pub fn effective_labour_rate(
    section: &Section,
    document_rate: Option<f64>,
    options: &CalculationOptions,
) -> f64 {
    first_present(&[
        section.labour_rate,
        document_rate,
        Some(options.default_labour_rate),
    ])
    .unwrap_or(0.0)
}

/// Itemized labour wins over a direct cost, which wins over hours × rate.
pub fn calculate_section_labour(
    section: &Section,
    document_rate: Option<f64>,
    options: &CalculationOptions,
) -> f64 {
    let rate = effective_labour_rate(section, document_rate, options);
    if !section.labour_items.is_empty() {
        return section
            .labour_items
            .iter()
            .map(|item| item.hours * first_present(&[item.rate, Some(rate)]).unwrap_or(0.0))
            .sum();
    }
    if let Some(cost) = section.labour_cost {
        return cost;
    }
    section.labour_hours.unwrap_or(0.0) * rate
}

/// `subsection_price` when present (zero included), otherwise materials + labour.
pub fn calculate_section_price(
    section: &Section,
    document_rate: Option<f64>,
    options: &CalculationOptions,
) -> f64 {
    section.subsection_price.unwrap_or_else(|| {
        calculate_section_materials(section)
            + calculate_section_labour(section, document_rate, options)
    })
}

pub fn calculate_section_totals(
    section: &Section,
    document_rate: Option<f64>,
    options: &CalculationOptions,
) -> SectionTotals {
    let materials = calculate_section_materials(section);
    let labour = calculate_section_labour(section, document_rate, options);
    let price = section.subsection_price.unwrap_or(materials + labour);
    SectionTotals {
        title: section.title.clone(),
        materials,
        labour,
        price,
        overridden: section.subsection_price.is_some(),
    }
}

/// Zero and NaN both count as "no adjustment".
fn is_unset(value: f64) -> bool {
    value == 0.0 || value.is_nan()
}

pub fn calculate_discount(
    subtotal: f64,
    kind: Option<AdjustmentKind>,
    value: Option<f64>,
) -> f64 {
    let value = value.unwrap_or(0.0);
    if is_unset(value) {
        return 0.0;
    }
    match kind.unwrap_or_default() {
        AdjustmentKind::Percentage => subtotal * value / 100.0,
        AdjustmentKind::Fixed => value,
    }
}

/// Deposit requested up front, computed from the grand total.
pub fn calculate_part_payment(grand_total: f64, part_payment: &PartPayment) -> f64 {
    let value = part_payment.value.unwrap_or(0.0);
    if !part_payment.enabled || is_unset(value) {
        return 0.0;
    }
    match part_payment.kind.unwrap_or_default() {
        AdjustmentKind::Percentage => grand_total * value / 100.0,
        AdjustmentKind::Fixed => value,
    }
}

pub fn calculate_section_breakdown(
    document: &QuoteDocument,
    options: &CalculationOptions,
) -> Vec<SectionTotals> {
    document
        .sections
        .iter()
        .map(|section| calculate_section_totals(section, document.labour_rate, options))
        .collect()
}

pub fn calculate_totals(
    document: &QuoteDocument,
    options: &CalculationOptions,
    display: &DisplayOptions,
) -> Totals {
    let breakdown = calculate_section_breakdown(document, options);
    let materials_total: f64 = breakdown.iter().map(|s| s.materials).sum();
    let labour_total: f64 = breakdown.iter().map(|s| s.labour).sum();
    let sections_total: f64 = breakdown.iter().map(|s| s.price).sum();

    let client_subtotal = sections_total * (1.0 + document.markup_percent / 100.0);
    let markup_amount = client_subtotal - sections_total;
    let discount_amount = calculate_discount(
        client_subtotal,
        document.discount_type,
        document.discount_value,
    );
    let after_discount = client_subtotal - discount_amount;

    let tax_amount = if options.enable_vat && display.show_vat {
        after_discount * document.tax_percent.unwrap_or(0.0) / 100.0
    } else {
        0.0
    };
    // CIS is withheld from labour only; markup and discount do not touch it.
    let cis_amount = if options.enable_cis && display.show_cis {
        labour_total * document.cis_percent.unwrap_or(0.0) / 100.0
    } else {
        0.0
    };

    let grand_total = after_discount + tax_amount - cis_amount;
    let part_payment_amount = calculate_part_payment(grand_total, &document.part_payment);

    Totals {
        materials_total,
        labour_total,
        sections_total,
        client_subtotal,
        markup_amount,
        discount_amount,
        after_discount,
        tax_amount,
        cis_amount,
        grand_total,
        part_payment_amount,
    }
}

/// Convenience wrapper using the display toggles stored on the document.
pub fn calculate_document_totals(document: &QuoteDocument, options: &CalculationOptions) -> Totals {
    calculate_totals(document, options, &document.display)
}
