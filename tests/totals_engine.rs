use tradebook_core::{
    core::totals::{calculate_document_totals, calculate_totals, CalculationOptions},
    domain::{
        AdjustmentKind, DisplayOptions, LabourItem, LineItem, PartPayment, QuoteDocument, Section,
    },
};

const EPS: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {expected}, got {actual}"
    );
}

fn options(enable_vat: bool, enable_cis: bool) -> CalculationOptions {
    CalculationOptions {
        enable_vat,
        enable_cis,
        default_labour_rate: 35.0,
    }
}

fn kitchen_refit() -> QuoteDocument {
    let mut units = Section::new("Units")
        .with_item(LineItem::heading("Carcasses"))
        .with_item(LineItem::new("Base unit", 4.0, 80.0))
        .with_item(LineItem::new("Wall unit", 2.0, 60.0));
    units.labour_items = vec![LabourItem::new(6.0), LabourItem::new(2.0).with_rate(60.0)];

    let mut electrics = Section::new("Electrics").with_item(LineItem::new("Sockets", 3.0, 20.0));
    electrics.labour_hours = Some(3.0);
    electrics.labour_rate = Some(55.0);

    let mut worktop = Section::new("Worktop").with_item(LineItem::new("Oak", 1.0, 400.0));
    worktop.subsection_price = Some(650.0);

    let mut doc = QuoteDocument::new("Q-2024-017", "Harris")
        .with_section(units)
        .with_section(electrics)
        .with_section(worktop);
    doc.labour_rate = Some(45.0);
    doc.markup_percent = 10.0;
    doc.discount_type = Some(AdjustmentKind::Percentage);
    doc.discount_value = Some(5.0);
    doc.tax_percent = Some(20.0);
    doc.cis_percent = Some(20.0);
    doc
}

#[test]
fn multi_section_quote_composes_every_step() {
    let doc = kitchen_refit();
    let totals = calculate_totals(
        &doc,
        &options(true, true),
        &DisplayOptions {
            show_vat: true,
            show_cis: true,
        },
    );

    // units: materials 440, labour 6*45 + 2*60 = 390
    // electrics: materials 60, labour 3*55 = 165
    // worktop: materials 400, price fixed at 650
    assert_close(totals.materials_total, 900.0);
    assert_close(totals.labour_total, 555.0);
    assert_close(totals.sections_total, 830.0 + 225.0 + 650.0);
    assert_close(totals.client_subtotal, 1705.0 * 1.1);
    assert_close(totals.markup_amount, 170.5);
    assert_close(totals.discount_amount, 1875.5 * 0.05);
    assert_close(totals.after_discount, 1875.5 * 0.95);
    assert_close(totals.tax_amount, 1875.5 * 0.95 * 0.2);
    assert_close(totals.cis_amount, 111.0);
    assert_close(
        totals.grand_total,
        1875.5 * 0.95 * 1.2 - 111.0,
    );
}

#[test]
fn hidden_tax_lines_are_not_applied() {
    let doc = kitchen_refit();
    let shown = calculate_totals(&doc, &options(true, true), &DisplayOptions::default());
    assert_close(shown.cis_amount, 0.0);

    let disabled = calculate_totals(
        &doc,
        &options(false, false),
        &DisplayOptions {
            show_vat: true,
            show_cis: true,
        },
    );
    assert_close(disabled.tax_amount, 0.0);
    assert_close(disabled.cis_amount, 0.0);
    assert_close(disabled.grand_total, disabled.after_discount);
}

#[test]
fn empty_document_is_all_zero() {
    let doc = QuoteDocument::new("Q-0", "Nobody");
    let totals = calculate_document_totals(&doc, &options(true, true));
    assert_eq!(totals, Default::default());
}

#[test]
fn part_payment_follows_grand_total() {
    let mut doc = QuoteDocument::new("Q-1", "Patel").with_section(
        Section::new("Fence").with_item(LineItem::new("Panels", 10.0, 50.0)),
    );
    doc.tax_percent = Some(20.0);
    doc.part_payment = PartPayment {
        enabled: true,
        kind: Some(AdjustmentKind::Percentage),
        value: Some(25.0),
    };
    let totals = calculate_document_totals(&doc, &options(true, false));
    assert_close(totals.grand_total, 600.0);
    assert_close(totals.part_payment_amount, 150.0);

    doc.part_payment.kind = None;
    doc.part_payment.value = Some(100.0);
    let totals = calculate_document_totals(&doc, &options(true, false));
    assert_close(totals.part_payment_amount, 100.0);
}

#[test]
fn documents_from_json_tolerate_missing_fields() {
    let raw = r#"{
        "id": "6f0c1d2e-7a3b-4c5d-8e9f-0a1b2c3d4e5f",
        "created_at": "2024-03-01T09:00:00Z",
        "updated_at": "2024-03-01T09:00:00Z",
        "discount_type": "something-else",
        "discount_value": 15,
        "sections": [
            { "title": "Patch", "items": [ { "total_price": 120 }, { "is_heading": true, "total_price": 999 } ] }
        ]
    }"#;
    let doc: QuoteDocument = serde_json::from_str(raw).expect("lenient document");
    assert_eq!(doc.discount_type, Some(AdjustmentKind::Fixed));
    let totals = calculate_document_totals(&doc, &options(true, false));
    assert_close(totals.materials_total, 120.0);
    assert_close(totals.discount_amount, 15.0);
    assert_close(totals.grand_total, 105.0);
}
