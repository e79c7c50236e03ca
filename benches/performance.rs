use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tradebook_core::{
    config::MatchingSettings,
    core::{
        matching::suggest_matches,
        totals::{calculate_document_totals, CalculationOptions},
    },
    domain::{BankTransaction, Expense, LabourItem, LineItem, QuoteDocument, Section},
};

fn monthly_statement(size: usize) -> (Vec<BankTransaction>, Vec<Expense>) {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut transactions = Vec::with_capacity(size);
    let mut expenses = Vec::with_capacity(size);
    for i in 0..size {
        let date = start + Duration::days((i % 28) as i64);
        let amount = 10.0 + i as f64;
        transactions.push(BankTransaction::new(-amount, date, format!("card {i}")));
        // Listed in reverse so most lines scan deep into the pool.
        expenses.push(Expense::new(
            10.0 + (size - 1 - i) as f64,
            date,
            "Vendor",
            "Materials",
        ));
    }
    (transactions, expenses)
}

fn large_quote() -> QuoteDocument {
    let mut doc = QuoteDocument::new("Q-BENCH", "Bench");
    doc.labour_rate = Some(45.0);
    doc.markup_percent = 12.5;
    doc.tax_percent = Some(20.0);
    for s in 0..20 {
        let mut section = Section::new(format!("Section {s}"));
        for i in 0..25 {
            section.items.push(LineItem::new("Item", 1.0 + i as f64, 3.5));
        }
        section.labour_items = vec![LabourItem::new(2.0), LabourItem::new(1.5).with_rate(60.0)];
        doc.sections.push(section);
    }
    doc
}

fn bench_suggest_matches(c: &mut Criterion) {
    let (transactions, expenses) = monthly_statement(300);
    let settings = MatchingSettings::default();
    c.bench_function("matching.suggest_matches.300x300", |b| {
        b.iter(|| {
            suggest_matches(
                black_box(&transactions),
                black_box(&expenses),
                &[],
                &settings,
            )
        });
    });
}

fn bench_totals(c: &mut Criterion) {
    let doc = large_quote();
    let options = CalculationOptions {
        enable_vat: true,
        enable_cis: true,
        default_labour_rate: 40.0,
    };
    c.bench_function("totals.calculate_document_totals.500_items", |b| {
        b.iter(|| calculate_document_totals(black_box(&doc), &options));
    });
}

criterion_group!(benches, bench_suggest_matches, bench_totals);
criterion_main!(benches);
