//! Business logic helpers for quotes and invoices.

use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::core::totals::{
    calculate_document_totals, calculate_section_breakdown, CalculationOptions, SectionTotals,
    Totals,
};
use crate::domain::{Book, DocumentStatus, DocumentType, QuoteDocument};
use crate::errors::BookError;

/// Provides validated CRUD and lifecycle helpers for quote documents.
pub struct QuoteService;

impl QuoteService {
    /// Adds a document and returns its identifier.
    pub fn add(book: &mut Book, document: QuoteDocument) -> ServiceResult<Uuid> {
        Ok(book.add_document(document))
    }

    /// Updates the document identified by `id` via the provided mutator.
    pub fn update<F>(book: &mut Book, id: Uuid, mutator: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut QuoteDocument),
    {
        let document = book
            .document_mut(id)
            .ok_or(BookError::QuoteNotFound(id))?;
        mutator(document);
        document.touch();
        book.touch();
        Ok(())
    }

    /// Removes a document along with any settlement links pointing at it.
    pub fn remove(book: &mut Book, id: Uuid) -> ServiceResult<QuoteDocument> {
        book.remove_document(id)
            .ok_or_else(|| BookError::QuoteNotFound(id).into())
    }

    pub fn get(book: &Book, id: Uuid) -> ServiceResult<&QuoteDocument> {
        book.document(id)
            .ok_or_else(|| BookError::QuoteNotFound(id).into())
    }

    /// Recomputes the totals using the display toggles stored on the document.
    pub fn totals(book: &Book, id: Uuid, options: &CalculationOptions) -> ServiceResult<Totals> {
        let document = Self::get(book, id)?;
        Ok(calculate_document_totals(document, options))
    }

    pub fn breakdown(
        book: &Book,
        id: Uuid,
        options: &CalculationOptions,
    ) -> ServiceResult<Vec<SectionTotals>> {
        let document = Self::get(book, id)?;
        Ok(calculate_section_breakdown(document, options))
    }

    /// Stores the current grand total on the document for listing and matching.
    pub fn refresh_snapshot(
        book: &mut Book,
        id: Uuid,
        options: &CalculationOptions,
    ) -> ServiceResult<f64> {
        let totals = Self::totals(book, id, options)?;
        Self::update(book, id, |doc| doc.total = totals.grand_total)?;
        Ok(totals.grand_total)
    }

    /// Turns an accepted quote into a draft invoice carrying the same sections.
    pub fn convert_to_invoice(book: &mut Book, id: Uuid) -> ServiceResult<()> {
        let document = Self::get(book, id)?;
        if document.is_invoice() {
            return Err(ServiceError::Invalid(format!(
                "document {} is already an invoice",
                document.reference
            )));
        }
        Self::update(book, id, |doc| {
            doc.document_type = DocumentType::Invoice;
            doc.status = DocumentStatus::Draft;
        })?;
        tracing::info!(document = %id, "quote converted to invoice");
        Ok(())
    }

    /// Marks an invoice as paid, refreshing its total. The update time becomes
    /// the settlement date used by reconciliation.
    pub fn mark_paid(
        book: &mut Book,
        id: Uuid,
        options: &CalculationOptions,
    ) -> ServiceResult<f64> {
        let document = Self::get(book, id)?;
        if !document.is_invoice() {
            return Err(ServiceError::Invalid(format!(
                "document {} is a quote; only invoices can be paid",
                document.reference
            )));
        }
        let grand_total = Self::refresh_snapshot(book, id, options)?;
        Self::update(book, id, |doc| doc.status = DocumentStatus::Paid)?;
        tracing::info!(document = %id, total = grand_total, "invoice marked paid");
        Ok(grand_total)
    }

    /// Returns the book's invoices that count as settled.
    pub fn paid_invoices(book: &Book) -> Vec<&QuoteDocument> {
        book.documents
            .iter()
            .filter(|doc| doc.is_settled_invoice())
            .collect()
    }
}
