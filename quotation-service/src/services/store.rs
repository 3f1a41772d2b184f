use crate::models::{
    is_valid_id, DocumentKind, Invoice, NewInvoice, NewQuotation, Quotation, QuotationFilter,
    QuotationStatus,
};
use async_trait::async_trait;
use service_core::error::AppError;
use tokio::sync::RwLock;

/// Persistence for finalized documents.
///
/// Documents are append-only; the only mutation is a quotation's status.
/// Unknown or malformed ids resolve to `Ok(None)`, never to an error.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;

    async fn create_quotation(&self, new: NewQuotation) -> Result<Quotation, AppError>;
    /// Newest first.
    async fn list_quotations(&self, filter: &QuotationFilter) -> Result<Vec<Quotation>, AppError>;
    async fn get_quotation(&self, id: &str) -> Result<Option<Quotation>, AppError>;
    async fn update_quotation_status(
        &self,
        id: &str,
        status: QuotationStatus,
    ) -> Result<Option<Quotation>, AppError>;

    async fn create_invoice(&self, new: NewInvoice) -> Result<Invoice, AppError>;
    /// Newest first.
    async fn list_invoices(&self) -> Result<Vec<Invoice>, AppError>;
    async fn get_invoice(&self, id: &str) -> Result<Option<Invoice>, AppError>;

    async fn count(&self, kind: DocumentKind) -> Result<u64, AppError>;
}

/// Process-local store used by tests and `STORE_BACKEND=memory`.
#[derive(Default)]
pub struct InMemoryStore {
    quotations: RwLock<Vec<Quotation>>,
    invoices: RwLock<Vec<Invoice>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn create_quotation(&self, new: NewQuotation) -> Result<Quotation, AppError> {
        let quotation = Quotation::from_new(new);
        self.quotations.write().await.push(quotation.clone());
        tracing::info!(
            document_id = %quotation.id,
            number = %quotation.quotation_number,
            "Quotation stored in memory"
        );
        Ok(quotation)
    }

    async fn list_quotations(&self, filter: &QuotationFilter) -> Result<Vec<Quotation>, AppError> {
        let quotations = self.quotations.read().await;
        Ok(quotations
            .iter()
            .rev()
            .filter(|q| filter.matches(q))
            .cloned()
            .collect())
    }

    async fn get_quotation(&self, id: &str) -> Result<Option<Quotation>, AppError> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        let quotations = self.quotations.read().await;
        Ok(quotations.iter().find(|q| q.id == id).cloned())
    }

    async fn update_quotation_status(
        &self,
        id: &str,
        status: QuotationStatus,
    ) -> Result<Option<Quotation>, AppError> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        let mut quotations = self.quotations.write().await;
        Ok(quotations.iter_mut().find(|q| q.id == id).map(|q| {
            q.status = status;
            q.clone()
        }))
    }

    async fn create_invoice(&self, new: NewInvoice) -> Result<Invoice, AppError> {
        let invoice = Invoice::from_new(new);
        self.invoices.write().await.push(invoice.clone());
        tracing::info!(
            document_id = %invoice.id,
            number = %invoice.invoice_number,
            "Invoice stored in memory"
        );
        Ok(invoice)
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>, AppError> {
        let invoices = self.invoices.read().await;
        Ok(invoices.iter().rev().cloned().collect())
    }

    async fn get_invoice(&self, id: &str) -> Result<Option<Invoice>, AppError> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        let invoices = self.invoices.read().await;
        Ok(invoices.iter().find(|i| i.id == id).cloned())
    }

    async fn count(&self, kind: DocumentKind) -> Result<u64, AppError> {
        let count = match kind {
            DocumentKind::Quotation => self.quotations.read().await.len(),
            DocumentKind::Invoice => self.invoices.read().await.len(),
        };
        Ok(count as u64)
    }
}
