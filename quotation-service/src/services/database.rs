use crate::models::{
    is_valid_id, DocumentKind, Invoice, NewInvoice, NewQuotation, Quotation, QuotationFilter,
    QuotationStatus,
};
use crate::services::store::DocumentStore;
use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

#[derive(Clone)]
pub struct MongoDb {
    client: MongoClient,
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for quotation-service");

        for kind in DocumentKind::ALL {
            let created_at_index = IndexModel::builder()
                .keys(doc! { "createdAt": -1 })
                .options(
                    IndexOptions::builder()
                        .name("created_at_desc".to_string())
                        .build(),
                )
                .build();

            self.db
                .collection::<Document>(kind.collection())
                .create_index(created_at_index, None)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to create createdAt index on {} collection: {}",
                        kind.collection(),
                        e
                    );
                    AppError::from(e)
                })?;
            tracing::info!("Created index on {}.createdAt", kind.collection());
        }

        // History filters on manager and status together.
        let manager_status_index = IndexModel::builder()
            .keys(doc! { "relationshipManager": 1, "status": 1 })
            .options(
                IndexOptions::builder()
                    .name("manager_status_lookup".to_string())
                    .build(),
            )
            .build();

        self.quotations()
            .create_index(manager_status_index, None)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to create manager_status index on quotations collection: {}",
                    e
                );
                AppError::from(e)
            })?;
        tracing::info!("Created index on quotations.(relationshipManager, status)");

        Ok(())
    }

    pub fn quotations(&self) -> Collection<Quotation> {
        self.db.collection(DocumentKind::Quotation.collection())
    }

    pub fn invoices(&self) -> Collection<Invoice> {
        self.db.collection(DocumentKind::Invoice.collection())
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    fn newest_first() -> FindOptions {
        FindOptions::builder().sort(doc! { "createdAt": -1 }).build()
    }
}

fn quotation_filter_document(filter: &QuotationFilter) -> Document {
    let mut query = doc! {};
    if let Some(manager) = &filter.relationship_manager {
        query.insert("relationshipManager", manager.as_str());
    }
    if let Some(status) = filter.status {
        query.insert("status", status.as_str());
    }
    query
}

#[async_trait]
impl DocumentStore for MongoDb {
    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    async fn create_quotation(&self, new: NewQuotation) -> Result<Quotation, AppError> {
        let quotation = Quotation::from_new(new);
        self.quotations()
            .insert_one(&quotation, None)
            .await
            .map_err(|e| {
                tracing::error!(number = %quotation.quotation_number, "Failed to insert quotation: {}", e);
                AppError::from(e)
            })?;
        tracing::info!(
            document_id = %quotation.id,
            number = %quotation.quotation_number,
            "Quotation created"
        );
        Ok(quotation)
    }

    async fn list_quotations(&self, filter: &QuotationFilter) -> Result<Vec<Quotation>, AppError> {
        let mut cursor = self
            .quotations()
            .find(quotation_filter_document(filter), Self::newest_first())
            .await
            .map_err(AppError::from)?;

        let mut quotations = Vec::new();
        while let Some(quotation) = cursor.try_next().await.map_err(AppError::from)? {
            quotations.push(quotation);
        }
        Ok(quotations)
    }

    async fn get_quotation(&self, id: &str) -> Result<Option<Quotation>, AppError> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        Ok(self.quotations().find_one(doc! { "_id": id }, None).await?)
    }

    async fn update_quotation_status(
        &self,
        id: &str,
        status: QuotationStatus,
    ) -> Result<Option<Quotation>, AppError> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .quotations()
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": { "status": status.as_str() } },
                options,
            )
            .await
            .map_err(|e| {
                tracing::error!(document_id = %id, "Failed to update quotation status: {}", e);
                AppError::from(e)
            })?;

        if updated.is_some() {
            tracing::info!(document_id = %id, status = %status, "Quotation status updated");
        }
        Ok(updated)
    }

    async fn create_invoice(&self, new: NewInvoice) -> Result<Invoice, AppError> {
        let invoice = Invoice::from_new(new);
        self.invoices()
            .insert_one(&invoice, None)
            .await
            .map_err(|e| {
                tracing::error!(number = %invoice.invoice_number, "Failed to insert invoice: {}", e);
                AppError::from(e)
            })?;
        tracing::info!(
            document_id = %invoice.id,
            number = %invoice.invoice_number,
            "Invoice created"
        );
        Ok(invoice)
    }

    async fn list_invoices(&self) -> Result<Vec<Invoice>, AppError> {
        let mut cursor = self
            .invoices()
            .find(None, Self::newest_first())
            .await
            .map_err(AppError::from)?;

        let mut invoices = Vec::new();
        while let Some(invoice) = cursor.try_next().await.map_err(AppError::from)? {
            invoices.push(invoice);
        }
        Ok(invoices)
    }

    async fn get_invoice(&self, id: &str) -> Result<Option<Invoice>, AppError> {
        if !is_valid_id(id) {
            return Ok(None);
        }
        Ok(self.invoices().find_one(doc! { "_id": id }, None).await?)
    }

    async fn count(&self, kind: DocumentKind) -> Result<u64, AppError> {
        let count = self
            .db
            .collection::<Document>(kind.collection())
            .count_documents(None, None)
            .await?;
        Ok(count)
    }
}
