pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pricing;
pub mod services;
pub mod startup;

use config::QuotationConfig;
use services::{AuthGate, DocumentStore, ProductCatalog};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<QuotationConfig>,
    pub store: Arc<dyn DocumentStore>,
    pub catalog: Arc<RwLock<ProductCatalog>>,
    pub auth: Arc<AuthGate>,
}

impl AppState {
    pub fn new(
        config: QuotationConfig,
        store: Arc<dyn DocumentStore>,
        catalog: ProductCatalog,
    ) -> Self {
        let auth = Arc::new(AuthGate::new(&config.auth));
        Self {
            config: Arc::new(config),
            store,
            catalog: Arc::new(RwLock::new(catalog)),
            auth,
        }
    }
}
