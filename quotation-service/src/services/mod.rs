pub mod auth;
pub mod builder;
pub mod catalog;
pub mod dashboard;
pub mod database;
pub mod importer;
pub mod metrics;
pub mod renderer;
pub mod store;

pub use auth::{AuthGate, SessionToken};
pub use builder::{DocumentDraft, DraftDetails, DraftLine};
pub use catalog::{MergeSummary, ProductCatalog};
pub use dashboard::QuotationStats;
pub use database::MongoDb;
pub use importer::{parse_products, ImportError, ImportReport, SkippedRow};
pub use renderer::{render_preview, PreviewView};
pub use store::{DocumentStore, InMemoryStore};
