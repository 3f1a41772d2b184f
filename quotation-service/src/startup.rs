use crate::config::{QuotationConfig, StoreBackend};
use crate::handlers::{
    auth, builder, dashboard, health, history, invoices, metrics, preview, products, quotations,
};
use crate::middleware::auth::{require_api_session, require_session};
use crate::services::{DocumentStore, InMemoryStore, MongoDb, ProductCatalog};
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    response::Redirect,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(config: QuotationConfig) -> Result<Self, AppError> {
        let store = open_store(&config).await?;

        let catalog = ProductCatalog::load(&config.catalog_path)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to load product catalog from {}: {}",
                    config.catalog_path.display(),
                    e
                );
                e
            })?;
        tracing::info!(products = catalog.len(), "Product catalog loaded");

        let port = config.common.port;
        let state = AppState::new(config, store, catalog);
        let app = build_router(state);

        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

async fn open_store(config: &QuotationConfig) -> Result<Arc<dyn DocumentStore>, AppError> {
    match config.store_backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory document store");
            let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
            Ok(store)
        }
        StoreBackend::Mongo => {
            let db = MongoDb::connect(&config.mongodb.uri, &config.mongodb.database)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to connect to MongoDB: {}", e);
                    e
                })?;
            db.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;
            let store: Arc<dyn DocumentStore> = Arc::new(db);
            Ok(store)
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(Duration::hours(24)));

    let pages = Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/dashboard", get(dashboard::dashboard_page))
        .route(
            "/products",
            get(products::products_page).post(products::add_product),
        )
        .route(
            "/products/import",
            post(products::import_products)
                .layer(DefaultBodyLimit::max(products::IMPORT_BODY_LIMIT)),
        )
        .route("/products/remove", post(products::remove_product))
        .route("/products/clear", post(products::clear_products))
        .route("/builder/:kind", get(builder::builder_page))
        .route("/builder/:kind/items", post(builder::add_item))
        .route("/builder/:kind/items/:index", post(builder::update_item))
        .route(
            "/builder/:kind/items/:index/remove",
            post(builder::remove_item),
        )
        .route("/builder/:kind/details", post(builder::update_details))
        .route("/builder/:kind/submit", post(builder::submit))
        .route("/builder/:kind/reset", post(builder::reset))
        .route("/quotations", get(history::quotation_history_page))
        .route("/quotations/:id/status", post(history::update_status_form))
        .route("/quotations/:id/preview", get(preview::quotation_preview))
        .route("/invoices", get(history::invoice_history_page))
        .route("/invoices/:id/preview", get(preview::invoice_preview))
        .route_layer(from_fn(require_session));

    let api = Router::new()
        .route("/api/dashboard", get(dashboard::dashboard_api))
        .route("/api/products", get(products::search_products_api))
        .route(
            "/api/quotations",
            get(quotations::list_quotations).post(quotations::create_quotation),
        )
        .route(
            "/api/quotations/:id",
            get(quotations::get_quotation).patch(quotations::update_quotation),
        )
        .route(
            "/api/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route("/api/invoices/:id", get(invoices::get_invoice))
        .route_layer(from_fn(require_api_session));

    Router::new()
        .route("/login", get(auth::login_page).post(auth::login_handler))
        .route("/logout", post(auth::logout_handler))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(metrics::metrics_endpoint))
        .merge(pages)
        .merge(api)
        .layer(session_layer)
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
