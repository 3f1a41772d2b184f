use super::{push_flash, take_flash, Flash, FlashLevel};
use crate::dtos::{NewProductRequest, ProductSearchParams};
use crate::models::Product;
use crate::services::renderer::{format_money, format_percent, PLACEHOLDER_IMAGE};
use crate::services::{metrics, parse_products};
use crate::AppState;
use askama::Template;
use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Form, Json,
};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;

/// Largest accepted product file.
pub(crate) const MAX_IMPORT_BYTES: usize = 5 * 1024 * 1024;

/// Request body limit for the import route: the file plus multipart framing.
pub(crate) const IMPORT_BODY_LIMIT: usize = MAX_IMPORT_BYTES + 64 * 1024;

pub struct ProductRow {
    pub id: String,
    pub title: String,
    pub size: String,
    pub sku: String,
    pub cost_price: String,
    pub variant_price: String,
    pub gst: String,
    pub image_src: String,
}

impl ProductRow {
    pub(crate) fn new(product: &Product, currency_symbol: &str) -> Self {
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            size: product.size.clone(),
            sku: product.sku.clone(),
            cost_price: format_money(product.cost_price, currency_symbol),
            variant_price: format_money(product.variant_price, currency_symbol),
            gst: format_percent(product.gst),
            image_src: if product.image_src.is_empty() {
                PLACEHOLDER_IMAGE.to_string()
            } else {
                product.image_src.clone()
            },
        }
    }
}

#[derive(Template)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub products: Vec<ProductRow>,
    pub total: usize,
    pub query: String,
    pub messages: Vec<Flash>,
}

pub async fn products_page(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ProductSearchParams>,
) -> impl IntoResponse {
    let catalog = state.catalog.read().await;
    let symbol = &state.config.currency_symbol;

    ProductsTemplate {
        products: catalog
            .search(&params.q)
            .into_iter()
            .map(|p| ProductRow::new(p, symbol))
            .collect(),
        total: catalog.len(),
        query: params.q,
        messages: take_flash(&session).await,
    }
}

pub async fn search_products_api(
    State(state): State<AppState>,
    Query(params): Query<ProductSearchParams>,
) -> impl IntoResponse {
    let catalog = state.catalog.read().await;
    let products: Vec<Product> = catalog.search(&params.q).into_iter().cloned().collect();
    Json(products)
}

pub async fn add_product(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<NewProductRequest>,
) -> Result<impl IntoResponse, AppError> {
    let result = match payload.into_product() {
        Ok(product) => {
            let title = product.title.clone();
            state.catalog.write().await.add(product).await.map(|_| title)
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(title) => push_flash(&session, FlashLevel::Info, format!("Added {}", title)).await?,
        Err(e) if e.is_client_error() => {
            push_flash(&session, FlashLevel::Error, client_message(&e)).await?
        }
        Err(e) => return Err(e),
    }
    Ok(Redirect::to("/products"))
}

/// What the import form delivered.
#[derive(Debug)]
pub(crate) enum Upload {
    File(Bytes),
    Missing,
    TooLarge,
}

/// Read the `file` field. Bodies cut off by the route's size limit count as
/// too large rather than as malformed requests.
pub(crate) async fn read_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(Upload::Missing),
            Err(e) => return upload_error(e, "Failed to read multipart field"),
        };
        if field.name() != Some("file") {
            continue;
        }
        return match field.bytes().await {
            Ok(bytes) if bytes.len() > MAX_IMPORT_BYTES => Ok(Upload::TooLarge),
            Ok(bytes) => Ok(Upload::File(bytes)),
            Err(e) => upload_error(e, "Failed to read file bytes"),
        };
    }
}

fn upload_error(e: MultipartError, context: &str) -> Result<Upload, AppError> {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Ok(Upload::TooLarge)
    } else {
        Err(AppError::BadRequest(anyhow::anyhow!("{}: {}", context, e)))
    }
}

pub async fn import_products(
    State(state): State<AppState>,
    session: Session,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let bytes = match read_upload(&mut multipart).await? {
        Upload::File(bytes) => bytes,
        Upload::Missing => {
            push_flash(&session, FlashLevel::Error, "No file uploaded").await?;
            return Ok(Redirect::to("/products"));
        }
        Upload::TooLarge => {
            tracing::warn!("Product import rejected: file too large");
            push_flash(&session, FlashLevel::Error, "File too large (max 5MB)").await?;
            return Ok(Redirect::to("/products"));
        }
    };
    let content = match String::from_utf8(bytes.to_vec()) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Product import rejected: {}", e);
            push_flash(&session, FlashLevel::Error, "File must be UTF-8 encoded text").await?;
            return Ok(Redirect::to("/products"));
        }
    };

    let report = match parse_products(&content) {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!("Product import rejected: {}", e);
            push_flash(&session, FlashLevel::Error, e.to_string()).await?;
            return Ok(Redirect::to("/products"));
        }
    };

    metrics::record_import_rows(report.products.len(), report.skipped.len());
    let summary = state.catalog.write().await.import(report.products).await?;

    push_flash(
        &session,
        FlashLevel::Info,
        format!(
            "Imported products: {} added, {} updated",
            summary.added, summary.updated
        ),
    )
    .await?;
    for row in &report.skipped {
        push_flash(
            &session,
            FlashLevel::Error,
            format!("Skipped row {}: {}", row.line, row.reason),
        )
        .await?;
    }

    Ok(Redirect::to("/products"))
}

#[derive(Deserialize)]
pub struct RemoveProductForm {
    pub id: String,
}

pub async fn remove_product(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveProductForm>,
) -> Result<impl IntoResponse, AppError> {
    if !state.catalog.write().await.remove(&form.id).await? {
        push_flash(&session, FlashLevel::Error, format!("Product '{}' not found", form.id)).await?;
    }
    Ok(Redirect::to("/products"))
}

pub async fn clear_products(
    State(state): State<AppState>,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    state.catalog.write().await.clear().await?;
    push_flash(&session, FlashLevel::Info, "All products removed").await?;
    Ok(Redirect::to("/products"))
}

/// Message shown inline for a client error.
pub(crate) fn client_message(error: &AppError) -> String {
    match error {
        AppError::ValidationError(errors) => crate::dtos::validation_messages(errors).join("; "),
        AppError::BadRequest(e) | AppError::NotFound(e) | AppError::Unauthorized(e) => {
            e.to_string()
        }
        other => other.to_string(),
    }
}
