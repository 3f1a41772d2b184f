use super::quotations::json_body;
use crate::dtos::{CreateInvoiceRequest, InvoiceCreatedResponse, InvoiceResponse};
use crate::models::DocumentKind;
use crate::services::metrics;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

pub async fn create_invoice(
    State(state): State<AppState>,
    payload: Result<Json<CreateInvoiceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let new = json_body(payload)?.into_new_invoice(&state.config)?;
    let invoice = state.store.create_invoice(new).await?;
    metrics::record_document_created(DocumentKind::Invoice);

    Ok((
        StatusCode::CREATED,
        Json(InvoiceCreatedResponse {
            message: "Invoice saved successfully".to_string(),
            invoice_id: invoice.id,
        }),
    ))
}

pub async fn list_invoices(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let invoices = state.store.list_invoices().await?;
    let body: Vec<InvoiceResponse> = invoices.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let invoice = state
        .store
        .get_invoice(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice not found"))?;
    Ok(Json(InvoiceResponse::from(invoice)))
}
