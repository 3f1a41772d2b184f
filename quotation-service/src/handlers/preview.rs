use crate::services::{render_preview, PreviewView};
use crate::AppState;
use axum::{
    extract::{Path, State},
    response::Html,
};
use service_core::error::AppError;

pub async fn quotation_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let quotation = state
        .store
        .get_quotation(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Quotation not found"))?;

    let view = PreviewView::from_quotation(&quotation, &state.config.currency_symbol);
    Ok(Html(render_preview(view)?))
}

pub async fn invoice_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let invoice = state
        .store
        .get_invoice(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Invoice not found"))?;

    let view = PreviewView::from_invoice(&invoice, &state.config.currency_symbol);
    Ok(Html(render_preview(view)?))
}
