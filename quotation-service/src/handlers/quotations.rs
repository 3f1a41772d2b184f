use crate::dtos::{
    CreateQuotationRequest, ListQuotationsParams, QuotationCreatedResponse, QuotationResponse,
    UpdateStatusRequest,
};
use crate::models::{DocumentKind, QuotationStatus};
use crate::services::metrics;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

/// Malformed JSON is a 400 like any other invalid request.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| AppError::bad_request(e.body_text()))
}

pub async fn create_quotation(
    State(state): State<AppState>,
    payload: Result<Json<CreateQuotationRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let new = json_body(payload)?.into_new_quotation(&state.config)?;
    let quotation = state.store.create_quotation(new).await?;
    metrics::record_document_created(DocumentKind::Quotation);

    Ok((
        StatusCode::CREATED,
        Json(QuotationCreatedResponse {
            message: "Quotation saved successfully".to_string(),
            quotation_id: quotation.id,
        }),
    ))
}

pub async fn list_quotations(
    State(state): State<AppState>,
    Query(params): Query<ListQuotationsParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = params.into_filter();
    let quotations = state.store.list_quotations(&filter).await?;
    let body: Vec<QuotationResponse> = quotations.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

pub async fn get_quotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let quotation = state
        .store
        .get_quotation(&id)
        .await?
        .ok_or_else(|| AppError::not_found("Quotation not found"))?;
    Ok(Json(QuotationResponse::from(quotation)))
}

/// Only `status` may change after creation.
pub async fn update_quotation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let request = json_body(payload)?;
    let raw_status = request
        .status
        .ok_or_else(|| AppError::bad_request("No valid fields provided for update."))?;
    let status: QuotationStatus = raw_status.parse().map_err(AppError::bad_request)?;

    let quotation = state
        .store
        .update_quotation_status(&id, status)
        .await?
        .ok_or_else(|| AppError::not_found("Quotation not found"))?;
    metrics::record_status_update(status);

    Ok(Json(QuotationResponse::from(quotation)))
}
