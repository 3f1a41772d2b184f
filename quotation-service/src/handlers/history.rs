use super::{push_flash, take_flash, Flash, FlashLevel, SelectOption};
use crate::dtos::ListQuotationsParams;
use crate::models::{QuotationFilter, QuotationStatus};
use crate::services::metrics;
use crate::services::renderer::{format_date, format_money};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect},
    Form,
};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;

pub struct QuotationRow {
    pub id: String,
    pub number: String,
    pub customer: String,
    pub manager: String,
    pub issue_date: String,
    pub grand_total: String,
    pub status: &'static str,
    pub statuses: Vec<SelectOption>,
}

#[derive(Template)]
#[template(path = "quotation_history.html")]
pub struct QuotationHistoryTemplate {
    pub rows: Vec<QuotationRow>,
    pub managers: Vec<SelectOption>,
    pub statuses: Vec<SelectOption>,
    /// Query string of the active filters, echoed back after a status change.
    pub return_query: String,
    pub messages: Vec<Flash>,
}

fn status_options(selected: Option<QuotationStatus>) -> Vec<SelectOption> {
    QuotationStatus::ALL
        .into_iter()
        .map(|s| SelectOption {
            value: s.as_str().to_string(),
            label: s.as_str().to_string(),
            selected: Some(s) == selected,
        })
        .collect()
}

fn filter_query(filter: &QuotationFilter) -> String {
    let mut pairs: Vec<(&str, &str)> = Vec::new();
    if let Some(manager) = &filter.relationship_manager {
        pairs.push(("relationshipManager", manager.as_str()));
    }
    if let Some(status) = filter.status {
        pairs.push(("status", status.as_str()));
    }
    serde_urlencoded::to_string(&pairs).unwrap_or_default()
}

pub async fn quotation_history_page(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<ListQuotationsParams>,
) -> Result<impl IntoResponse, AppError> {
    let filter = params.into_filter();
    let symbol = &state.config.currency_symbol;

    // Manager choices come from every stored quotation, not just the filtered ones.
    let all = state
        .store
        .list_quotations(&QuotationFilter::default())
        .await?;
    let mut manager_names: Vec<String> =
        all.iter().map(|q| q.relationship_manager.clone()).collect();
    manager_names.sort();
    manager_names.dedup();

    let quotations = if filter == QuotationFilter::default() {
        all
    } else {
        all.into_iter().filter(|q| filter.matches(q)).collect()
    };

    let rows = quotations
        .iter()
        .map(|q| QuotationRow {
            id: q.id.clone(),
            number: q.quotation_number.clone(),
            customer: q.customer.name.clone(),
            manager: q.relationship_manager.clone(),
            issue_date: format_date(q.issue_date),
            grand_total: format_money(q.grand_total, symbol),
            status: q.status.as_str(),
            statuses: status_options(Some(q.status)),
        })
        .collect();

    Ok(QuotationHistoryTemplate {
        rows,
        managers: manager_names
            .into_iter()
            .map(|m| SelectOption {
                selected: filter.relationship_manager.as_deref() == Some(m.as_str()),
                label: m.clone(),
                value: m,
            })
            .collect(),
        statuses: status_options(filter.status),
        return_query: filter_query(&filter),
        messages: take_flash(&session).await,
    })
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    #[serde(default)]
    pub return_query: String,
}

pub async fn update_status_form(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Result<impl IntoResponse, AppError> {
    match form.status.parse::<QuotationStatus>() {
        Ok(status) => match state.store.update_quotation_status(&id, status).await? {
            Some(quotation) => {
                metrics::record_status_update(status);
                push_flash(
                    &session,
                    FlashLevel::Info,
                    format!(
                        "Quotation {} marked as {}",
                        quotation.quotation_number, status
                    ),
                )
                .await?
            }
            None => push_flash(&session, FlashLevel::Error, "Quotation not found").await?,
        },
        Err(e) => push_flash(&session, FlashLevel::Error, e.to_string()).await?,
    }

    // Only echo back well-formed filters.
    let filter = serde_urlencoded::from_str::<ListQuotationsParams>(&form.return_query)
        .map(ListQuotationsParams::into_filter)
        .unwrap_or_default();
    let query = filter_query(&filter);
    let target = if query.is_empty() {
        "/quotations".to_string()
    } else {
        format!("/quotations?{}", query)
    };
    Ok(Redirect::to(&target))
}

pub struct InvoiceRow {
    pub id: String,
    pub number: String,
    pub customer: String,
    pub issue_date: String,
    pub due_date: String,
    pub grand_total: String,
}

#[derive(Template)]
#[template(path = "invoice_history.html")]
pub struct InvoiceHistoryTemplate {
    pub rows: Vec<InvoiceRow>,
}

pub async fn invoice_history_page(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let symbol = &state.config.currency_symbol;
    let rows = state
        .store
        .list_invoices()
        .await?
        .iter()
        .map(|i| InvoiceRow {
            id: i.id.clone(),
            number: i.invoice_number.clone(),
            customer: i.customer.name.clone(),
            issue_date: format_date(i.issue_date),
            due_date: format_date(i.due_date),
            grand_total: format_money(i.grand_total, symbol),
        })
        .collect();

    Ok(InvoiceHistoryTemplate { rows })
}
