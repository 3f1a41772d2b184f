use super::products::{client_message, ProductRow};
use super::{push_flash, session_error, take_flash, Flash, FlashLevel, SelectOption};
use crate::models::{Customer, DocumentKind};
use crate::services::renderer::format_money;
use crate::services::{metrics, DocumentDraft, DraftDetails};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use chrono::Local;
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;

const LAST_CUSTOMER_KEY: &str = "last_customer";
const MAX_PRODUCT_RESULTS: usize = 20;

fn draft_key(kind: DocumentKind) -> String {
    format!("draft:{}", kind)
}

fn builder_url(kind: DocumentKind) -> String {
    format!("/builder/{}", kind)
}

async fn fresh_draft(
    state: &AppState,
    session: &Session,
    kind: DocumentKind,
) -> Result<DocumentDraft, AppError> {
    let sequence = state.store.count(kind).await? + 1;
    let customer = match session.get::<Customer>(LAST_CUSTOMER_KEY).await {
        Ok(customer) => customer.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Ignoring unreadable saved customer: {}", e);
            Customer::default()
        }
    };
    Ok(DocumentDraft::new(
        kind,
        sequence,
        Local::now().date_naive(),
        customer,
    ))
}

/// Current draft of `kind`; a missing or unreadable one is replaced by a fresh draft.
async fn load_draft(
    state: &AppState,
    session: &Session,
    kind: DocumentKind,
) -> Result<DocumentDraft, AppError> {
    match session.get::<DocumentDraft>(&draft_key(kind)).await {
        Ok(Some(draft)) if draft.kind == kind => return Ok(draft),
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(kind = %kind, "Discarding corrupted draft: {}", e);
        }
    }
    let draft = fresh_draft(state, session, kind).await?;
    save_draft(session, &draft).await?;
    Ok(draft)
}

async fn save_draft(session: &Session, draft: &DocumentDraft) -> Result<(), AppError> {
    session
        .insert(&draft_key(draft.kind), draft)
        .await
        .map_err(session_error)
}

pub struct BuilderLine {
    pub index: usize,
    pub title: String,
    pub image_src: String,
    pub quantity: String,
    pub unit_price: String,
    pub gst_rate: String,
    pub tax_amount: String,
    pub total_amount: String,
    pub computable: bool,
}

/// Customer fields as plain strings for form inputs.
pub struct CustomerFields {
    pub name: String,
    pub company: String,
    pub address_line1: String,
    pub address_line2: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub phone: String,
    pub email: String,
}

impl From<&Customer> for CustomerFields {
    fn from(c: &Customer) -> Self {
        Self {
            name: c.name.clone(),
            company: c.company.clone().unwrap_or_default(),
            address_line1: c.address_line1.clone(),
            address_line2: c.address_line2.clone().unwrap_or_default(),
            city: c.city.clone(),
            state: c.state.clone(),
            zip: c.zip.clone(),
            phone: c.phone.clone().unwrap_or_default(),
            email: c.email.clone().unwrap_or_default(),
        }
    }
}

#[derive(Template)]
#[template(path = "builder.html")]
pub struct BuilderTemplate {
    pub kind_label: &'static str,
    pub kind_slug: &'static str,
    pub is_quotation: bool,
    pub due_label: &'static str,
    pub number: String,
    pub relationship_manager: String,
    pub managers: Vec<SelectOption>,
    pub issue_date: String,
    pub due_date: String,
    pub customer: CustomerFields,
    pub lines: Vec<BuilderLine>,
    pub subtotal: String,
    pub total_tax: String,
    pub grand_total: String,
    pub products: Vec<ProductRow>,
    pub query: String,
    pub errors: Vec<String>,
    pub messages: Vec<Flash>,
}

async fn render_builder(
    state: &AppState,
    draft: &DocumentDraft,
    query: String,
    errors: Vec<String>,
    messages: Vec<Flash>,
) -> BuilderTemplate {
    let symbol = &state.config.currency_symbol;
    let kind = draft.kind;

    let products = {
        let catalog = state.catalog.read().await;
        catalog
            .search(&query)
            .into_iter()
            .take(MAX_PRODUCT_RESULTS)
            .map(|p| ProductRow::new(p, symbol))
            .collect()
    };

    let mut managers: Vec<SelectOption> = state
        .config
        .relationship_managers
        .iter()
        .map(|m| SelectOption {
            value: m.clone(),
            label: m.clone(),
            selected: *m == draft.relationship_manager,
        })
        .collect();
    if !managers.is_empty()
        && !draft.relationship_manager.is_empty()
        && !managers.iter().any(|m| m.selected)
    {
        managers.push(SelectOption {
            value: draft.relationship_manager.clone(),
            label: draft.relationship_manager.clone(),
            selected: true,
        });
    }

    BuilderTemplate {
        kind_label: kind.label(),
        kind_slug: kind.as_str(),
        is_quotation: kind == DocumentKind::Quotation,
        due_label: match kind {
            DocumentKind::Quotation => "Valid Until",
            DocumentKind::Invoice => "Due Date",
        },
        number: draft.number.clone(),
        relationship_manager: draft.relationship_manager.clone(),
        managers,
        issue_date: draft.issue_date.map(|d| d.to_string()).unwrap_or_default(),
        due_date: draft.due_date.map(|d| d.to_string()).unwrap_or_default(),
        customer: CustomerFields::from(&draft.customer),
        lines: draft
            .lines
            .iter()
            .enumerate()
            .map(|(index, line)| BuilderLine {
                index,
                title: line.title.clone(),
                image_src: line.image_src.clone(),
                quantity: line.quantity.clone(),
                unit_price: line.unit_price.clone(),
                gst_rate: line.gst_rate.clone(),
                tax_amount: format_money(line.amounts.tax_amount, symbol),
                total_amount: format_money(line.amounts.total_amount, symbol),
                computable: line.computable,
            })
            .collect(),
        subtotal: format_money(draft.totals.subtotal, symbol),
        total_tax: format_money(draft.totals.total_tax, symbol),
        grand_total: format_money(draft.totals.grand_total, symbol),
        products,
        query,
        errors,
        messages,
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BuilderQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn builder_page(
    State(state): State<AppState>,
    session: Session,
    Path(kind): Path<DocumentKind>,
    Query(query): Query<BuilderQuery>,
) -> Result<impl IntoResponse, AppError> {
    let draft = load_draft(&state, &session, kind).await?;
    let messages = take_flash(&session).await;
    Ok(render_builder(&state, &draft, query.q, Vec::new(), messages).await)
}

#[derive(Debug, Deserialize)]
pub struct AddItemForm {
    pub product_id: String,
}

pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    Path(kind): Path<DocumentKind>,
    Form(form): Form<AddItemForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut draft = load_draft(&state, &session, kind).await?;

    let product = state.catalog.read().await.get(&form.product_id).cloned();
    match product {
        Some(product) => {
            draft.add_product(&product);
            save_draft(&session, &draft).await?;
        }
        None => {
            push_flash(
                &session,
                FlashLevel::Error,
                format!("Product '{}' not found", form.product_id),
            )
            .await?
        }
    }
    Ok(Redirect::to(&builder_url(kind)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemForm {
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub unit_price: String,
    #[serde(default)]
    pub gst_rate: String,
}

pub async fn update_item(
    State(state): State<AppState>,
    session: Session,
    Path((kind, index)): Path<(DocumentKind, usize)>,
    Form(form): Form<UpdateItemForm>,
) -> Result<impl IntoResponse, AppError> {
    let mut draft = load_draft(&state, &session, kind).await?;
    if draft.update_line(index, &form.quantity, &form.unit_price, &form.gst_rate) {
        save_draft(&session, &draft).await?;
    } else {
        push_flash(&session, FlashLevel::Error, format!("Line {} not found", index + 1)).await?;
    }
    Ok(Redirect::to(&builder_url(kind)))
}

pub async fn remove_item(
    State(state): State<AppState>,
    session: Session,
    Path((kind, index)): Path<(DocumentKind, usize)>,
) -> Result<impl IntoResponse, AppError> {
    let mut draft = load_draft(&state, &session, kind).await?;
    if draft.remove_line(index) {
        save_draft(&session, &draft).await?;
    } else {
        push_flash(&session, FlashLevel::Error, format!("Line {} not found", index + 1)).await?;
    }
    Ok(Redirect::to(&builder_url(kind)))
}

pub async fn update_details(
    State(state): State<AppState>,
    session: Session,
    Path(kind): Path<DocumentKind>,
    Form(details): Form<DraftDetails>,
) -> Result<impl IntoResponse, AppError> {
    let mut draft = load_draft(&state, &session, kind).await?;
    draft.update_details(details);
    save_draft(&session, &draft).await?;
    Ok(Redirect::to(&builder_url(kind)))
}

/// Apply the submitted details, validate like the JSON API and persist.
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    Path(kind): Path<DocumentKind>,
    Form(details): Form<DraftDetails>,
) -> Result<Response, AppError> {
    let mut draft = load_draft(&state, &session, kind).await?;
    draft.update_details(details);
    save_draft(&session, &draft).await?;

    let created = match kind {
        DocumentKind::Quotation => {
            match draft.to_quotation_request().into_new_quotation(&state.config) {
                Ok(new) => Ok(state.store.create_quotation(new).await?.id),
                Err(e) => Err(e),
            }
        }
        DocumentKind::Invoice => match draft.to_invoice_request().into_new_invoice(&state.config) {
            Ok(new) => Ok(state.store.create_invoice(new).await?.id),
            Err(e) => Err(e),
        },
    };

    let id = match created {
        Ok(id) => id,
        Err(e) if e.is_client_error() => {
            let errors = match &e {
                AppError::ValidationError(errors) => crate::dtos::validation_messages(errors),
                other => vec![client_message(other)],
            };
            let page = render_builder(&state, &draft, String::new(), errors, Vec::new()).await;
            return Ok((StatusCode::BAD_REQUEST, page).into_response());
        }
        Err(e) => return Err(e),
    };

    metrics::record_document_created(kind);
    tracing::info!(kind = %kind, document_id = %id, number = %draft.number, "Document submitted from builder");

    session
        .insert(LAST_CUSTOMER_KEY, &draft.customer)
        .await
        .map_err(session_error)?;
    session
        .remove_value(&draft_key(kind))
        .await
        .map_err(session_error)?;

    Ok(Redirect::to(&format!("/{}s/{}/preview", kind, id)).into_response())
}

pub async fn reset(
    session: Session,
    Path(kind): Path<DocumentKind>,
) -> Result<impl IntoResponse, AppError> {
    session
        .remove_value(&draft_key(kind))
        .await
        .map_err(session_error)?;
    Ok(Redirect::to(&builder_url(kind)))
}
