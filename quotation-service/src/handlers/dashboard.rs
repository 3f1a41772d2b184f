use crate::models::QuotationFilter;
use crate::services::renderer::format_money;
use crate::services::QuotationStats;
use crate::AppState;
use askama::Template;
use axum::{extract::State, response::IntoResponse, Json};
use service_core::error::AppError;

pub struct StatusBar {
    pub label: &'static str,
    pub count: usize,
    pub percent: u32,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub total_quotations: usize,
    pub in_process_count: usize,
    pub won_count: usize,
    pub lost_count: usize,
    pub total_value_won: String,
    pub average_quotation_value: String,
    pub bars: Vec<StatusBar>,
}

async fn load_stats(state: &AppState) -> Result<QuotationStats, AppError> {
    let quotations = state
        .store
        .list_quotations(&QuotationFilter::default())
        .await?;
    Ok(QuotationStats::from_quotations(&quotations))
}

pub async fn dashboard_page(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stats = load_stats(&state).await?;
    let symbol = &state.config.currency_symbol;

    Ok(DashboardTemplate {
        total_quotations: stats.total_quotations,
        in_process_count: stats.in_process_count,
        won_count: stats.won_count,
        lost_count: stats.lost_count,
        total_value_won: format_money(stats.total_value_won, symbol),
        average_quotation_value: format_money(stats.average_quotation_value, symbol),
        bars: stats
            .by_status
            .iter()
            .map(|s| StatusBar {
                label: s.status.as_str(),
                count: s.count,
                percent: s.percent,
            })
            .collect(),
    })
}

pub async fn dashboard_api(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(load_stats(&state).await?))
}
