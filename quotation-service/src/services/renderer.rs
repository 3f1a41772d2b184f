//! Printable HTML previews of stored documents.

use crate::models::{CompanyInfo, Customer, Invoice, LineItem, PaymentInstructions, Quotation};
use askama::Template;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use service_core::error::AppError;

/// Shown when a line has no product image.
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/100x100.png";

/// Amount with two decimals behind the currency symbol, e.g. `₹236.00`.
pub fn format_money(value: Decimal, currency_symbol: &str) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{}{:.2}", currency_symbol, rounded)
}

/// Rate with two decimals and a percent sign, e.g. `18.00%`.
pub fn format_percent(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", rounded)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}

pub struct PreviewLine {
    pub image_src: String,
    pub title: String,
    pub quantity: u32,
    pub unit_price: String,
    pub gst_rate: String,
    pub tax_amount: String,
    pub total_amount: String,
}

impl PreviewLine {
    fn new(item: &LineItem, currency_symbol: &str) -> Self {
        Self {
            image_src: if item.image_src.trim().is_empty() {
                PLACEHOLDER_IMAGE.to_string()
            } else {
                item.image_src.clone()
            },
            title: item.title.clone(),
            quantity: item.quantity,
            unit_price: format_money(item.unit_price, currency_symbol),
            gst_rate: format_percent(item.gst_rate),
            tax_amount: format_money(item.tax_amount, currency_symbol),
            total_amount: format_money(item.total_amount, currency_symbol),
        }
    }
}

/// Everything the preview template prints, already formatted.
pub struct PreviewView {
    pub kind_label: &'static str,
    pub number: String,
    pub issue_date: String,
    pub due_label: &'static str,
    pub due_date: String,
    pub relationship_manager: Option<String>,
    pub customer: Customer,
    pub customer_city_line: String,
    pub company: CompanyInfo,
    pub payment: PaymentInstructions,
    pub lines: Vec<PreviewLine>,
    pub subtotal: String,
    pub total_tax: String,
    pub grand_total: String,
    pub thank_you_message: Option<String>,
}

impl PreviewView {
    pub fn from_quotation(quotation: &Quotation, currency_symbol: &str) -> Self {
        Self {
            kind_label: "Quotation",
            number: quotation.quotation_number.clone(),
            issue_date: format_date(quotation.issue_date),
            due_label: "Valid Until",
            due_date: format_date(quotation.due_date),
            relationship_manager: Some(quotation.relationship_manager.clone())
                .filter(|m| !m.is_empty()),
            customer: quotation.customer.clone(),
            customer_city_line: quotation.customer.city_line(),
            company: quotation.company_info.clone(),
            payment: quotation.payment_instructions.clone(),
            lines: quotation
                .items
                .iter()
                .map(|item| PreviewLine::new(item, currency_symbol))
                .collect(),
            subtotal: format_money(quotation.subtotal, currency_symbol),
            total_tax: format_money(quotation.total_tax, currency_symbol),
            grand_total: format_money(quotation.grand_total, currency_symbol),
            thank_you_message: quotation.thank_you_message.clone(),
        }
    }

    pub fn from_invoice(invoice: &Invoice, currency_symbol: &str) -> Self {
        Self {
            kind_label: "Invoice",
            number: invoice.invoice_number.clone(),
            issue_date: format_date(invoice.issue_date),
            due_label: "Due Date",
            due_date: format_date(invoice.due_date),
            relationship_manager: None,
            customer: invoice.customer.clone(),
            customer_city_line: invoice.customer.city_line(),
            company: invoice.company_info.clone(),
            payment: invoice.payment_instructions.clone(),
            lines: invoice
                .items
                .iter()
                .map(|item| PreviewLine::new(item, currency_symbol))
                .collect(),
            subtotal: format_money(invoice.subtotal, currency_symbol),
            total_tax: format_money(invoice.total_tax, currency_symbol),
            grand_total: format_money(invoice.grand_total, currency_symbol),
            thank_you_message: invoice.thank_you_message.clone(),
        }
    }
}

#[derive(Template)]
#[template(path = "preview.html")]
pub struct PreviewTemplate {
    pub view: PreviewView,
}

pub fn render_preview(view: PreviewView) -> Result<String, AppError> {
    Ok(PreviewTemplate { view }.render()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewInvoice, NewQuotation, QuotationStatus};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    fn quotation() -> Quotation {
        Quotation::from_new(NewQuotation {
            quotation_number: "QUO-0009".to_string(),
            relationship_manager: "Priya".to_string(),
            status: QuotationStatus::InProcess,
            issue_date: day(),
            due_date: day(),
            customer: Customer {
                name: "<script>alert(1)</script>".to_string(),
                city: "Pune".to_string(),
                ..Default::default()
            },
            items: vec![
                LineItem::new("A", "Pulse Oximeter", "", 2, Decimal::from(118), Decimal::from(18))
                    .unwrap(),
            ],
            company_info: CompanyInfo {
                name: "Acme Medical Supplies".to_string(),
                ..Default::default()
            },
            payment_instructions: PaymentInstructions {
                payable_to: "Acme Medical Supplies".to_string(),
                bank_name: Some("First Bank".to_string()),
                ..Default::default()
            },
            thank_you_message: Some("Thanks!".to_string()),
        })
    }

    #[test]
    fn formats_amounts_and_rates() {
        assert_eq!(format_money(Decimal::from(236), "₹"), "₹236.00");
        assert_eq!(format_money("15.254237".parse().unwrap(), "$"), "$15.25");
        assert_eq!(format_money("0.005".parse().unwrap(), "₹"), "₹0.01");
        assert_eq!(format_percent(Decimal::from(18)), "18.00%");
        assert_eq!(format_percent("12.5".parse().unwrap()), "12.50%");
    }

    #[test]
    fn quotation_preview_has_all_sections() {
        let html = render_preview(PreviewView::from_quotation(&quotation(), "₹")).unwrap();

        assert!(html.contains("Quotation #QUO-0009"));
        assert!(html.contains("Valid Until"));
        assert!(html.contains("Relationship Manager"));
        assert!(html.contains("Priya"));
        assert!(html.contains("Pulse Oximeter"));
        assert!(html.contains("₹236.00"));
        assert!(html.contains("₹36.00"));
        assert!(html.contains("₹200.00"));
        assert!(html.contains("18.00%"));
        assert!(html.contains(PLACEHOLDER_IMAGE));
        assert!(html.contains("First Bank"));
        assert!(html.contains("Thanks!"));
    }

    #[test]
    fn output_is_escaped() {
        let html = render_preview(PreviewView::from_quotation(&quotation(), "₹")).unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn invoice_preview_shows_due_date() {
        let q = quotation();
        let invoice = Invoice::from_new(NewInvoice {
            invoice_number: "INV-0001".to_string(),
            issue_date: q.issue_date,
            due_date: q.due_date,
            customer: q.customer,
            items: q.items,
            company_info: q.company_info,
            payment_instructions: q.payment_instructions,
            thank_you_message: None,
        });

        let html = render_preview(PreviewView::from_invoice(&invoice, "₹")).unwrap();
        assert!(html.contains("Invoice #INV-0001"));
        assert!(html.contains("Due Date"));
        assert!(!html.contains("Valid Until"));
        assert!(!html.contains("Relationship Manager"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let q = quotation();
        let first = render_preview(PreviewView::from_quotation(&q, "₹")).unwrap();
        let second = render_preview(PreviewView::from_quotation(&q, "₹")).unwrap();
        assert_eq!(first, second);
    }
}
