//! Draft documents being composed in the builder pages.
//!
//! A draft keeps the user's raw text for every editable number so the page can
//! redisplay exactly what was typed. Line and document amounts are recomputed
//! after every mutation; a line whose inputs do not parse has zero amounts.

use crate::dtos::{CreateInvoiceRequest, CreateQuotationRequest, CustomerRequest, LineItemRequest};
use crate::models::{Customer, DocumentKind, Product};
use crate::pricing::{self, DocumentTotals, LineAmounts};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Days between issue date and due / valid-until date of a fresh draft.
pub const DEFAULT_TERM_DAYS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DraftLine {
    pub product_id: String,
    pub title: String,
    pub image_src: String,
    pub quantity: String,
    pub unit_price: String,
    pub gst_rate: String,
    pub amounts: LineAmounts,
    pub computable: bool,
}

impl DraftLine {
    fn from_product(product: &Product) -> Self {
        let mut line = Self {
            product_id: product.id.clone(),
            title: product.title.clone(),
            image_src: product.image_src.clone(),
            quantity: "1".to_string(),
            unit_price: product.variant_price.to_string(),
            gst_rate: product.gst.to_string(),
            ..Default::default()
        };
        line.recalculate();
        line
    }

    fn parsed_quantity(&self) -> Option<i64> {
        self.quantity.trim().parse().ok()
    }

    fn parsed_unit_price(&self) -> Option<Decimal> {
        self.unit_price.trim().parse().ok()
    }

    fn parsed_gst_rate(&self) -> Option<Decimal> {
        self.gst_rate.trim().parse().ok()
    }

    fn recalculate(&mut self) {
        let amounts = match (
            self.parsed_unit_price(),
            self.parsed_quantity(),
            self.parsed_gst_rate(),
        ) {
            (Some(price), Some(quantity), Some(rate)) => {
                pricing::line_amounts(price, quantity, rate)
            }
            _ => None,
        };
        self.computable = amounts.is_some();
        self.amounts = amounts.unwrap_or_default();
    }

    fn to_request(&self) -> LineItemRequest {
        LineItemRequest {
            product_id: self.product_id.clone(),
            title: self.title.clone(),
            image_src: self.image_src.clone(),
            quantity: self.parsed_quantity().unwrap_or_default(),
            unit_price: self.parsed_unit_price(),
            gst_rate: self.parsed_gst_rate(),
        }
    }
}

/// Header fields edited together on the builder page.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftDetails {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub relationship_manager: String,
    #[serde(default)]
    pub issue_date: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(flatten)]
    pub customer: CustomerRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentDraft {
    pub kind: DocumentKind,
    pub number: String,
    pub relationship_manager: String,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub customer: Customer,
    pub lines: Vec<DraftLine>,
    pub totals: DocumentTotals,
}

impl DocumentDraft {
    /// Fresh draft for the `sequence`-th document of `kind`.
    pub fn new(kind: DocumentKind, sequence: u64, today: NaiveDate, customer: Customer) -> Self {
        Self {
            kind,
            number: kind.format_number(sequence),
            relationship_manager: String::new(),
            issue_date: Some(today),
            due_date: today.checked_add_days(Days::new(DEFAULT_TERM_DAYS)),
            customer,
            lines: Vec::new(),
            totals: DocumentTotals::default(),
        }
    }

    pub fn add_product(&mut self, product: &Product) {
        self.lines.push(DraftLine::from_product(product));
        self.recalculate();
    }

    /// Replace the editable numbers of line `index` with raw user input.
    /// Returns false when there is no such line.
    pub fn update_line(
        &mut self,
        index: usize,
        quantity: &str,
        unit_price: &str,
        gst_rate: &str,
    ) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        line.quantity = quantity.trim().to_string();
        line.unit_price = unit_price.trim().to_string();
        line.gst_rate = gst_rate.trim().to_string();
        self.recalculate();
        true
    }

    pub fn remove_line(&mut self, index: usize) -> bool {
        if index >= self.lines.len() {
            return false;
        }
        self.lines.remove(index);
        self.recalculate();
        true
    }

    /// Unparseable dates clear the field; submit reports it as missing.
    pub fn update_details(&mut self, details: DraftDetails) {
        self.number = details.number.trim().to_string();
        self.relationship_manager = details.relationship_manager.trim().to_string();
        self.issue_date = parse_date(&details.issue_date);
        self.due_date = parse_date(&details.due_date);
        self.customer = details.customer.into();
    }

    pub fn recalculate(&mut self) {
        for line in &mut self.lines {
            line.recalculate();
        }
        self.totals = pricing::document_totals(self.lines.iter().map(|l| l.amounts));
    }

    pub fn to_quotation_request(&self) -> CreateQuotationRequest {
        CreateQuotationRequest {
            quotation_number: self.number.clone(),
            relationship_manager: self.relationship_manager.clone(),
            status: None,
            issue_date: self.issue_date,
            due_date: self.due_date,
            customer: CustomerRequest::from(&self.customer),
            items: self.lines.iter().map(DraftLine::to_request).collect(),
            company_info: None,
            payment_instructions: None,
            thank_you_message: None,
        }
    }

    pub fn to_invoice_request(&self) -> CreateInvoiceRequest {
        CreateInvoiceRequest {
            invoice_number: self.number.clone(),
            issue_date: self.issue_date,
            due_date: self.due_date,
            customer: CustomerRequest::from(&self.customer),
            items: self.lines.iter().map(DraftLine::to_request).collect(),
            company_info: None,
            payment_instructions: None,
            thank_you_message: None,
        }
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuotationConfig;

    fn product(sku: &str, price: i64, gst: i64) -> Product {
        Product {
            id: sku.to_string(),
            title: format!("Product {}", sku),
            size: "Standard".to_string(),
            sku: sku.to_string(),
            cost_price: Decimal::ZERO,
            variant_price: Decimal::from(price),
            gst: Decimal::from(gst),
            image_src: String::new(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn fresh_draft_has_number_and_dates() {
        let draft = DocumentDraft::new(DocumentKind::Invoice, 7, today(), Customer::default());
        assert_eq!(draft.number, "INV-0007");
        assert_eq!(draft.issue_date, Some(today()));
        assert_eq!(draft.due_date, NaiveDate::from_ymd_opt(2024, 2, 14));
        assert!(draft.lines.is_empty());
    }

    #[test]
    fn every_edit_recomputes_totals() {
        let mut draft = DocumentDraft::new(DocumentKind::Quotation, 1, today(), Customer::default());
        draft.add_product(&product("A", 118, 18));
        assert_eq!(draft.totals.grand_total, Decimal::from(118));
        assert_eq!(draft.totals.total_tax, Decimal::from(18));

        draft.add_product(&product("B", 100, 0));
        assert!(draft.update_line(0, "2", "118", "18"));
        assert!(draft.update_line(1, " 3 ", "100", "0"));
        assert_eq!(draft.totals.grand_total, Decimal::from(536));
        assert_eq!(draft.totals.total_tax, Decimal::from(36));
        assert_eq!(draft.totals.subtotal, Decimal::from(500));

        assert!(draft.remove_line(1));
        assert_eq!(draft.totals.grand_total, Decimal::from(236));
        assert!(!draft.remove_line(5));
        assert!(!draft.update_line(5, "1", "1", "1"));
    }

    #[test]
    fn non_numeric_input_zeroes_the_line() {
        let mut draft = DocumentDraft::new(DocumentKind::Quotation, 1, today(), Customer::default());
        draft.add_product(&product("A", 118, 18));
        draft.add_product(&product("B", 100, 0));

        draft.update_line(0, "two", "118", "18");
        assert!(!draft.lines[0].computable);
        assert_eq!(draft.lines[0].amounts, LineAmounts::default());
        assert_eq!(draft.lines[0].quantity, "two");
        assert_eq!(draft.totals.grand_total, Decimal::from(100));

        draft.update_line(1, "0", "100", "0");
        assert_eq!(draft.totals, DocumentTotals::default());
    }

    #[test]
    fn submit_request_goes_through_validation() {
        let config = QuotationConfig::for_memory_store("unused.json");
        let mut draft = DocumentDraft::new(DocumentKind::Quotation, 1, today(), Customer::default());

        // No items, no customer, no manager yet.
        assert!(draft.to_quotation_request().into_new_quotation(&config).is_err());

        draft.add_product(&product("A", 118, 18));
        draft.update_details(DraftDetails {
            number: "QUO-0001".to_string(),
            relationship_manager: "Priya".to_string(),
            issue_date: "2024-01-15".to_string(),
            due_date: "2024-02-14".to_string(),
            customer: CustomerRequest {
                name: "City Clinic".to_string(),
                ..Default::default()
            },
        });

        let new = draft.to_quotation_request().into_new_quotation(&config).unwrap();
        assert_eq!(new.items.len(), 1);
        assert_eq!(new.items[0].total_amount, Decimal::from(118));
        assert_eq!(new.customer.name, "City Clinic");

        draft.update_line(0, "x", "118", "18");
        assert!(draft.to_quotation_request().into_new_quotation(&config).is_err());
    }

    #[test]
    fn bad_dates_are_cleared() {
        let mut draft = DocumentDraft::new(DocumentKind::Invoice, 1, today(), Customer::default());
        draft.update_details(DraftDetails {
            issue_date: "15/01/2024".to_string(),
            ..Default::default()
        });
        assert_eq!(draft.issue_date, None);
        assert_eq!(draft.due_date, None);
    }

    #[test]
    fn drafts_survive_serialization() {
        let mut draft = DocumentDraft::new(DocumentKind::Quotation, 3, today(), Customer::default());
        draft.add_product(&product("A", 50, 5));
        let json = serde_json::to_value(&draft).unwrap();
        let back: DocumentDraft = serde_json::from_value(json).unwrap();
        assert_eq!(back, draft);
    }
}
