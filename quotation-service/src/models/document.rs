use crate::models::{CompanyInfo, Customer, LineItem, PaymentInstructions};
use crate::pricing::{self, DocumentTotals};
use chrono::{DateTime, NaiveDate, Utc};
use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Quotation,
    Invoice,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Quotation, DocumentKind::Invoice];

    /// Prefix of generated document numbers.
    pub fn number_prefix(self) -> &'static str {
        match self {
            DocumentKind::Quotation => "QUO",
            DocumentKind::Invoice => "INV",
        }
    }

    pub fn collection(self) -> &'static str {
        match self {
            DocumentKind::Quotation => "quotations",
            DocumentKind::Invoice => "invoices",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Quotation => "quotation",
            DocumentKind::Invoice => "invoice",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DocumentKind::Quotation => "Quotation",
            DocumentKind::Invoice => "Invoice",
        }
    }

    /// Document number for the `sequence`-th document of this kind, e.g. `QUO-0007`.
    pub fn format_number(self, sequence: u64) -> String {
        format!("{}-{:04}", self.number_prefix(), sequence)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid status '{0}'. Expected one of: In Process, Won, Lost")]
pub struct InvalidStatus(pub String);

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum QuotationStatus {
    #[default]
    #[serde(rename = "In Process")]
    InProcess,
    Won,
    Lost,
}

impl QuotationStatus {
    pub const ALL: [QuotationStatus; 3] = [
        QuotationStatus::InProcess,
        QuotationStatus::Won,
        QuotationStatus::Lost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            QuotationStatus::InProcess => "In Process",
            QuotationStatus::Won => "Won",
            QuotationStatus::Lost => "Lost",
        }
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuotationStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "In Process" => Ok(QuotationStatus::InProcess),
            "Won" => Ok(QuotationStatus::Won),
            "Lost" => Ok(QuotationStatus::Lost),
            other => Err(InvalidStatus(other.to_string())),
        }
    }
}

/// Server-side id for a newly persisted document.
pub fn generate_id() -> String {
    ObjectId::new().to_hex()
}

/// Whether `id` has the shape of a generated id. Anything else can never match.
pub fn is_valid_id(id: &str) -> bool {
    ObjectId::parse_str(id).is_ok()
}

/// A quotation as submitted, before the store assigns an id and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuotation {
    pub quotation_number: String,
    pub relationship_manager: String,
    pub status: QuotationStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub company_info: CompanyInfo,
    pub payment_instructions: PaymentInstructions,
    pub thank_you_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub company_info: CompanyInfo,
    pub payment_instructions: PaymentInstructions,
    pub thank_you_message: Option<String>,
}

fn totals_of(items: &[LineItem]) -> DocumentTotals {
    pricing::document_totals(items.iter().map(LineItem::amounts))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    #[serde(rename = "_id")]
    pub id: String,
    pub quotation_number: String,
    pub relationship_manager: String,
    #[serde(default)]
    pub status: QuotationStatus,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
    pub company_info: CompanyInfo,
    pub payment_instructions: PaymentInstructions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thank_you_message: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Quotation {
    /// Assign an id and creation time; totals are always derived from the items.
    pub fn from_new(new: NewQuotation) -> Self {
        let totals = totals_of(&new.items);
        Self {
            id: generate_id(),
            quotation_number: new.quotation_number,
            relationship_manager: new.relationship_manager,
            status: new.status,
            issue_date: new.issue_date,
            due_date: new.due_date,
            customer: new.customer,
            items: new.items,
            subtotal: totals.subtotal,
            total_tax: totals.total_tax,
            grand_total: totals.grand_total,
            company_info: new.company_info,
            payment_instructions: new.payment_instructions,
            thank_you_message: new.thank_you_message,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(rename = "_id")]
    pub id: String,
    pub invoice_number: String,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
    pub company_info: CompanyInfo,
    pub payment_instructions: PaymentInstructions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thank_you_message: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    pub fn from_new(new: NewInvoice) -> Self {
        let totals = totals_of(&new.items);
        Self {
            id: generate_id(),
            invoice_number: new.invoice_number,
            issue_date: new.issue_date,
            due_date: new.due_date,
            customer: new.customer,
            items: new.items,
            subtotal: totals.subtotal,
            total_tax: totals.total_tax,
            grand_total: totals.grand_total,
            company_info: new.company_info,
            payment_instructions: new.payment_instructions,
            thank_you_message: new.thank_you_message,
            created_at: Utc::now(),
        }
    }
}

/// Optional filters for listing quotations. `None` means "any".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotationFilter {
    pub relationship_manager: Option<String>,
    pub status: Option<QuotationStatus>,
}

impl QuotationFilter {
    pub fn matches(&self, quotation: &Quotation) -> bool {
        let manager_ok = self
            .relationship_manager
            .as_deref()
            .is_none_or(|m| quotation.relationship_manager == m);
        let status_ok = self.status.is_none_or(|s| quotation.status == s);
        manager_ok && status_ok
    }
}
