//! Domain models for quotation-service.

mod customer;
mod document;
mod line_item;
mod product;

pub use customer::{CompanyInfo, Customer, PaymentInstructions};
pub use document::{
    generate_id, is_valid_id, DocumentKind, InvalidStatus, Invoice, NewInvoice, NewQuotation,
    Quotation, QuotationFilter, QuotationStatus,
};
pub use line_item::{LineItem, LineItemError};
pub use product::Product;
