use crate::config::QuotationConfig;
use crate::models::{
    CompanyInfo, Customer, Invoice, LineItem, NewInvoice, NewQuotation, PaymentInstructions,
    Quotation, QuotationFilter, QuotationStatus,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, message = "Customer name is required"))]
    pub name: String,
    #[serde(default, deserialize_with = "super::trimmed_option")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "super::trimmed")]
    pub address_line1: String,
    #[serde(default, deserialize_with = "super::trimmed_option")]
    pub address_line2: Option<String>,
    #[serde(default, deserialize_with = "super::trimmed")]
    pub city: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    pub state: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    pub zip: String,
    #[serde(default, deserialize_with = "super::trimmed_option")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "super::trimmed_option")]
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

impl CustomerRequest {
    fn missing_address_fields(&self) -> Vec<&'static str> {
        [
            ("address line 1", &self.address_line1),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(label, _)| label)
        .collect()
    }
}

impl From<CustomerRequest> for Customer {
    fn from(req: CustomerRequest) -> Self {
        Customer {
            name: req.name,
            company: req.company,
            address_line1: req.address_line1,
            address_line2: req.address_line2,
            city: req.city,
            state: req.state,
            zip: req.zip,
            phone: req.phone,
            email: req.email,
        }
    }
}

impl From<&Customer> for CustomerRequest {
    fn from(customer: &Customer) -> Self {
        CustomerRequest {
            name: customer.name.clone(),
            company: customer.company.clone(),
            address_line1: customer.address_line1.clone(),
            address_line2: customer.address_line2.clone(),
            city: customer.city.clone(),
            state: customer.state.clone(),
            zip: customer.zip.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
        }
    }
}

/// One requested line. Derived amounts sent by the client are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemRequest {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image_src: String,
    #[serde(default)]
    pub quantity: i64,
    pub unit_price: Option<Decimal>,
    pub gst_rate: Option<Decimal>,
}

fn build_items(items: Vec<LineItemRequest>) -> Result<Vec<LineItem>, AppError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let position = index + 1;
            let unit_price = item.unit_price.ok_or_else(|| {
                AppError::bad_request(format!("Item {}: unit price is required", position))
            })?;
            let gst_rate = item.gst_rate.ok_or_else(|| {
                AppError::bad_request(format!("Item {}: GST rate is required", position))
            })?;
            LineItem::new(
                item.product_id,
                item.title,
                item.image_src,
                item.quantity,
                unit_price,
                gst_rate,
            )
            .map_err(|e| AppError::bad_request(format!("Item {}: {}", position, e)))
        })
        .collect()
}

fn required_date(date: Option<NaiveDate>, label: &str) -> Result<NaiveDate, AppError> {
    date.ok_or_else(|| AppError::bad_request(format!("{} is required", label)))
}

fn thank_you_or_default(message: Option<String>, config: &QuotationConfig) -> Option<String> {
    message
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty())
        .or_else(|| Some(config.thank_you_message.clone()))
        .filter(|m| !m.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuotationRequest {
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, message = "Quotation number is required"))]
    pub quotation_number: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, message = "Relationship manager is required"))]
    pub relationship_manager: String,
    #[serde(default, deserialize_with = "super::trimmed_option")]
    pub status: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(nested)]
    pub customer: CustomerRequest,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<LineItemRequest>,
    pub company_info: Option<CompanyInfo>,
    pub payment_instructions: Option<PaymentInstructions>,
    pub thank_you_message: Option<String>,
}

impl CreateQuotationRequest {
    /// Validate and turn into a storable quotation, filling company details
    /// from configuration when the request has none.
    pub fn into_new_quotation(self, config: &QuotationConfig) -> Result<NewQuotation, AppError> {
        self.validate()?;

        let status = match self.status.as_deref() {
            Some(raw) => raw
                .parse::<QuotationStatus>()
                .map_err(AppError::bad_request)?,
            None => QuotationStatus::default(),
        };

        Ok(NewQuotation {
            quotation_number: self.quotation_number,
            relationship_manager: self.relationship_manager,
            status,
            issue_date: required_date(self.issue_date, "Issue date")?,
            due_date: required_date(self.due_date, "Valid until date")?,
            customer: self.customer.into(),
            items: build_items(self.items)?,
            company_info: self.company_info.unwrap_or_else(|| config.company.clone()),
            payment_instructions: self
                .payment_instructions
                .unwrap_or_else(|| config.payment.clone()),
            thank_you_message: thank_you_or_default(self.thank_you_message, config),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvoiceRequest {
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, message = "Invoice number is required"))]
    pub invoice_number: String,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(nested)]
    pub customer: CustomerRequest,
    #[serde(default)]
    #[validate(length(min = 1, message = "At least one item is required"))]
    pub items: Vec<LineItemRequest>,
    pub company_info: Option<CompanyInfo>,
    pub payment_instructions: Option<PaymentInstructions>,
    pub thank_you_message: Option<String>,
}

impl CreateInvoiceRequest {
    pub fn into_new_invoice(self, config: &QuotationConfig) -> Result<NewInvoice, AppError> {
        self.validate()?;

        let missing = self.customer.missing_address_fields();
        if !missing.is_empty() {
            return Err(AppError::bad_request(format!(
                "Customer {} required for invoices",
                if missing.len() == 1 {
                    format!("{} is", missing[0])
                } else {
                    format!("{} are", missing.join(", "))
                }
            )));
        }

        Ok(NewInvoice {
            invoice_number: self.invoice_number,
            issue_date: required_date(self.issue_date, "Issue date")?,
            due_date: required_date(self.due_date, "Due date")?,
            customer: self.customer.into(),
            items: build_items(self.items)?,
            company_info: self.company_info.unwrap_or_else(|| config.company.clone()),
            payment_instructions: self
                .payment_instructions
                .unwrap_or_else(|| config.payment.clone()),
            thank_you_message: thank_you_or_default(self.thank_you_message, config),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuotationsParams {
    #[serde(default, rename = "relationshipManager")]
    pub relationship_manager: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ListQuotationsParams {
    /// Blank values and unrecognised statuses mean "no filter".
    pub fn into_filter(self) -> QuotationFilter {
        QuotationFilter {
            relationship_manager: self
                .relationship_manager
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
            status: self.status.and_then(|s| s.parse().ok()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationCreatedResponse {
    pub message: String,
    pub quotation_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceCreatedResponse {
    pub message: String,
    pub invoice_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationResponse {
    pub id: String,
    pub quotation_number: String,
    pub relationship_manager: String,
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thank_you_message: Option<String>,
    pub created_at: String,
}

impl From<Quotation> for QuotationResponse {
    fn from(q: Quotation) -> Self {
        Self {
            id: q.id,
            quotation_number: q.quotation_number,
            relationship_manager: q.relationship_manager,
            status: q.status,
            issue_date: q.issue_date,
            due_date: q.due_date,
            customer: q.customer,
            items: q.items,
            subtotal: q.subtotal,
            total_tax: q.total_tax,
            grand_total: q.grand_total,
            company_info: q.company_info,
            payment_instructions: q.payment_instructions,
            thank_you_message: q.thank_you_message,
            created_at: q.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
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
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thank_you_message: Option<String>,
    pub created_at: String,
}

impl From<Invoice> for InvoiceResponse {
    fn from(i: Invoice) -> Self {
        Self {
            id: i.id,
            invoice_number: i.invoice_number,
            issue_date: i.issue_date,
            due_date: i.due_date,
            customer: i.customer,
            items: i.items,
            subtotal: i.subtotal,
            total_tax: i.total_tax,
            grand_total: i.grand_total,
            company_info: i.company_info,
            payment_instructions: i.payment_instructions,
            thank_you_message: i.thank_you_message,
            created_at: i.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> QuotationConfig {
        QuotationConfig::for_memory_store("unused.json")
    }

    fn quotation_json() -> serde_json::Value {
        json!({
            "quotationNumber": "QUO-0001",
            "relationshipManager": "Priya",
            "issueDate": "2024-06-01",
            "dueDate": "2024-07-01",
            "customer": { "name": "City Clinic", "email": "" },
            "items": [
                { "productId": "PO-1", "title": "Pulse Oximeter", "quantity": 2,
                  "unitPrice": 118, "gstRate": 18, "taxAmount": 999, "totalAmount": 1 }
            ]
        })
    }

    #[test]
    fn recomputes_amounts_and_applies_defaults() {
        let request: CreateQuotationRequest = serde_json::from_value(quotation_json()).unwrap();
        let new = request.into_new_quotation(&config()).unwrap();

        assert_eq!(new.status, QuotationStatus::InProcess);
        assert_eq!(new.items[0].tax_amount, Decimal::from(36));
        assert_eq!(new.items[0].total_amount, Decimal::from(236));
        assert_eq!(new.customer.email, None);
        assert_eq!(new.company_info.name, "Acme Medical Supplies");
        assert_eq!(new.thank_you_message.as_deref(), Some("Thank you for your business!"));
    }

    #[test]
    fn empty_items_are_rejected() {
        let mut body = quotation_json();
        body["items"] = json!([]);
        let request: CreateQuotationRequest = serde_json::from_value(body).unwrap();

        let err = request.into_new_quotation(&config()).unwrap_err();
        match err {
            AppError::ValidationError(errors) => {
                assert_eq!(
                    crate::dtos::validation_messages(&errors),
                    vec!["At least one item is required".to_string()]
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn invoice_without_items_is_rejected() {
        let mut body = quotation_json();
        body["invoiceNumber"] = json!("INV-0001");
        body["items"] = json!([]);
        let request: CreateInvoiceRequest = serde_json::from_value(body).unwrap();

        match request.into_new_invoice(&config()).unwrap_err() {
            AppError::ValidationError(errors) => assert!(errors.field_errors().contains_key("items")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn created_responses_name_the_document_id() {
        let body = serde_json::to_value(QuotationCreatedResponse {
            message: "Quotation saved successfully".to_string(),
            quotation_id: "q1".to_string(),
        })
        .unwrap();
        assert_eq!(body, json!({ "message": "Quotation saved successfully", "quotationId": "q1" }));

        let body = serde_json::to_value(InvoiceCreatedResponse {
            message: "Invoice saved successfully".to_string(),
            invoice_id: "i1".to_string(),
        })
        .unwrap();
        assert_eq!(body["invoiceId"], "i1");
    }

    #[test]
    fn blank_number_is_rejected() {
        let mut body = quotation_json();
        body["quotationNumber"] = json!("   ");
        let request: CreateQuotationRequest = serde_json::from_value(body).unwrap();
        assert!(matches!(
            request.into_new_quotation(&config()),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn invalid_status_and_item_errors_are_bad_requests() {
        let mut body = quotation_json();
        body["status"] = json!("Pending");
        let request: CreateQuotationRequest = serde_json::from_value(body).unwrap();
        assert!(matches!(
            request.into_new_quotation(&config()),
            Err(AppError::BadRequest(_))
        ));

        let mut body = quotation_json();
        body["items"][0]["quantity"] = json!(0);
        let request: CreateQuotationRequest = serde_json::from_value(body).unwrap();
        let err = request.into_new_quotation(&config()).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: Item 1: quantity must be at least 1");
    }

    #[test]
    fn invoices_require_an_address() {
        let mut body = quotation_json();
        body["invoiceNumber"] = json!("INV-0001");
        let request: CreateInvoiceRequest = serde_json::from_value(body.clone()).unwrap();
        let err = request.into_new_invoice(&config()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request: Customer address line 1, city, state, zip are required for invoices"
        );

        body["customer"] = json!({
            "name": "City Clinic", "addressLine1": "1 Main St",
            "city": "Pune", "state": "MH", "zip": "411001"
        });
        let request: CreateInvoiceRequest = serde_json::from_value(body).unwrap();
        let invoice = request.into_new_invoice(&config()).unwrap();
        assert_eq!(invoice.customer.city_line(), "Pune, MH 411001");
    }

    #[test]
    fn list_params_ignore_unknown_status() {
        let filter = ListQuotationsParams {
            relationship_manager: Some(" ".to_string()),
            status: Some("Maybe".to_string()),
        }
        .into_filter();
        assert_eq!(filter, QuotationFilter::default());

        let filter = ListQuotationsParams {
            relationship_manager: Some("Priya".to_string()),
            status: Some("Won".to_string()),
        }
        .into_filter();
        assert_eq!(filter.status, Some(QuotationStatus::Won));
    }
}
