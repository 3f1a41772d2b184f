//! Line item embedded in a quotation or invoice.

use crate::pricing::{self, LineAmounts};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineItemError {
    #[error("product id is required")]
    MissingProduct,
    #[error("title is required")]
    MissingTitle,
    #[error("quantity must be at least 1")]
    InvalidQuantity,
    #[error("unit price must be 0 or greater")]
    InvalidUnitPrice,
    #[error("GST rate must be 0 or greater")]
    InvalidGstRate,
    #[error("amounts are too large to compute")]
    Overflow,
}

/// One product entry of a document.
///
/// `tax_amount` and `total_amount` are derived from `unit_price`, `quantity`
/// and `gst_rate`. [`LineItem::new`] validates the inputs and computes them;
/// values deserialized from storage are taken as stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub title: String,
    #[serde(default)]
    pub image_src: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub gst_rate: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

impl LineItem {
    pub fn new(
        product_id: impl Into<String>,
        title: impl Into<String>,
        image_src: impl Into<String>,
        quantity: i64,
        unit_price: Decimal,
        gst_rate: Decimal,
    ) -> Result<Self, LineItemError> {
        let product_id = product_id.into();
        let title = title.into();

        if product_id.trim().is_empty() {
            return Err(LineItemError::MissingProduct);
        }
        if title.trim().is_empty() {
            return Err(LineItemError::MissingTitle);
        }
        let quantity_u32 = u32::try_from(quantity)
            .ok()
            .filter(|q| *q >= 1)
            .ok_or(LineItemError::InvalidQuantity)?;
        if unit_price < Decimal::ZERO {
            return Err(LineItemError::InvalidUnitPrice);
        }
        if gst_rate < Decimal::ZERO {
            return Err(LineItemError::InvalidGstRate);
        }

        let amounts =
            pricing::line_amounts(unit_price, quantity, gst_rate).ok_or(LineItemError::Overflow)?;

        Ok(Self {
            product_id,
            title,
            image_src: image_src.into(),
            quantity: quantity_u32,
            unit_price,
            gst_rate,
            tax_amount: amounts.tax_amount,
            total_amount: amounts.total_amount,
        })
    }

    pub fn amounts(&self) -> LineAmounts {
        LineAmounts {
            tax_amount: self.tax_amount,
            total_amount: self.total_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_derives_amounts() {
        let item = LineItem::new("SKU-1", "Pulse Oximeter", "", 2, Decimal::from(118), Decimal::from(18))
            .unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.tax_amount, Decimal::from(36));
        assert_eq!(item.total_amount, Decimal::from(236));
    }

    #[test]
    fn new_rejects_invalid_fields() {
        let price = Decimal::from(10);
        let rate = Decimal::from(5);
        assert_eq!(
            LineItem::new("", "t", "", 1, price, rate),
            Err(LineItemError::MissingProduct)
        );
        assert_eq!(
            LineItem::new("p", " ", "", 1, price, rate),
            Err(LineItemError::MissingTitle)
        );
        assert_eq!(
            LineItem::new("p", "t", "", 0, price, rate),
            Err(LineItemError::InvalidQuantity)
        );
        assert_eq!(
            LineItem::new("p", "t", "", i64::from(u32::MAX) + 1, price, rate),
            Err(LineItemError::InvalidQuantity)
        );
        assert_eq!(
            LineItem::new("p", "t", "", 1, Decimal::NEGATIVE_ONE, rate),
            Err(LineItemError::InvalidUnitPrice)
        );
        assert_eq!(
            LineItem::new("p", "t", "", 1, price, Decimal::NEGATIVE_ONE),
            Err(LineItemError::InvalidGstRate)
        );
    }

    #[test]
    fn deserializes_camel_case_json() {
        let item: LineItem = serde_json::from_value(serde_json::json!({
            "productId": "SKU-9",
            "title": "Glucometer",
            "quantity": 1,
            "unitPrice": "500",
            "gstRate": "12",
            "taxAmount": "53.57",
            "totalAmount": "500"
        }))
        .unwrap();
        assert_eq!(item.image_src, "");
        assert_eq!(item.unit_price, Decimal::from(500));
        assert_eq!(item.tax_amount, Decimal::new(5357, 2));
    }
}
