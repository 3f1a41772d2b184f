use crate::models::Product;
use rust_decimal::Decimal;
use serde::Deserialize;
use service_core::error::AppError;
use validator::Validate;

/// Manual product entry from the catalog page.
///
/// Numbers arrive as text so a bad value is reported as a message instead of
/// a rejected form.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct NewProductRequest {
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    pub size: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    #[validate(length(min = 1, message = "SKU is required"))]
    pub sku: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    pub cost_price: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    pub variant_price: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    pub gst: String,
    #[serde(default, deserialize_with = "super::trimmed")]
    pub image_src: String,
}

fn non_negative(raw: &str, label: &str) -> Result<Decimal, AppError> {
    let value = raw
        .parse::<Decimal>()
        .map_err(|_| AppError::bad_request(format!("{} must be a number", label)))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::bad_request(format!("{} must be 0 or greater", label)));
    }
    Ok(value)
}

impl NewProductRequest {
    pub fn into_product(self) -> Result<Product, AppError> {
        self.validate()?;

        let cost_price = if self.cost_price.is_empty() {
            Decimal::ZERO
        } else {
            non_negative(&self.cost_price, "Cost price")?
        };
        let variant_price = non_negative(&self.variant_price, "Price")?;
        let gst = non_negative(&self.gst, "GST")?;

        Ok(Product {
            id: self.sku.clone(),
            title: self.title,
            size: if self.size.is_empty() {
                "Standard".to_string()
            } else {
                self.size
            },
            sku: self.sku,
            cost_price,
            variant_price,
            gst,
            image_src: self.image_src,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductSearchParams {
    #[serde(default)]
    pub q: String,
}
