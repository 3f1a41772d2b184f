//! Catalog product model.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchasable item in the browser-facing catalog.
///
/// `variant_price` is the tax-inclusive unit price and `gst` the tax rate in
/// percent (18 means 18%).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub size: String,
    pub sku: String,
    pub cost_price: Decimal,
    pub variant_price: Decimal,
    pub gst: Decimal,
    #[serde(default)]
    pub image_src: String,
}

impl Product {
    /// Two products describe the same catalog entry when id or SKU coincide.
    pub fn same_entry(&self, other: &Product) -> bool {
        self.id == other.id || self.sku == other.sku
    }

    /// Case-insensitive match on title or SKU.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&query) || self.sku.to_lowercase().contains(&query)
    }
}
