//! Parties printed on a document: the customer, the issuing company and how to pay it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default)]
    pub address_line1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Customer {
    /// "City, State Zip" with empty parts left out.
    pub fn city_line(&self) -> String {
        let mut line = String::new();
        if !self.city.is_empty() {
            line.push_str(&self.city);
        }
        if !self.state.is_empty() {
            if !line.is_empty() {
                line.push_str(", ");
            }
            line.push_str(&self.state);
        }
        if !self.zip.is_empty() {
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&self.zip);
        }
        line
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: String,
    pub address: String,
    pub city_state_zip: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub logo_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInstructions {
    pub payable_to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,
    #[serde(default)]
    pub notes: Vec<String>,
}
