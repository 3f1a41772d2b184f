use crate::models::{CompanyInfo, PaymentInstructions};
use secrecy::Secret;
use service_core::config::{self as core_config, get_env, is_production, optional_env};
use service_core::error::AppError;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct QuotationConfig {
    pub common: core_config::Config,
    pub store_backend: StoreBackend,
    pub mongodb: MongoConfig,
    pub catalog_path: PathBuf,
    pub auth: AuthConfig,
    pub company: CompanyInfo,
    pub payment: PaymentInstructions,
    pub thank_you_message: String,
    pub currency_symbol: String,
    /// Managers offered in the quotation builder.
    pub relationship_managers: Vec<String>,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(StoreBackend::Mongo),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!("Invalid store backend: {}", s)),
        }
    }
}

impl QuotationConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        let is_prod = is_production();
        let log_level = optional_env("LOG_LEVEL").unwrap_or_else(|| common.log_level.clone());

        let store_backend = get_env("STORE_BACKEND", Some("mongo"), is_prod)?
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let mongo_uri_default = match store_backend {
            StoreBackend::Mongo => None,
            StoreBackend::Memory => Some("mongodb://localhost:27017"),
        };

        Ok(QuotationConfig {
            common,
            store_backend,
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", mongo_uri_default, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("quotation_db"), is_prod)?,
            },
            catalog_path: PathBuf::from(get_env(
                "CATALOG_PATH",
                Some("data/catalog.json"),
                is_prod,
            )?),
            auth: AuthConfig {
                username: get_env("AUTH_USERNAME", Some("admin"), is_prod)?,
                password: Secret::new(get_env("AUTH_PASSWORD", Some("admin"), is_prod)?),
            },
            company: CompanyInfo {
                name: env_or("COMPANY_NAME", "Acme Medical Supplies"),
                address: env_or("COMPANY_ADDRESS", "12 Market Road"),
                city_state_zip: env_or("COMPANY_CITY_STATE_ZIP", "Springfield, ST 10001"),
                phone: env_or("COMPANY_PHONE", "+1 555 0100"),
                email: env_or("COMPANY_EMAIL", "sales@example.com"),
                logo_url: env_or("COMPANY_LOGO_URL", ""),
            },
            payment: PaymentInstructions {
                payable_to: env_or("PAYMENT_PAYABLE_TO", "Acme Medical Supplies"),
                bank_name: optional_env("PAYMENT_BANK_NAME"),
                account_name: optional_env("PAYMENT_ACCOUNT_NAME"),
                account_number: optional_env("PAYMENT_ACCOUNT_NUMBER"),
                notes: optional_env("PAYMENT_NOTES")
                    .map(|notes| split_list(&notes, '|'))
                    .unwrap_or_default(),
            },
            thank_you_message: env_or("THANK_YOU_MESSAGE", "Thank you for your business!"),
            currency_symbol: env_or("CURRENCY_SYMBOL", "₹"),
            relationship_managers: optional_env("RELATIONSHIP_MANAGERS")
                .map(|managers| split_list(&managers, ','))
                .unwrap_or_default(),
            log_level,
            otlp_endpoint: optional_env("OTLP_ENDPOINT"),
        })
    }

    /// Settings for tests and local runs: in-memory store and fixed credentials.
    pub fn for_memory_store(catalog_path: impl Into<PathBuf>) -> Self {
        QuotationConfig {
            common: core_config::Config::default(),
            store_backend: StoreBackend::Memory,
            mongodb: MongoConfig {
                uri: "mongodb://localhost:27017".to_string(),
                database: "quotation_db".to_string(),
            },
            catalog_path: catalog_path.into(),
            auth: AuthConfig {
                username: "admin".to_string(),
                password: Secret::new("admin".to_string()),
            },
            company: CompanyInfo {
                name: "Acme Medical Supplies".to_string(),
                address: "12 Market Road".to_string(),
                city_state_zip: "Springfield, ST 10001".to_string(),
                phone: "+1 555 0100".to_string(),
                email: "sales@example.com".to_string(),
                logo_url: String::new(),
            },
            payment: PaymentInstructions {
                payable_to: "Acme Medical Supplies".to_string(),
                ..Default::default()
            },
            thank_you_message: "Thank you for your business!".to_string(),
            currency_symbol: "₹".to_string(),
            relationship_managers: Vec::new(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn split_list(raw: &str, separator: char) -> Vec<String> {
    raw.split(separator)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
