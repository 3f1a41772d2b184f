pub mod auth;
pub mod builder;
pub mod dashboard;
pub mod health;
pub mod history;
pub mod invoices;
pub mod metrics;
pub mod preview;
pub mod products;
pub mod quotations;

use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use tower_sessions::Session;

const FLASH_KEY: &str = "flash";

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Info,
    Error,
}

impl Flash {
    pub fn css_class(&self) -> &'static str {
        match self.level {
            FlashLevel::Info => "flash-info",
            FlashLevel::Error => "flash-error",
        }
    }
}

pub(crate) fn session_error(e: tower_sessions::session::Error) -> AppError {
    AppError::InternalError(anyhow::anyhow!("session error: {}", e))
}

pub(crate) async fn push_flash(
    session: &Session,
    level: FlashLevel,
    message: impl Into<String>,
) -> Result<(), AppError> {
    let mut messages: Vec<Flash> = match session.get(FLASH_KEY).await {
        Ok(messages) => messages.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Replacing unreadable flash messages: {}", e);
            Vec::new()
        }
    };
    messages.push(Flash {
        level,
        message: message.into(),
    });
    session
        .insert(FLASH_KEY, messages)
        .await
        .map_err(session_error)
}

pub(crate) async fn take_flash(session: &Session) -> Vec<Flash> {
    match session.remove::<Vec<Flash>>(FLASH_KEY).await {
        Ok(messages) => messages.unwrap_or_default(),
        Err(e) => {
            tracing::warn!("Discarding unreadable flash messages: {}", e);
            Vec::new()
        }
    }
}

/// `<option>` entry for select boxes.
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}
