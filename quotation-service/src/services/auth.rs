use crate::config::AuthConfig;
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Opaque token stored in the session after a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(pub String);

/// Single fixed credential pair.
pub struct AuthGate {
    username: String,
    password: Secret<String>,
}

impl AuthGate {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    pub fn authenticate(&self, username: &str, password: &str) -> Option<SessionToken> {
        let username_ok = username.as_bytes().ct_eq(self.username.as_bytes());
        let password_ok = password
            .as_bytes()
            .ct_eq(self.password.expose_secret().as_bytes());

        if bool::from(username_ok & password_ok) {
            tracing::info!(username = %username, "Login succeeded");
            Some(SessionToken(Uuid::new_v4().to_string()))
        } else {
            tracing::warn!(username = %username, "Login failed");
            None
        }
    }
}
