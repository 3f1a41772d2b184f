use crate::middleware::auth::{ACCESS_TOKEN_KEY, USERNAME_KEY};
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use service_core::error::AppError;
use tower_sessions::Session;

use super::session_error;

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub username: String,
    pub error: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login_page() -> impl IntoResponse {
    LoginTemplate {
        username: String::new(),
        error: None,
    }
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Form(payload): Form<LoginRequest>,
) -> Result<Response, AppError> {
    let Some(token) = state.auth.authenticate(payload.username.trim(), &payload.password) else {
        return Ok((
            StatusCode::UNAUTHORIZED,
            LoginTemplate {
                username: payload.username,
                error: Some("Invalid username or password".to_string()),
            },
        )
            .into_response());
    };

    // New id on privilege change.
    session.cycle_id().await.map_err(session_error)?;
    session
        .insert(ACCESS_TOKEN_KEY, token.0)
        .await
        .map_err(session_error)?;
    session
        .insert(USERNAME_KEY, payload.username.trim())
        .await
        .map_err(session_error)?;

    Ok(Redirect::to("/dashboard").into_response())
}

pub async fn logout_handler(session: Session) -> impl IntoResponse {
    if let Ok(Some(username)) = session.get::<String>(USERNAME_KEY).await {
        tracing::info!(username = %username, "User logged out");
    }
    session.clear().await;
    Redirect::to("/login")
}
