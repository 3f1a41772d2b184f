use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use service_core::error::ErrorResponse;
use tower_sessions::Session;

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const USERNAME_KEY: &str = "username";

async fn is_authenticated(session: &Session) -> bool {
    match session.get::<String>(ACCESS_TOKEN_KEY).await {
        Ok(token) => token.is_some(),
        Err(e) => {
            tracing::warn!("Failed to read session: {}", e);
            false
        }
    }
}

/// Pages: anonymous visitors are sent to the login form.
pub async fn require_session(session: Session, request: Request<Body>, next: Next) -> Response {
    if !is_authenticated(&session).await {
        return Redirect::to("/login").into_response();
    }
    next.run(request).await
}

/// JSON API: anonymous callers get 401.
pub async fn require_api_session(
    session: Session,
    request: Request<Body>,
    next: Next,
) -> Response {
    if !is_authenticated(&session).await {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Authentication required".to_string(),
                details: None,
            }),
        )
            .into_response();
    }
    next.run(request).await
}
