use axum::{
    RequestPartsExt,
    extract::{Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use thiserror::Error;

use super::http::server::{api_entities::api_error::ApiError, app_state::AppState};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token not found")]
    TokenNotFound,
}

impl From<AuthError> for ApiError {
    fn from(_: AuthError) -> Self {
        ApiError::Unauthorized(
            "Token da API (interna) inválido ou ausente no cabeçalho Authorization.".to_string(),
        )
    }
}

pub async fn extract_token_from_bearer(parts: &mut Parts) -> Result<String, AuthError> {
    let TypedHeader(Authorization(bearer)) = parts
        .extract::<TypedHeader<Authorization<Bearer>>>()
        .await
        .map_err(|_| AuthError::TokenNotFound)?;

    Ok(bearer.token().to_string())
}

/// Shared-secret bearer check. Runs before the body is read, so a bad token
/// is answered with 401 whatever the payload.
pub async fn auth(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (mut parts, body) = req.into_parts();

    let token = extract_token_from_bearer(&mut parts).await.map_err(|e| {
        tracing::warn!("Rejected request: {}", e);
        e
    })?;

    let expected = &state.args.auth.api_token;
    if expected.is_empty() || &token != expected {
        tracing::warn!("Rejected request: {}", AuthError::InvalidToken);
        return Err(AuthError::InvalidToken.into());
    }

    Ok(next.run(Request::from_parts(parts, body)).await)
}

/// Answers 503 on every request while the LLM client is unavailable.
pub async fn require_llm(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.service.is_none() {
        return Err(ApiError::NotConfigured);
    }

    Ok(next.run(req).await)
}
