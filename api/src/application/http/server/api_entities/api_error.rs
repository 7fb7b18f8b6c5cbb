use std::backtrace::Backtrace;

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use nutricheck_core::domain::common::entities::app_errors::CoreError;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Cliente API Gemini não configurado ou inicializado corretamente no servidor.")]
    NotConfigured,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    UnknownService(String),

    #[error("{0}")]
    InvalidImage(String),

    #[error("A API Gemini retornou uma resposta que não é um JSON válido.")]
    InvalidModelResponse { raw: String },

    #[error("Erro interno: {0}")]
    InternalServerError(String),
}

/// Error body returned on every failure path.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// Machine-readable error kind, e.g. `erro_autenticacao`.
    pub status: String,
    pub mensagem: String,
    /// Raw model reply, only present for `erro_gemini_response`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detalhes_resposta_gemini: Option<String>,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) | ApiError::UnknownService(_) | ApiError::InvalidImage(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::InvalidModelResponse { .. } | ApiError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotConfigured => "erro_configuracao_api",
            ApiError::Unauthorized(_) => "erro_autenticacao",
            ApiError::BadRequest(_) => "erro_requisicao",
            ApiError::UnknownService(_) => "erro_servico",
            ApiError::InvalidImage(_) => "erro_imagem",
            ApiError::InvalidModelResponse { .. } => "erro_gemini_response",
            ApiError::InternalServerError(_) => "erro_interno_servidor",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = ApiErrorResponse {
            status: self.kind().to_string(),
            mensagem: self.to_string(),
            detalhes_resposta_gemini: match self {
                ApiError::InvalidModelResponse { raw } => Some(raw),
                _ => None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::InvalidConfiguration(_) => ApiError::NotConfigured,
            CoreError::UnknownService(service) => ApiError::UnknownService(format!(
                "Serviço '{}' desconhecido ou não configurado com prompt específico.",
                service
            )),
            CoreError::NoImages => ApiError::BadRequest(
                "'imagens' deve ser uma lista não vazia de strings base64.".to_string(),
            ),
            CoreError::ImageDecode { index, .. } => ApiError::InvalidImage(format!(
                "Falha ao processar uma das imagens base64 fornecidas (imagem {}).",
                index + 1
            )),
            CoreError::InvalidModelResponse { raw, .. } => ApiError::InvalidModelResponse { raw },
            CoreError::ExternalServiceError(_) | CoreError::InternalServerError => {
                // Trace covers the HTTP boundary only; the origin is logged
                // where the error is raised in core.
                let backtrace = Backtrace::capture();
                tracing::error!("Unexpected error: {}\n{}", error, backtrace);
                ApiError::InternalServerError(error.to_string())
            }
        }
    }
}

/// `Json` extractor that also runs `validator` rules, answering 400 on
/// either failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidateJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::debug!("Rejected request body: {}", e.body_text());
            ApiError::BadRequest(format!("Corpo JSON inválido ou ausente: {}", e.body_text()))
        })?;

        value.validate().map_err(|e| {
            tracing::debug!("Request body failed validation: {}", e);
            ApiError::BadRequest(format!("Dados faltando no corpo JSON: {}", e))
        })?;

        Ok(ValidateJson(value))
    }
}
