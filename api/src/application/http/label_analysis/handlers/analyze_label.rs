use axum::extract::State;
use nutricheck_core::domain::label_analysis::{
    entities::LabelAnalysis, ports::LabelAnalysisService, value_objects::AnalyzeLabelInput,
};

use crate::application::http::{
    label_analysis::validators::{AnalyzeLabelRequest, AnalyzeLabelResponse},
    server::{
        api_entities::{
            api_error::{ApiError, ApiErrorResponse, ValidateJson},
            response::Response,
        },
        app_state::AppState,
    },
};

#[utoipa::path(
    post,
    path = "/analyze",
    tag = "label-analysis",
    summary = "Analyze a food label",
    description = "Relays one or more photos of a food label to the multimodal model and returns its nutritional analysis",
    security(("bearer" = [])),
    responses(
        (status = 200, body = AnalyzeLabelResponse),
        (status = 400, body = ApiErrorResponse),
        (status = 401, body = ApiErrorResponse),
        (status = 500, body = ApiErrorResponse),
        (status = 503, body = ApiErrorResponse)
    ),
    request_body = AnalyzeLabelRequest
)]
pub async fn analyze_label(
    State(state): State<AppState>,
    ValidateJson(payload): ValidateJson<AnalyzeLabelRequest>,
) -> Result<Response<LabelAnalysis>, ApiError> {
    let service = state.service.as_ref().ok_or(ApiError::NotConfigured)?;

    tracing::info!(
        servico = %payload.servico,
        images = payload.imagens.len(),
        "Label analysis requested"
    );

    let analysis = service
        .analyze_label(AnalyzeLabelInput {
            service: payload.servico,
            images: payload.imagens,
        })
        .await
        .map_err(ApiError::from)?;

    Ok(Response::OK(analysis))
}
