use super::handlers::analyze_label::{__path_analyze_label, analyze_label};
use crate::application::{
    auth::{auth, require_llm},
    http::server::app_state::AppState,
};
use axum::{Router, extract::DefaultBodyLimit, middleware, routing::post};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(paths(analyze_label))]
pub struct LabelAnalysisApiDoc;

/// Several full-size label photos, base64 encoded, in one JSON body.
pub const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

pub fn label_analysis_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            &format!("{}/analyze", state.args.server.root_path),
            post(analyze_label),
        )
        // Path used by the first clients of the service
        .route(
            &format!("{}/analisar", state.args.server.root_path),
            post(analyze_label),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), auth))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_llm))
        // Limit request body size to 50 MB for photo uploads
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}
