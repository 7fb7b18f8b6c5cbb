use std::future::Future;

use crate::domain::{
    common::entities::app_errors::CoreError,
    label_analysis::{
        entities::{ContentPart, LabelAnalysis},
        value_objects::AnalyzeLabelInput,
    },
};

/// LLM Client trait for calling multimodal models
pub trait LLMClient: Send + Sync {
    /// Sends the ordered parts as a single generation request and returns the
    /// model's text output.
    fn generate_content(
        &self,
        parts: Vec<ContentPart>,
    ) -> impl Future<Output = Result<String, CoreError>> + Send;
}

/// Service trait for label analysis business logic
pub trait LabelAnalysisService: Send + Sync {
    fn analyze_label(
        &self,
        input: AnalyzeLabelInput,
    ) -> impl Future<Output = Result<LabelAnalysis, CoreError>> + Send;
}
