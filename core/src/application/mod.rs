use crate::{
    domain::common::{NutricheckConfig, entities::app_errors::CoreError, services::Service},
    infrastructure::llm::GeminiLLMClient,
};

pub type NutricheckService = Service<GeminiLLMClient>;

/// Builds the analysis service, or fails when the Gemini key is unusable.
pub fn create_service(config: NutricheckConfig) -> Result<NutricheckService, CoreError> {
    let api_key = config.llm.api_key()?;

    let llm_client = GeminiLLMClient::new(
        api_key,
        config.llm.gemini_model,
        config.llm.gemini_base_url,
    );

    tracing::info!(
        model = %llm_client.model_name(),
        "Gemini client initialized"
    );

    Ok(Service::new(llm_client))
}
