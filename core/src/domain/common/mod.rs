use crate::domain::common::entities::app_errors::CoreError;

pub mod entities;
pub mod services;

/// Gemini keys issued by Google all carry this prefix.
pub const GEMINI_API_KEY_PREFIX: &str = "AIza";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone, Debug)]
pub struct NutricheckConfig {
    pub llm: LLMConfig,
}

#[derive(Clone, Debug)]
pub struct LLMConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
}

impl LLMConfig {
    /// Returns the normalized API key, or an error when it is absent or does
    /// not look like a Gemini key.
    pub fn api_key(&self) -> Result<String, CoreError> {
        let key = normalize_api_key(&self.gemini_api_key);

        if key.is_empty() {
            return Err(CoreError::InvalidConfiguration(
                "Gemini API key is missing".to_string(),
            ));
        }

        if !key.starts_with(GEMINI_API_KEY_PREFIX) {
            return Err(CoreError::InvalidConfiguration(format!(
                "Gemini API key does not start with '{}'",
                GEMINI_API_KEY_PREFIX
            )));
        }

        Ok(key)
    }
}

/// Strips whitespace and the quotes `.env` files tend to leave around values.
pub fn normalize_api_key(raw: &str) -> String {
    raw.trim().trim_matches('"').trim_matches('\'').to_string()
}
