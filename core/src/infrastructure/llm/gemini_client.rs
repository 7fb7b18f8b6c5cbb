use base64::{Engine as _, engine::general_purpose};
use image::codecs::jpeg::JpegEncoder;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::domain::{
    common::entities::app_errors::CoreError,
    label_analysis::{
        entities::{ContentPart, DecodedImage},
        ports::LLMClient,
    },
};

const JPEG_QUALITY: u8 = 90;

#[derive(Debug, Clone)]
pub struct GeminiLLMClient {
    api_key: String,
    model_name: String,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

impl GeminiLLMClient {
    pub fn new(api_key: String, model_name: String, base_url: String) -> Self {
        Self {
            api_key,
            model_name,
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn call_gemini_api(&self, request: GeminiRequest) -> Result<String, CoreError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model_name
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini API request failed: {}", e);
                CoreError::ExternalServiceError(format!("LLM API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini API error: {} - {}", status, error_text);
            return Err(CoreError::ExternalServiceError(format!(
                "LLM API returned error: {} - {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            CoreError::ExternalServiceError(format!("Failed to parse LLM response: {}", e))
        })?;

        let text: String = gemini_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            tracing::error!("Gemini reply carried no text");
            return Err(CoreError::ExternalServiceError(
                "No response from LLM".to_string(),
            ));
        }

        Ok(text)
    }
}

fn encode_jpeg(image: &DecodedImage) -> Result<Vec<u8>, CoreError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY)
        .encode_image(image.as_rgb())
        .map_err(|e| {
            tracing::error!("Failed to encode image as JPEG: {}", e);
            CoreError::InternalServerError
        })?;

    Ok(bytes)
}

fn to_request_part(part: ContentPart) -> Result<Part, CoreError> {
    match part {
        ContentPart::Text(text) => Ok(Part::Text { text }),
        ContentPart::Image(image) => Ok(Part::InlineData {
            inline_data: InlineData {
                mime_type: "image/jpeg".to_string(),
                data: general_purpose::STANDARD.encode(encode_jpeg(&image)?),
            },
        }),
    }
}

impl LLMClient for GeminiLLMClient {
    async fn generate_content(&self, parts: Vec<ContentPart>) -> Result<String, CoreError> {
        // JPEG re-encoding of full-size photos is CPU bound
        let parts = tokio::task::spawn_blocking(move || {
            parts
                .into_iter()
                .map(to_request_part)
                .collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(|e| {
            tracing::error!("Image encoding task failed: {}", e);
            CoreError::InternalServerError
        })??;

        tracing::debug!(
            "Calling Gemini model '{}' with {} parts",
            self.model_name,
            parts.len()
        );

        let request = GeminiRequest {
            contents: vec![Content { parts }],
        };

        self.call_gemini_api(request).await
    }
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, Rgb, RgbImage};
    use serde_json::{Value, json};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path},
    };

    use super::*;

    const MODEL: &str = "gemini-2.0-flash";
    const GENERATE_PATH: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

    fn client(server: &MockServer) -> GeminiLLMClient {
        GeminiLLMClient::new("AIzaTestKey".to_string(), MODEL.to_string(), server.uri())
    }

    fn sample_image() -> DecodedImage {
        DecodedImage::from(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            4,
            4,
            Rgb([0, 128, 255]),
        )))
    }

    fn reply(parts: Value) -> Value {
        json!({ "candidates": [{ "content": { "role": "model", "parts": parts } }] })
    }

    #[tokio::test]
    async fn test_sends_prompt_then_images() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "AIzaTestKey"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply(json!([
                { "text": "{\"nome_produto\":" },
                { "text": " \"Azeite\"}" }
            ]))))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server)
            .generate_content(vec![
                ContentPart::Text("analise".to_string()),
                ContentPart::Image(sample_image()),
                ContentPart::Image(sample_image()),
            ])
            .await
            .unwrap();

        assert_eq!(text, "{\"nome_produto\": \"Azeite\"}");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["text"], "analise");
        for part in &parts[1..] {
            assert_eq!(part["inline_data"]["mime_type"], "image/jpeg");
            let jpeg = general_purpose::STANDARD
                .decode(part["inline_data"]["data"].as_str().unwrap())
                .unwrap();
            let decoded = image::load_from_memory(&jpeg).unwrap();
            assert_eq!((decoded.width(), decoded.height()), (4, 4));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_photo_sized_image_is_reencoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply(json!([
                { "text": "{}" }
            ]))))
            .mount(&server)
            .await;

        let photo = DecodedImage::from(DynamicImage::ImageRgb8(RgbImage::from_fn(
            1600,
            1200,
            |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]),
        )));

        let llm = client(&server);
        let text = tokio::spawn(async move {
            llm.generate_content(vec![
                ContentPart::Text("analise".to_string()),
                ContentPart::Image(photo),
            ])
            .await
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(text, "{}");

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        let jpeg = general_purpose::STANDARD
            .decode(body["contents"][0]["parts"][1]["inline_data"]["data"].as_str().unwrap())
            .unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (1600, 1200));
    }

    #[tokio::test]
    async fn test_error_status_is_external_service_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate_content(vec![ContentPart::Text("analise".to_string())])
            .await
            .unwrap_err();

        match err {
            CoreError::ExternalServiceError(message) => {
                assert!(message.contains("429"));
                assert!(message.contains("quota exceeded"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_blocked_prompt_without_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .generate_content(vec![ContentPart::Text("analise".to_string())])
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CoreError::ExternalServiceError("No response from LLM".to_string())
        );
    }
}
