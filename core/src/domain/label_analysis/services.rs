use serde_json::Value;
use tracing::instrument;

use crate::domain::{
    common::{entities::app_errors::CoreError, services::Service},
    label_analysis::{
        decoder::decode_data_url,
        entities::{AnalysisKind, ContentPart, DecodedImage, LabelAnalysis},
        helpers::{preview, strip_code_fences},
        ports::{LLMClient, LabelAnalysisService},
        prompt::render_prompt,
        value_objects::AnalyzeLabelInput,
    },
};

impl<LLM> LabelAnalysisService for Service<LLM>
where
    LLM: LLMClient,
{
    #[instrument(skip_all, fields(service = %input.service, images = input.images.len()))]
    async fn analyze_label(&self, input: AnalyzeLabelInput) -> Result<LabelAnalysis, CoreError> {
        // 1. Resolve the requested service
        let kind: AnalysisKind = input.service.parse()?;

        if input.images.is_empty() {
            return Err(CoreError::NoImages);
        }

        // 2. Decode every image, all or nothing
        let total = input.images.len();
        let images = tokio::task::spawn_blocking(move || decode_images(&input.images))
            .await
            .map_err(|e| {
                tracing::error!("Image decoding task failed: {}", e);
                CoreError::InternalServerError
            })??;

        let mut parts = Vec::with_capacity(total + 1);
        parts.push(ContentPart::Text(render_prompt(kind, total)));
        parts.extend(images.into_iter().map(ContentPart::Image));

        tracing::info!(
            "Sending {} parts to the LLM ({} images + prompt)",
            parts.len(),
            total
        );

        // 3. Call LLM
        let raw_response = self.llm_client.generate_content(parts).await?;

        // 4. Unwrap and parse the reply
        let cleaned = strip_code_fences(&raw_response);
        tracing::debug!("Cleaned LLM reply: {}", preview(cleaned, 500));

        let fields = match serde_json::from_str::<Value>(cleaned) {
            Ok(Value::Object(fields)) => fields,
            Ok(other) => {
                tracing::error!("LLM reply is JSON but not an object: {}", raw_response);
                return Err(CoreError::InvalidModelResponse {
                    reason: format!("expected a JSON object, got {}", json_type_name(&other)),
                    raw: raw_response,
                });
            }
            Err(e) => {
                tracing::error!("Failed to parse LLM response: {}", e);
                tracing::error!("Full LLM reply: {}", raw_response);
                return Err(CoreError::InvalidModelResponse {
                    reason: e.to_string(),
                    raw: raw_response,
                });
            }
        };

        let analysis = LabelAnalysis::new(fields, kind);

        let missing = analysis.missing_keys();
        if !missing.is_empty() {
            tracing::warn!("LLM reply is missing expected keys: {:?}", missing);
        }

        Ok(analysis)
    }
}

/// Full-resolution decoding is CPU bound; callers run it on the blocking pool.
fn decode_images(images: &[String]) -> Result<Vec<DecodedImage>, CoreError> {
    let total = images.len();

    images
        .iter()
        .enumerate()
        .map(|(index, data_url)| {
            tracing::debug!("Decoding image {}/{}", index + 1, total);

            decode_data_url(data_url).map_err(|e| {
                tracing::warn!(
                    "Failed to decode image {}: {} (prefix: {}...)",
                    index + 1,
                    e,
                    preview(data_url, 70)
                );
                CoreError::ImageDecode {
                    index,
                    reason: e.to_string(),
                }
            })
        })
        .collect()
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::Cursor,
        sync::{Arc, Mutex},
    };

    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use serde_json::json;

    use super::*;
    use crate::domain::label_analysis::{
        decoder::to_data_url, entities::EXPECTED_RESULT_KEYS, prompt::IMAGE_COUNT_PLACEHOLDER,
    };

    #[derive(Clone)]
    struct StubLLMClient {
        reply: Result<String, CoreError>,
        calls: Arc<Mutex<Vec<Vec<ContentPart>>>>,
    }

    impl StubLLMClient {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: Arc::default(),
            }
        }

        fn failing(error: CoreError) -> Self {
            Self {
                reply: Err(error),
                calls: Arc::default(),
            }
        }

        fn calls(&self) -> Vec<Vec<ContentPart>> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl LLMClient for StubLLMClient {
        async fn generate_content(&self, parts: Vec<ContentPart>) -> Result<String, CoreError> {
            self.calls.lock().unwrap().push(parts);
            self.reply.clone()
        }
    }

    fn png_data_url() -> String {
        let rgb = RgbImage::from_pixel(4, 4, Rgb([250, 250, 250]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        to_data_url(&bytes, "image/png")
    }

    fn input(images: Vec<String>) -> AnalyzeLabelInput {
        AnalyzeLabelInput {
            service: "analise_individual".to_string(),
            images,
        }
    }

    fn full_reply() -> Value {
        json!({
            "servico": "algo_diferente",
            "nome_produto": "Mineirinho Guaraná",
            "pontuacao": "35",
            "cor": "Vermelho",
            "alerta_principal": "Alto teor de açúcar, evite",
            "ingredientes": ["água gaseificada", "açúcar", "extrato de guaraná"],
            "informacoes_nutricionais": { "valor_energetico": "85 kcal", "sodio": "10 mg" },
            "ingredientes_controversos": ["corante caramelo IV"],
            "justificativa_pontuacao": "Bebida açucarada com corante artificial."
        })
    }

    #[tokio::test]
    async fn test_plain_json_reply_round_trips_with_service_overwritten() {
        let reply = full_reply();
        let llm = StubLLMClient::replying(&format!("  {}\n", reply));
        let service = Service::new(llm);

        let analysis = service
            .analyze_label(input(vec![png_data_url()]))
            .await
            .unwrap();

        let mut expected = reply.as_object().unwrap().clone();
        expected.insert("servico".to_string(), json!("analise_individual"));
        assert_eq!(analysis.into_inner(), expected);
    }

    #[tokio::test]
    async fn test_fenced_reply_is_unwrapped() {
        let llm = StubLLMClient::replying(&format!("```json\n{:#}\n```", full_reply()));
        let service = Service::new(llm);

        let analysis = service
            .analyze_label(input(vec![png_data_url()]))
            .await
            .unwrap();

        for key in EXPECTED_RESULT_KEYS {
            assert!(analysis.get(key).is_some(), "missing {key}");
        }
    }

    #[tokio::test]
    async fn test_prompt_and_images_are_sent_in_order() {
        let llm = StubLLMClient::replying("{}");
        let service = Service::new(llm.clone());

        service
            .analyze_label(input(vec![png_data_url(), png_data_url()]))
            .await
            .unwrap();

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);

        let parts = &calls[0];
        assert_eq!(parts.len(), 3);
        match &parts[0] {
            ContentPart::Text(prompt) => {
                assert!(prompt.contains("forneceu 2 imagens"));
                assert!(!prompt.contains(IMAGE_COUNT_PLACEHOLDER));
            }
            other => panic!("expected prompt first, got {:?}", other),
        }
        for part in &parts[1..] {
            match part {
                ContentPart::Image(image) => assert_eq!(image.channel_count(), 3),
                other => panic!("expected image, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_invalid_json_keeps_raw_reply() {
        let raw = "```json\nDesculpe, não consegui ler o rótulo.\n```";
        let service = Service::new(StubLLMClient::replying(raw));

        let err = service
            .analyze_label(input(vec![png_data_url()]))
            .await
            .unwrap_err();

        match err {
            CoreError::InvalidModelResponse { raw: got, .. } => assert_eq!(got, raw),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_json_array_is_rejected() {
        let service = Service::new(StubLLMClient::replying("[1, 2]"));

        let err = service
            .analyze_label(input(vec![png_data_url()]))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::InvalidModelResponse { .. }));
    }

    #[tokio::test]
    async fn test_unknown_service_does_not_call_llm() {
        let llm = StubLLMClient::replying("{}");
        let service = Service::new(llm.clone());

        let err = service
            .analyze_label(AnalyzeLabelInput {
                service: "analise_comparativa".to_string(),
                images: vec![png_data_url()],
            })
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CoreError::UnknownService("analise_comparativa".to_string())
        );
        assert!(llm.calls().is_empty());
    }

    #[tokio::test]
    async fn test_one_bad_image_fails_the_whole_request() {
        let llm = StubLLMClient::replying("{}");
        let service = Service::new(llm.clone());

        let err = service
            .analyze_label(input(vec![
                png_data_url(),
                "data:image/png;base64,AAAA".to_string(),
                png_data_url(),
            ]))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::ImageDecode { index: 1, .. }));
        assert!(llm.calls().is_empty());
    }

    #[test]
    fn test_decode_images_keeps_order_and_reports_first_failure() {
        let decoded = decode_images(&[png_data_url(), png_data_url()]).unwrap();
        assert_eq!(decoded.len(), 2);

        let err = decode_images(&[
            png_data_url(),
            png_data_url(),
            "no separator".to_string(),
            "data:image/png;base64,AAAA".to_string(),
        ])
        .unwrap_err();
        assert!(matches!(err, CoreError::ImageDecode { index: 2, .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 1)]
    async fn test_pipeline_runs_inside_a_spawned_task() {
        let llm = StubLLMClient::replying("{}");
        let service = Service::new(llm.clone());

        let analysis = tokio::spawn(async move {
            service
                .analyze_label(input(vec![png_data_url(), png_data_url()]))
                .await
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(analysis.get("servico"), Some(&json!("analise_individual")));
        assert_eq!(llm.calls()[0].len(), 3);
    }

    #[tokio::test]
    async fn test_empty_image_list() {
        let service = Service::new(StubLLMClient::replying("{}"));

        let err = service.analyze_label(input(vec![])).await.unwrap_err();

        assert_eq!(err, CoreError::NoImages);
    }

    #[tokio::test]
    async fn test_llm_failure_is_propagated() {
        let service = Service::new(StubLLMClient::failing(CoreError::ExternalServiceError(
            "LLM API error: connection refused".to_string(),
        )));

        let err = service
            .analyze_label(input(vec![png_data_url()]))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            CoreError::ExternalServiceError("LLM API error: connection refused".to_string())
        );
    }
}
