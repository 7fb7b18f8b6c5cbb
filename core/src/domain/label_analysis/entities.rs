use std::{fmt, str::FromStr};

use image::{DynamicImage, RgbImage};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::common::entities::app_errors::CoreError;

/// Key under which the requested service name is echoed back.
pub const SERVICE_KEY: &str = "servico";

/// Keys the individual analysis prompt asks the model to produce.
pub const EXPECTED_RESULT_KEYS: [&str; 9] = [
    SERVICE_KEY,
    "nome_produto",
    "pontuacao",
    "cor",
    "alerta_principal",
    "ingredientes",
    "informacoes_nutricionais",
    "ingredientes_controversos",
    "justificativa_pontuacao",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisKind {
    #[serde(rename = "analise_individual")]
    IndividualAnalysis,
}

impl AnalysisKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::IndividualAnalysis => "analise_individual",
        }
    }
}

impl FromStr for AnalysisKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "analise_individual" => Ok(AnalysisKind::IndividualAnalysis),
            other => Err(CoreError::UnknownService(other.to_string())),
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request image normalized to 8-bit RGB.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    image: RgbImage,
}

impl DecodedImage {
    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn channel_count(&self) -> u8 {
        self.image.sample_layout().channels
    }
}

impl From<DynamicImage> for DecodedImage {
    fn from(image: DynamicImage) -> Self {
        let image = match image {
            DynamicImage::ImageRgb8(rgb) => rgb,
            other => other.into_rgb8(),
        };

        Self { image }
    }
}

/// One element of a multimodal generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    Image(DecodedImage),
}

/// The JSON object returned by the model, with `servico` set by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelAnalysis(Map<String, Value>);

impl LabelAnalysis {
    pub fn new(mut fields: Map<String, Value>, kind: AnalysisKind) -> Self {
        fields.insert(
            SERVICE_KEY.to_string(),
            Value::String(kind.as_str().to_string()),
        );
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn missing_keys(&self) -> Vec<&'static str> {
        EXPECTED_RESULT_KEYS
            .iter()
            .copied()
            .filter(|key| !self.0.contains_key(*key))
            .collect()
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};
    use serde_json::json;

    use super::*;

    #[test]
    fn test_analysis_kind_parse() {
        assert_eq!(
            "analise_individual".parse::<AnalysisKind>(),
            Ok(AnalysisKind::IndividualAnalysis)
        );
        assert_eq!(
            "analise_comparativa".parse::<AnalysisKind>(),
            Err(CoreError::UnknownService("analise_comparativa".to_string()))
        );
    }

    #[test]
    fn test_grayscale_is_forced_to_rgb() {
        let gray = GrayImage::from_pixel(3, 2, Luma([128]));
        let decoded = DecodedImage::from(DynamicImage::ImageLuma8(gray));

        assert_eq!(decoded.channel_count(), 3);
        assert_eq!((decoded.width(), decoded.height()), (3, 2));
        assert_eq!(decoded.as_rgb().get_pixel(0, 0).0, [128, 128, 128]);
    }

    #[test]
    fn test_label_analysis_overwrites_service() {
        let fields = json!({ "servico": "outro", "nome_produto": "Biscoito" });
        let Value::Object(fields) = fields else {
            unreachable!()
        };

        let analysis = LabelAnalysis::new(fields, AnalysisKind::IndividualAnalysis);

        assert_eq!(analysis.get(SERVICE_KEY), Some(&json!("analise_individual")));
        assert!(analysis.missing_keys().contains(&"pontuacao"));
        assert!(!analysis.missing_keys().contains(&"nome_produto"));
    }
}
