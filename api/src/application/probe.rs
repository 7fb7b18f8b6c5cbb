use std::path::Path;

use anyhow::Context;
use nutricheck_core::{
    application::create_service,
    domain::{
        common::{NutricheckConfig, entities::app_errors::CoreError},
        label_analysis::{
            decoder::to_data_url, ports::LabelAnalysisService, value_objects::AnalyzeLabelInput,
        },
    },
};

use crate::args::{Args, ProbeArgs};

/// Mime type announced in the data URL header. The decoder sniffs the real
/// format from the bytes, so this is informational only.
pub fn mime_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("png") => "image/png",
        _ => "image/jpeg",
    }
}

/// Runs one analysis against the configured model and prints the result.
pub async fn run_probe(args: &Args, probe: &ProbeArgs) -> Result<(), anyhow::Error> {
    let service = create_service(NutricheckConfig::from(args.clone()))
        .context("Gemini client is not configured, probe cannot run")?;

    let mut images = Vec::with_capacity(probe.images.len());
    for path in &probe.images {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read image file '{}'", path.display()))?;
        tracing::info!("Loaded test image '{}'", path.display());
        images.push(to_data_url(&bytes, mime_type_for(path)));
    }

    let result = service
        .analyze_label(AnalyzeLabelInput {
            service: probe.service.clone(),
            images,
        })
        .await;

    match result {
        Ok(analysis) => {
            println!("{}", serde_json::to_string_pretty(&analysis)?);
            Ok(())
        }
        Err(CoreError::InvalidModelResponse { raw, reason }) => {
            tracing::warn!("Model reply is not valid JSON: {}", reason);
            println!("{}", raw);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
