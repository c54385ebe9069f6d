//! Known models per provider.

use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

use crate::protocol::capabilities::ModelFamily;

/// Static metadata for one model identifier.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelInfo {
    pub id: &'static str,
    pub family: ModelFamily,
    pub context_window: u32,
    pub max_output: Option<u32>,
    pub knowledge_cutoff: Option<&'static str>,
    /// USD per 1M input tokens.
    pub input_price: Option<f64>,
    /// USD per 1M output tokens.
    pub output_price: Option<f64>,
}

fn sonar(id: &'static str, context_window: u32) -> ModelInfo {
    ModelInfo {
        id,
        family: ModelFamily::Sonar,
        context_window,
        max_output: None,
        knowledge_cutoff: None,
        input_price: None,
        output_price: None,
    }
}

fn openai(
    id: &'static str,
    family: ModelFamily,
    context_window: u32,
    max_output: u32,
    knowledge_cutoff: &'static str,
    input_price: f64,
    output_price: f64,
) -> ModelInfo {
    ModelInfo {
        id,
        family,
        context_window,
        max_output: Some(max_output),
        knowledge_cutoff: Some(knowledge_cutoff),
        input_price: Some(input_price),
        output_price: Some(output_price),
    }
}

pub static MODELS: Lazy<Vec<ModelInfo>> = Lazy::new(|| {
    vec![
        sonar("sonar", 128_000),
        sonar("sonar-pro", 200_000),
        sonar("sonar-reasoning", 128_000),
        sonar("sonar-reasoning-pro", 128_000),
        sonar("sonar-deep-research", 128_000),
        openai("gpt-5", ModelFamily::Gpt5, 272_000, 128_000, "2024-09-30", 1.25, 10.0),
        openai("gpt-5-mini", ModelFamily::Gpt5, 272_000, 128_000, "2024-05-30", 0.25, 2.0),
        openai("gpt-5-nano", ModelFamily::Gpt5, 272_000, 128_000, "2024-05-30", 0.05, 0.40),
        openai("gpt-4.1", ModelFamily::Gpt, 1_047_576, 32_768, "2024-06-01", 2.0, 8.0),
        openai("gpt-4.1-mini", ModelFamily::Gpt, 1_047_576, 32_768, "2024-06-01", 0.40, 1.60),
        openai("gpt-4o", ModelFamily::Gpt, 128_000, 16_384, "2023-10-01", 2.50, 10.0),
        openai("gpt-4o-mini", ModelFamily::Gpt, 128_000, 16_384, "2023-10-01", 0.15, 0.60),
    ]
});

static INDEX: Lazy<HashMap<&'static str, &'static ModelInfo>> =
    Lazy::new(|| MODELS.iter().map(|m| (m.id, m)).collect());

pub fn model_info(model: &str) -> Option<&'static ModelInfo> {
    INDEX.get(model.trim()).copied()
}
