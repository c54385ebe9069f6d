//! Model pricing and cost estimation.

use serde::{Deserialize, Serialize};

use crate::protocol::{self, ModelInfo};
use crate::types::Usage;
use crate::{Error, Result};

const TOKENS_PER_PRICE_UNIT: f64 = 1_000_000.0;

/// USD prices per 1M tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    pub model: String,
    pub input_cost_per_1m: f64,
    pub output_cost_per_1m: f64,
    pub currency: String,
}

impl ModelPricing {
    pub fn new(model: &str, input: f64, output: f64) -> Self {
        Self {
            model: model.into(),
            input_cost_per_1m: input,
            output_cost_per_1m: output,
            currency: "USD".into(),
        }
    }

    pub fn calculate_cost(&self, input_tokens: u64, output_tokens: u64) -> CostEstimate {
        let ic = (input_tokens as f64 / TOKENS_PER_PRICE_UNIT) * self.input_cost_per_1m;
        let oc = (output_tokens as f64 / TOKENS_PER_PRICE_UNIT) * self.output_cost_per_1m;
        CostEstimate {
            model: self.model.clone(),
            input_tokens,
            output_tokens,
            input_cost: ic,
            output_cost: oc,
            total_cost: ic + oc,
            currency: self.currency.clone(),
        }
    }

    /// Catalog pricing; `None` for models without published prices.
    pub fn from_info(info: &ModelInfo) -> Option<Self> {
        match (info.input_price, info.output_price) {
            (Some(input), Some(output)) => Some(Self::new(info.id, input, output)),
            _ => None,
        }
    }

    pub fn for_model(model: &str) -> Option<Self> {
        protocol::model_info(model).and_then(Self::from_info)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostEstimate {
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
    pub currency: String,
}

impl CostEstimate {
    pub fn format(&self) -> String {
        format!("{} {:.6}", self.currency, self.total_cost)
    }

    pub fn format_detailed(&self) -> String {
        if self.total_cost < 0.01 {
            format!("{:.4}¢", self.total_cost * 100.0)
        } else {
            format!("${:.4}", self.total_cost)
        }
    }
}

/// Cost of a completed run.
///
/// `Err(UnknownModel)` for identifiers outside the catalog, `Ok(None)` for
/// known models without published prices.
pub fn estimate_cost(model: &str, usage: &Usage) -> Result<Option<CostEstimate>> {
    let info = protocol::model_info(model).ok_or_else(|| Error::UnknownModel {
        model: model.to_string(),
    })?;
    Ok(ModelPricing::from_info(info)
        .map(|p| p.calculate_cost(usage.input_tokens, usage.output_tokens)))
}
