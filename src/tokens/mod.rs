//! 成本估算模块：根据用量与模型目录价格计算费用。
//!
//! # Cost Estimation
//!
//! Prices come from the model catalog (USD per 1M tokens). Models without
//! published prices estimate to `None` rather than zero.
//!
//! ```rust
//! use prompt_tester::tokens::estimate_cost;
//! use prompt_tester::types::Usage;
//!
//! let usage = Usage { input_tokens: 2_000, output_tokens: 500, total_tokens: 2_500 };
//! let estimate = estimate_cost("gpt-4o-mini", &usage).unwrap().unwrap();
//! assert!(estimate.total_cost > 0.0);
//! ```

mod pricing;

pub use pricing::{estimate_cost, CostEstimate, ModelPricing};
