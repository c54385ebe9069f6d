//! Perplexity Sonar 驱动 — 搜索增强参数与来源数据
//!
//! Sonar driver. On top of the shared chat-completion fields it serializes
//! the search augmentation block:
//! - `search_domain_filter` is truncated to [`MAX_DOMAIN_FILTERS`] entries.
//! - `search_recency_filter` is omitted for [`RecencyFilter::None`].
//! - `search_context_size` and `user_location` live under `web_search_options`.
//! - `return_images` / `return_related_questions` are sent only when true.
//!
//! Responses may carry `search_results`, `related_questions` and `images`
//! next to `choices`; they are copied through untouched.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::protocol::{ProviderCapability, ProviderKind};
use crate::types::{Auxiliary, Param, RecencyFilter, RequestParameters, MAX_DOMAIN_FILTERS};

use super::{put, ProviderDriver};

/// Perplexity Sonar chat completions.
#[derive(Debug, Default, Clone, Copy)]
pub struct SonarDriver;

impl SonarDriver {
    fn web_search_options(params: &RequestParameters) -> Map<String, Value> {
        let mut options = Map::new();
        if let Some(size) = params.context_size {
            put(&mut options, "search_context_size", size.as_str());
        }
        if let Some(location) = &params.user_location {
            match location.coordinates() {
                Some((latitude, longitude)) => {
                    let mut loc = json!({ "latitude": latitude, "longitude": longitude });
                    if let Some(country) = location
                        .country
                        .as_deref()
                        .map(str::trim)
                        .filter(|c| !c.is_empty())
                    {
                        loc["country"] = Value::String(country.to_string());
                    }
                    put(&mut options, "user_location", loc);
                }
                None => debug!(
                    lat = %location.lat,
                    lon = %location.lon,
                    "user location coordinates are not numeric, omitting"
                ),
            }
        }
        options
    }
}

fn array_field(body: &Value, key: &str) -> Option<Vec<Value>> {
    body.get(key).and_then(Value::as_array).cloned()
}

impl ProviderDriver for SonarDriver {
    fn provider(&self) -> ProviderKind {
        ProviderKind::Perplexity
    }

    fn extra_headers(&self) -> Vec<(&'static str, &'static str)> {
        vec![("accept", "application/json")]
    }

    fn apply_extensions(
        &self,
        cap: &ProviderCapability,
        params: &RequestParameters,
        body: &mut Map<String, Value>,
    ) {
        if cap.accepts(Param::ReferenceUrl) {
            if let Some(url) = params.reference_url.as_deref().map(str::trim) {
                if !url.is_empty() {
                    put(body, "url", url);
                }
            }
        }

        if cap.accepts(Param::DomainFilter) && !params.domain_filter.is_empty() {
            if params.domain_filter.len() > MAX_DOMAIN_FILTERS {
                debug!(
                    supplied = params.domain_filter.len(),
                    kept = MAX_DOMAIN_FILTERS,
                    "truncating search domain filter"
                );
            }
            let domains: Vec<&str> = params
                .domain_filter
                .iter()
                .take(MAX_DOMAIN_FILTERS)
                .map(String::as_str)
                .collect();
            put(body, "search_domain_filter", domains);
        }

        if cap.accepts(Param::RecencyFilter) {
            if let Some(recency) = params.recency_filter.filter(|r| *r != RecencyFilter::None) {
                put(body, "search_recency_filter", recency.as_str());
            }
        }

        if cap.accepts(Param::AfterDate) {
            if let Some(date) = &params.after_date {
                put(body, "search_after_date_filter", date.as_str());
            }
        }
        if cap.accepts(Param::BeforeDate) {
            if let Some(date) = &params.before_date {
                put(body, "search_before_date_filter", date.as_str());
            }
        }

        if cap.accepts(Param::ContextSize) || cap.accepts(Param::UserLocation) {
            let options = Self::web_search_options(params);
            if !options.is_empty() {
                put(body, "web_search_options", Value::Object(options));
            }
        }

        if cap.accepts(Param::ReturnImages) && params.return_images {
            put(body, "return_images", true);
        }
        if cap.accepts(Param::ReturnRelatedQuestions) && params.return_related_questions {
            put(body, "return_related_questions", true);
        }
    }

    fn extract_auxiliary(&self, body: &Value) -> Auxiliary {
        Auxiliary {
            search_results: array_field(body, "search_results"),
            related_questions: array_field(body, "related_questions"),
            images: array_field(body, "images"),
        }
    }
}
