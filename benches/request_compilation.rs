//! Benchmarks for request compilation performance
//!
//! This benchmark measures:
//! - Form normalization into request parameters
//! - Payload assembly per model family
//! - Response interpretation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::json;

use prompt_tester::drivers::{create_driver, ProviderDriver, SonarDriver};
use prompt_tester::protocol::lookup;
use prompt_tester::session::TestForm;
use prompt_tester::types::{ChatMessage, RequestParameters, UserLocation};

fn create_simple_request() -> RequestParameters {
    let mut params = RequestParameters::new("sonar", vec![ChatMessage::user("ping")]);
    params.temperature = Some(0.2);
    params
}

fn create_search_request() -> RequestParameters {
    let mut params = RequestParameters::new(
        "sonar-pro",
        vec![
            ChatMessage::system("Cite your sources."),
            ChatMessage::user("What changed in the latest Rust release?"),
        ],
    );
    params.temperature = Some(0.2);
    params.domain_filter = vec![
        "rust-lang.org".into(),
        "github.com".into(),
        "-reddit.com".into(),
        "docs.rs".into(),
    ];
    params.recency_filter = "month".parse().ok();
    params.context_size = "high".parse().ok();
    params.user_location = Some(UserLocation::new("52.52", "13.40").with_country("DE"));
    params.return_related_questions = true;
    params
}

fn create_structured_request() -> RequestParameters {
    let mut params = RequestParameters::new(
        "gpt-5",
        vec![
            ChatMessage::system("Answer in JSON."),
            ChatMessage::user("Summarize the borrow checker."),
        ],
    );
    params.temperature = Some(0.7);
    params.top_p = Some(0.9);
    params.reasoning_effort = "minimal".parse().ok();
    params.response_format = Some(json!({
        "type": "json_schema",
        "json_schema": {
            "name": "summary",
            "schema": {
                "type": "object",
                "properties": {"summary": {"type": "string"}},
                "required": ["summary"]
            }
        }
    }));
    params.tools = (0..8)
        .map(|i| {
            json!({
                "type": "function",
                "function": {
                    "name": format!("tool_{i}"),
                    "parameters": {"type": "object", "properties": {"q": {"type": "string"}}}
                }
            })
        })
        .collect();
    params.parallel_tool_calls = Some(true);
    params
}

fn bench_request_compilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("request_compilation");

    for (name, params) in [
        ("simple", create_simple_request()),
        ("search", create_search_request()),
        ("structured_with_tools", create_structured_request()),
    ] {
        let capability = lookup(&params.model).expect("benchmark model is in the catalog");
        let driver = create_driver(capability.provider);
        group.bench_with_input(BenchmarkId::new("build", name), &params, |b, params| {
            b.iter(|| driver.build_request(black_box(capability), black_box(params)))
        });
    }

    group.finish();
}

fn bench_form_normalization(c: &mut Criterion) {
    let mut form = TestForm::new("gpt-4o", "Explain lifetimes.");
    form.system_prompt = "Be concise.".into();
    form.llm_params.max_tokens = "512".into();
    form.llm_params.stop = "END, STOP".into();
    form.llm_params.logit_bias = r#"{"50256": -100}"#.into();
    form.llm_params.tool_choice = "auto".into();
    form.use_json = true;
    form.json_format = r#"{"type": "json_object"}"#.into();

    c.bench_function("normalize_form", |b| b.iter(|| black_box(&form).normalize()));
}

fn bench_response_interpretation(c: &mut Criterion) {
    let mut group = c.benchmark_group("response_interpretation");

    let results: Vec<_> = (0..20)
        .map(|i| json!({"title": format!("Result {i}"), "url": format!("https://example.com/{i}")}))
        .collect();
    let body = json!({
        "choices": [{"message": {"content": "Answer with sources."}, "finish_reason": "stop"}],
        "search_results": results,
        "related_questions": ["a?", "b?", "c?"],
        "usage": {"prompt_tokens": 120, "completion_tokens": 80, "total_tokens": 200}
    });

    group.throughput(Throughput::Elements(20));
    group.bench_function("sonar_with_sources", |b| {
        b.iter(|| SonarDriver.interpret(black_box(body.clone())))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_request_compilation,
    bench_form_normalization,
    bench_response_interpretation
);
criterion_main!(benches);
