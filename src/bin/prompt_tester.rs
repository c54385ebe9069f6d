//! prompt-tester 命令行工具：模型列表、单次测试、重放已保存测试、JSON 校验
//!
//! Usage:
//!   prompt-tester models                              List known models and credentials
//!   prompt-tester run --prompt <text> [OPTIONS]       Run one test
//!   prompt-tester replay <file> [--save <file>]       Re-run a saved test
//!   prompt-tester validate --content <text> [--shape <json>]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use prompt_tester::protocol::ProviderKind;
use prompt_tester::session::form::{
    DEFAULT_CONTEXT_SIZE, DEFAULT_MODEL, DEFAULT_RECENCY_FILTER, DEFAULT_TEMPERATURE,
};
use prompt_tester::session::{render, RunReport, Session, TestForm};
use prompt_tester::tokens::estimate_cost;
use prompt_tester::{validate, ClientConfig, PromptClient};

#[derive(Parser, Debug)]
#[command(name = "prompt-tester", version)]
#[command(about = "Send test prompts to Perplexity Sonar and OpenAI models", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List known models, their prices and which credentials are configured
    Models,
    /// Run one test
    Run {
        #[command(flatten)]
        form: FormArgs,

        /// Print the raw response body after the rendered output
        #[arg(long)]
        raw: bool,

        /// Save the test and its response to this file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Export the run history to this file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Load a saved test and run it again
    Replay {
        file: PathBuf,

        #[arg(long)]
        raw: bool,

        /// Save the re-run test to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Check content against an expected JSON shape without calling any API
    Validate {
        #[arg(long)]
        content: String,

        /// Expected shape, as a JSON object whose top-level keys must be present
        #[arg(long)]
        shape: Option<String>,
    },
}

/// Form fields, one flag each.
#[derive(Args, Debug)]
struct FormArgs {
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(short, long)]
    prompt: String,

    #[arg(short, long)]
    system: Option<String>,

    /// Reference URL (Sonar)
    #[arg(long)]
    url: Option<String>,

    /// Comma-separated domains, `-example.com` to exclude (Sonar)
    #[arg(long)]
    domains: Option<String>,

    /// none, hour, day, week or month (Sonar)
    #[arg(long, default_value = DEFAULT_RECENCY_FILTER)]
    recency: String,

    /// low, medium or high (Sonar)
    #[arg(long, default_value = DEFAULT_CONTEXT_SIZE)]
    context_size: String,

    #[arg(long)]
    after_date: Option<String>,

    #[arg(long)]
    before_date: Option<String>,

    #[arg(long)]
    return_images: bool,

    #[arg(long)]
    return_related_questions: bool,

    #[arg(long, allow_hyphen_values = true)]
    latitude: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    longitude: Option<String>,

    #[arg(long)]
    country: Option<String>,

    #[arg(short, long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f64,

    #[arg(long)]
    max_tokens: Option<String>,

    #[arg(long)]
    top_p: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    frequency_penalty: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    presence_penalty: Option<String>,

    #[arg(long)]
    seed: Option<String>,

    /// Comma-separated stop sequences
    #[arg(long)]
    stop: Option<String>,

    #[arg(long)]
    n: Option<String>,

    #[arg(long)]
    user: Option<String>,

    /// JSON object of token id to bias
    #[arg(long)]
    logit_bias: Option<String>,

    #[arg(long)]
    logprobs: bool,

    #[arg(long)]
    top_logprobs: Option<String>,

    /// minimal, low, medium or high (GPT-5)
    #[arg(long)]
    reasoning_effort: Option<String>,

    /// low, medium or high (GPT-5)
    #[arg(long)]
    verbosity: Option<String>,

    /// JSON array of tool definitions
    #[arg(long)]
    tools: Option<String>,

    /// auto, none, required, a function name or a JSON object
    #[arg(long)]
    tool_choice: Option<String>,

    #[arg(long)]
    parallel_tool_calls: Option<bool>,

    /// Request JSON output; the value is the expected shape or a response_format object
    #[arg(long)]
    json_format: Option<String>,
}

impl FormArgs {
    fn into_form(self) -> TestForm {
        let mut form = TestForm::new(self.model, self.prompt);
        form.system_prompt = self.system.unwrap_or_default();
        form.url = self.url.unwrap_or_default();

        let search = &mut form.search_params;
        search.domain_filter = self.domains.unwrap_or_default();
        search.recency_filter = self.recency;
        search.context_size = self.context_size;
        search.after_date = self.after_date.unwrap_or_default();
        search.before_date = self.before_date.unwrap_or_default();
        search.return_images = self.return_images;
        search.return_related_questions = self.return_related_questions;

        form.location.latitude = self.latitude.unwrap_or_default();
        form.location.longitude = self.longitude.unwrap_or_default();
        form.location.country = self.country.unwrap_or_default();

        let llm = &mut form.llm_params;
        llm.temperature = Some(self.temperature);
        llm.max_tokens = self.max_tokens.unwrap_or_default();
        llm.top_p = self.top_p.unwrap_or_default();
        llm.frequency_penalty = self.frequency_penalty.unwrap_or_default();
        llm.presence_penalty = self.presence_penalty.unwrap_or_default();
        llm.seed = self.seed.unwrap_or_default();
        llm.stop = self.stop.unwrap_or_default();
        llm.n = self.n.unwrap_or_default();
        llm.user = self.user.unwrap_or_default();
        llm.logit_bias = self.logit_bias.unwrap_or_default();
        llm.logprobs = self.logprobs;
        llm.top_logprobs = self.top_logprobs.unwrap_or_default();
        llm.reasoning_effort = self.reasoning_effort.unwrap_or_default();
        llm.verbosity = self.verbosity.unwrap_or_default();
        llm.tools = self.tools.unwrap_or_default();
        llm.tool_choice = self.tool_choice.unwrap_or_default();
        llm.parallel_tool_calls = self.parallel_tool_calls;

        if let Some(format) = self.json_format {
            form.use_json = true;
            form.json_format = format;
        }
        form
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("prompt_tester=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Models => cmd_models(),
        Command::Run {
            form,
            raw,
            save,
            export,
        } => {
            let mut session = Session::new(PromptClient::from_env()?);
            session.form = form.into_form();
            print_report(session.run().await?, raw);
            if let Some(path) = save {
                session.save_record(&path)?;
                println!("Test saved to {}", path.display());
            }
            if let Some(path) = export {
                let n = session.export_history(&path)?;
                println!("Exported {} test(s) to {}", n, path.display());
            }
            Ok(())
        }
        Command::Replay { file, raw, save } => {
            let mut session = Session::new(PromptClient::from_env()?);
            session
                .load_record(&file)
                .with_context(|| format!("cannot replay {}", file.display()))?;
            print_report(session.run().await?, raw);
            if let Some(path) = save {
                session.save_record(&path)?;
                println!("Test saved to {}", path.display());
            }
            Ok(())
        }
        Command::Validate { content, shape } => {
            let outcome = validate(&content, shape.as_deref());
            println!("{}", outcome);
            if !outcome.is_json() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

fn cmd_models() -> Result<()> {
    let config = ClientConfig::from_env()?;
    let available = config.available_providers();

    for provider in ProviderKind::ALL {
        let key = if available.contains(&provider) {
            "configured"
        } else {
            "missing"
        };
        println!(
            "{} ({}: {}, {})",
            provider,
            provider.api_key_env(),
            key,
            config.base_url(provider)
        );
        for m in provider.models() {
            let price = match (m.input_price, m.output_price) {
                (Some(i), Some(o)) => format!("${:.2} / ${:.2} per 1M tokens", i, o),
                _ => "pricing n/a".to_string(),
            };
            println!("  {:<22} {:>9} ctx  {}", m.id, m.context_window, price);
        }
        println!();
    }
    Ok(())
}

fn print_report(report: &RunReport, raw: bool) {
    let run = &report.run;
    println!("{}", render::response_text(&run.result));
    println!();
    println!("{}", render::usage_line(&run.result));
    println!("{}", render::response_time_line(run.response_time()));
    if report.validation.is_some() {
        println!("{}", render::validation_line(report.validation.as_ref()));
    }
    if let Ok(Some(cost)) = estimate_cost(&run.model, &run.result.usage) {
        println!("Estimated Cost: {}", cost.format_detailed());
    }
    for d in report.diagnostics() {
        println!("Note: {}", d);
    }
    if raw {
        println!();
        println!("{}", render::raw_json(&run.result));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use prompt_tester::types::RecencyFilter;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn recency_help_lists_exactly_the_known_filters() {
        let cli = Cli::command();
        let run = cli.find_subcommand("run").unwrap();
        let recency = run
            .get_arguments()
            .find(|a| a.get_id() == "recency")
            .unwrap();
        let help = recency.get_help().unwrap().to_string();
        for filter in RecencyFilter::ALL {
            assert!(help.contains(filter.as_str()), "{help} lacks {filter}");
        }
        assert!(!help.contains("year"));
    }

    #[test]
    fn run_flags_fill_the_form() {
        let cli = Cli::try_parse_from([
            "prompt-tester",
            "run",
            "-p",
            "ping",
            "--recency",
            "week",
            "--latitude",
            "-33.9",
            "--longitude",
            "18.4",
            "--parallel-tool-calls",
            "false",
            "--json-format",
            "{}",
        ])
        .unwrap();
        let Command::Run { form, .. } = cli.command else {
            panic!("expected run");
        };
        let form = form.into_form();
        assert_eq!(form.model, DEFAULT_MODEL);
        assert_eq!(form.search_params.recency_filter, "week");
        assert_eq!(form.location.latitude, "-33.9");
        assert_eq!(form.llm_params.parallel_tool_calls, Some(false));
        assert_eq!(form.llm_params.temperature, Some(DEFAULT_TEMPERATURE));
        assert!(form.use_json);
    }
}
