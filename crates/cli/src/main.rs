//! TextLens CLI entry point.
//!
//! This binary is the composition root for the workspace:
//!
//! 1. **Load configuration**: `.env` via `dotenvy`, then
//!    [`llm::OpenAiConfig`] and [`fetch::FetchConfig`] from the environment.
//! 2. **Wire observability**: see [`observability`].
//! 3. **Construct infrastructure**: an [`llm::OpenAiProvider`] and, for
//!    articles, an [`fetch::HtmlFetcher`], injected into the stock pipelines.
//! 4. **Run the selected command** and print the resulting record.

mod observability;
mod output;

use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fetch::{FetchConfig, HtmlFetcher};
use llm::{OpenAiConfig, OpenAiProvider};
use nodes::{article_analysis_pipeline, text_analysis_pipeline, CONNECTIVITY_CHECK};
use pipeline::{CompiledPipeline, Prompt, Record, RunLog, TextService};
use tracing::info;

const SAMPLE_TEXT: &str = "Anthropic's MCP (Model Context Protocol) is an open-source \
powerhouse that lets your applications interact effortlessly with APIs across various \
systems.";

#[derive(Debug, Parser)]
#[command(name = "textlens", version, about = "Analyse text and web articles with an LLM")]
struct Cli {
    /// Print the final record as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify, extract entities from and summarise a piece of text.
    Text {
        /// Text to analyse. Falls back to --file, then stdin, then a built-in sample.
        text: Option<String>,
        /// Read the text from a file.
        #[arg(short, long, conflicts_with = "text")]
        file: Option<PathBuf>,
    },
    /// Fetch an article and run the full analysis on it.
    Article {
        /// Article URL (http or https).
        url: String,
    },
    /// Send a short prompt to verify the API key and model.
    Check,
}

fn read_input(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }
    if let Some(path) = file {
        return std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()));
    }
    let stdin = std::io::stdin();
    if !stdin.is_terminal() {
        let piped = std::io::read_to_string(stdin).context("failed to read stdin")?;
        if !piped.trim().is_empty() {
            return Ok(piped);
        }
    }
    Ok(SAMPLE_TEXT.to_owned())
}

async fn invoke(pipeline: &CompiledPipeline, initial: Record) -> Result<Record> {
    let mut log = RunLog::new();
    let record = pipeline
        .invoke_observed(initial, &mut log)
        .await
        .with_context(|| format!("pipeline '{}' failed", pipeline.name()))?;

    let total_ms: u64 = log.traces().iter().map(|t| t.duration_ms()).sum();
    info!(
        pipeline = %pipeline.name(),
        steps = log.traces().len(),
        total_ms,
        "Analysis finished"
    );
    Ok(record)
}

fn print_record(record: &Record, json: bool) -> Result<()> {
    if json {
        println!("{}", output::render_json(record).context("failed to encode record")?);
    } else {
        print!("{}", output::render_report(record));
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = OpenAiConfig::from_env().context("invalid OpenAI configuration")?;
    let settings = config.model_settings();
    info!(model = %settings.model, temperature = %settings.temperature, "Using model");
    let service: Arc<dyn TextService> = Arc::new(OpenAiProvider::new(config));

    match cli.command {
        Command::Text { text, file } => {
            let text = read_input(text, file)?;
            let pipeline = text_analysis_pipeline(service, &settings)?;
            let record = invoke(&pipeline, Record::from_text(text)).await?;
            print_record(&record, cli.json)
        }
        Command::Article { url } => {
            let fetch_config = FetchConfig::from_env().context("invalid fetch configuration")?;
            let fetcher = Arc::new(HtmlFetcher::new(&fetch_config)?);
            let pipeline = article_analysis_pipeline(service, fetcher, &settings)?;
            let record = invoke(&pipeline, Record::from_url(url)).await?;
            print_record(&record, cli.json)
        }
        Command::Check => {
            let completion = service
                .complete(&Prompt::user(CONNECTIVITY_CHECK), &settings)
                .await
                .context("connectivity check failed")?;
            if cli.json {
                let body = serde_json::json!({ "model": settings.model, "reply": completion.text });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("{}", completion.text.trim());
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; variables may come from the environment.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let telemetry = observability::init()?;

    let result = run(cli).await;
    telemetry.shutdown();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_text_with_global_json_flag() {
        let cli = Cli::try_parse_from(["textlens", "text", "hello", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Command::Text { text: Some(ref t), file: None } if t == "hello"
        ));
    }

    #[test]
    fn text_and_file_conflict() {
        assert!(Cli::try_parse_from(["textlens", "text", "hi", "--file", "a.txt"]).is_err());
    }

    #[test]
    fn article_requires_a_url() {
        assert!(Cli::try_parse_from(["textlens", "article"]).is_err());
        let cli = Cli::try_parse_from(["textlens", "--json", "article", "https://a.b/c"]).unwrap();
        assert!(matches!(cli.command, Command::Article { ref url } if url == "https://a.b/c"));
    }

    #[test]
    fn explicit_text_wins() {
        assert_eq!(read_input(Some("given".into()), None).unwrap(), "given");
    }

    #[test]
    fn file_input_is_read() {
        let path = std::env::temp_dir().join(format!("textlens-input-{}.txt", std::process::id()));
        std::fs::write(&path, "from a file").unwrap();
        let text = read_input(None, Some(path.clone())).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(text, "from a file");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = read_input(None, Some(PathBuf::from("/nonexistent/textlens.txt"))).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
