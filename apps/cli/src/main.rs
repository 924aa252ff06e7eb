use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use vidigest_core::wire::{error_detail_message, SummarizeRequest, SummarizeResponse};
use vidigest_core::{format_summary_readable, format_timestamp, Pipeline, PipelineConfig, Provider};

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Groq,
    Openai,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Groq => Provider::Groq,
            CliProvider::Openai => Provider::Openai,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "vidigest")]
#[command(about = "Summarize a captioned video into a timestamped digest")]
struct Cli {
    /// Video URL
    url: String,

    /// Digest language (e.g. "ja", "en")
    #[arg(short, long, default_value = "ja")]
    lang: String,

    /// AI provider for summary generation
    #[arg(short, long, default_value = "groq")]
    provider: CliProvider,

    /// Call a running vidigest server at this base URL instead of
    /// summarizing locally (e.g. "http://localhost:3000")
    #[arg(long)]
    remote: Option<String>,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    println!(
        "\n{}  {}\n",
        style("vidigest").cyan().bold(),
        style("Video Digest").dim()
    );

    if let Some(base_url) = cli.remote {
        return summarize_remote(&base_url, &cli.url, &cli.lang).await;
    }

    let provider: Provider = cli.provider.into();

    // Validate API key early
    if let Err(e) = provider.validate_api_key() {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    let config = PipelineConfig::from_env();
    let pipeline = Pipeline::for_provider(provider.clone(), config)?;

    let spinner = create_spinner(&format!(
        "Summarizing with {} ({})...",
        provider.name(),
        cli.lang
    ));
    let summary = match pipeline.run(&cli.url, &cli.lang).await {
        Ok(summary) => {
            spinner.finish_with_message(format!(
                "{} Digest ready: {} key points, {}",
                style("✓").green().bold(),
                summary.key_points.len(),
                summary
                    .duration_seconds
                    .map(|d| format_timestamp(d as f64))
                    .unwrap_or_else(|| "unknown length".into()),
            ));
            summary
        }
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    println!("{}", style("─".repeat(60)).dim());
    println!("{}", format_summary_readable(&summary));

    Ok(())
}

/// Summarize through a running server, decoding both the enriched and
/// legacy key-point shapes and all known error-detail shapes.
async fn summarize_remote(base_url: &str, url: &str, lang: &str) -> Result<()> {
    let endpoint = format!("{}/api/summarize", base_url.trim_end_matches('/'));
    let request = SummarizeRequest {
        url: url.to_string(),
        language: lang.to_string(),
    };

    let spinner = create_spinner(&format!("Summarizing via {}...", endpoint));
    let response = reqwest::Client::new()
        .post(&endpoint)
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        spinner.finish_and_clear();
        let status = response.status();
        let body = response
            .json::<serde_json::Value>()
            .await
            .unwrap_or(serde_json::Value::Null);
        let message = error_detail_message(&body["detail"]);
        eprintln!(
            "{} {} ({})",
            style("Error:").red().bold(),
            message,
            status
        );
        std::process::exit(1);
    }

    let digest: SummarizeResponse = response.json().await?;
    spinner.finish_with_message(format!(
        "{} Digest ready: {} key points",
        style("✓").green().bold(),
        digest.key_points.len()
    ));

    println!("{}", style("─".repeat(60)).dim());
    println!("# {}\n", digest.title);
    println!("{}\n", digest.summary);
    if !digest.topics.is_empty() {
        println!("{}", style(digest.topics.join(" / ")).yellow());
        println!();
    }
    for (i, point) in digest.key_points.iter().enumerate() {
        match point.start_seconds() {
            Some(seconds) => println!(
                "{}. [{}] {}",
                i + 1,
                style(format_timestamp(seconds as f64)).cyan(),
                point.text()
            ),
            None => println!("{}. {}", i + 1, point.text()),
        }
    }

    Ok(())
}
