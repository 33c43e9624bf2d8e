//! # dealflow CLI
//!
//! Command-line front end for the enrichment pipeline.
//!
//! - `enrich`: fetch, extract, and cache one company website
//! - `show`: print a cached enrichment without touching the network
//! - `list`: cached subjects
//! - `validate`: check a JSON payload against the extraction schema
//! - `schema`: print the response schema sent to the generator
//! - `serve`: run the HTTP surface
//!
//! Credentials and defaults come from the environment (see `dealflow::config`).

mod telemetry;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use dealflow::cache::EnrichmentStore;
use dealflow::config::Settings;
use dealflow::enrichment::{EnrichmentResult, Refresh};
use dealflow::extractor::{response_schema, validate_profile};
use dealflow::subject::EnrichmentRequest;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::instrument;

#[derive(Parser)]
#[command(author, version, about = "Enrich company websites with structured investor intelligence", long_about = None)]
struct Cli {
    /// Directory for cached enrichments (overrides DEALFLOW_CACHE_DIR)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Enrich a company website
    Enrich(EnrichArgs),

    /// Show the cached enrichment for a website
    Show(ShowArgs),

    /// List cached enrichments
    List(ListArgs),

    /// Validate an extraction payload against the schema
    Validate(ValidateArgs),

    /// Print the response schema sent to the generation service
    Schema,

    /// Serve the enrichment API over HTTP
    Serve(ServeArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
struct EnrichArgs {
    /// Website URL of the company
    #[arg(required = true)]
    url: String,

    /// Re-run the pipeline even when a cached entry exists
    #[arg(short, long)]
    force: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct ShowArgs {
    /// Website URL of the company
    #[arg(required = true)]
    url: String,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Show summaries as well as URLs
    #[arg(short, long)]
    details: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// JSON file holding a summary/bullets/keywords/signals payload
    #[arg(required = true)]
    file: PathBuf,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _telemetry = telemetry::init_tracing_subscriber(cli.log_dir.as_deref())?;

    let mut settings = Settings::from_env()?;
    if let Some(cache_dir) = cli.cache_dir {
        settings.cache_dir = cache_dir;
    }

    match cli.command {
        Some(Commands::Enrich(args)) => enrich_command(&settings, args).await?,
        Some(Commands::Show(args)) => show_command(&settings, args).await?,
        Some(Commands::List(args)) => list_command(&settings, args).await?,
        Some(Commands::Validate(args)) => validate_command(args).await?,
        Some(Commands::Schema) => println!("{}", serde_json::to_string_pretty(response_schema())?),
        Some(Commands::Serve(args)) => {
            println!("Serving on http://{}", args.addr);
            dealflow::server::serve(args.addr, settings.build_enricher()?).await?;
        }
        None => {
            // If no command is provided, show help
            let _ = Cli::parse_from(["dealflow", "--help"]);
        }
    }

    Ok(())
}

#[instrument(skip(settings))]
async fn enrich_command(settings: &Settings, args: EnrichArgs) -> anyhow::Result<()> {
    let enricher = settings.build_enricher()?;
    let refresh = if args.force { Refresh::Force } else { Refresh::IfMissing };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner} {msg} [{elapsed}]")?);
    spinner.set_message(format!("Enriching {}...", args.url));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let outcome = enricher
        .enrich_with(&EnrichmentRequest::new(&args.url), refresh)
        .await;
    spinner.finish_and_clear();

    let result = outcome?;
    print_result(&result, args.format)
}

#[instrument(skip(settings))]
async fn show_command(settings: &Settings, args: ShowArgs) -> anyhow::Result<()> {
    let enricher = settings.build_enricher()?;
    match enricher.get_cached(&args.url).await? {
        Some(result) => print_result(&result, args.format),
        None => anyhow::bail!("No enrichment cached for {}", args.url),
    }
}

#[instrument(skip(settings))]
async fn list_command(settings: &Settings, args: ListArgs) -> anyhow::Result<()> {
    let store = settings.file_store();
    let entries = store.list().await?;

    if entries.is_empty() {
        println!("No cached enrichments in {}", store.base_path().display());
        return Ok(());
    }

    println!("Cached enrichments:");
    for (key, result) in entries {
        println!("  - {} (enriched {})", key, result.enriched_at.format("%Y-%m-%d %H:%M UTC"));
        if args.details {
            println!("    {}", result.summary);
        }
    }

    Ok(())
}

async fn validate_command(args: ValidateArgs) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let value: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", args.file.display()))?;

    let profile = validate_profile(value)?;
    println!(
        "Valid: {} bullets, {} keywords, {} signals",
        profile.bullets.len(),
        profile.keywords.len(),
        profile.signals.len()
    );
    Ok(())
}

fn print_result(result: &EnrichmentResult, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Text => {
            println!("{}\n", result.summary);

            println!("What they do:");
            for bullet in &result.bullets {
                println!("  • {}", bullet);
            }

            println!("\nKeywords: {}", result.keywords.join(", "));

            println!("\nSignals:");
            for signal in &result.signals {
                let marker = if signal.positive { '+' } else { '-' };
                println!("  {} {}", marker, signal.label);
            }

            println!("\nSources:");
            for source in &result.sources {
                println!("  {} ({})", source.title, source.url);
            }

            println!("\nEnriched at {}", result.enriched_at.to_rfc3339());
        }
    }
    Ok(())
}
