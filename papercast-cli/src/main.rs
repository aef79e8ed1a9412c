// papercast - fetch, localize and read aloud today's new arXiv papers
// Run once per day; state lives in the id-set file and the news log

use anyhow::{Context, Result};
use clap::Parser;
use papercast_cli::{AppConfig, Pipeline};
use papercast_core::ArxivClient;
use papercast_llm::{GoogleProvider, Localizer};
use papercast_spk::SpeechSynthesizer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "papercast")]
#[command(about = "Daily digest of new arXiv papers, localized and read aloud", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path (TOML or JSON)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let api_key = match config.api_key(|name| std::env::var(name).ok()) {
        Ok(key) => key,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config, api_key).await {
        error!("Run failed: {:#}", e);
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: AppConfig, api_key: String) -> Result<()> {
    info!("🚀 Starting papercast...");

    let source = ArxivClient::new(config.digest.request_timeout_secs)
        .context("Failed to create arXiv client")?;

    let provider = GoogleProvider::from_config(&config.llm, api_key)
        .context("Failed to create Gemini provider")?;
    let localizer = Localizer::new(Arc::new(provider), config.llm.clone());
    info!("✅ Localizer ready ({})", config.llm.model);

    let speech = if config.speech.enabled {
        let synth = SpeechSynthesizer::new(config.speech.clone())
            .context("Failed to create speech synthesizer")?;
        info!("✅ Speech ready ({})", synth.engine_name());
        Some(synth)
    } else {
        info!("ℹ️  Speech synthesis disabled");
        None
    };

    let pipeline = Pipeline::new(config.digest.clone(), Arc::new(source), localizer, speech);
    let summary = pipeline.run().await?;

    info!(
        "✅ Done: {} fetched, {} logged, {} translation fallback(s), {} audio failure(s), {} topic(s) failed",
        summary.papers_fetched,
        summary.papers_logged,
        summary.translation_fallbacks,
        summary.audio_failures,
        summary.topics_failed
    );
    Ok(())
}
