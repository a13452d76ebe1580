//! Rustsent - blog post ticker sentiment batch job
//!
//! Scans blog posts for stock mentions and stores one sentiment record per
//! (post, ticker) pair. Safe to re-run: already analyzed pairs are skipped.
//!
//! # Usage
//! ```sh
//! DATABASE_URL=sqlite://database.db cargo run -- run
//! cargo run -- insert --file manual_records.json
//! ```
//!
//! # Environment Variables
//! - `DATABASE_URL` - SQLite database (default: sqlite://database.db)
//! - `ANALYSIS_CONFIG_PATH` - TOML alias/lexicon file (default: embedded)
//! - `SENTIMENT_ID_FLOOR` - first id for an empty sentiment table (default: 56)

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use rustsent::application::analysis::PostAnalyzer;
use rustsent::application::bootstrap::PersistenceBootstrap;
use rustsent::application::manual_entry::{import_records, load_manual_records};
use rustsent::application::pipeline::{CandidateOutcome, RunScope, SentimentPipeline};
use rustsent::application::PersistenceGateway;
use rustsent::config::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(author, version, about = "Blog post ticker sentiment analyzer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze posts that have no sentiment records yet
    Run {
        /// Re-scan every post and fill in missing (post, ticker) pairs
        #[arg(long)]
        all: bool,
    },
    /// Insert hand-written analyses from a JSON file
    Insert {
        /// JSON array of records
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Load and validate the analysis configuration, then exit
    ValidateConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stdout_layer)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    match cli.command {
        Commands::ValidateConfig => {
            let analysis = config.load_analysis_config()?;
            info!(
                "Analysis config OK: {} instruments, {}/{}/{} lexicon keywords, {} theme rules",
                analysis.aliases.len(),
                analysis.lexicon.positive.len(),
                analysis.lexicon.negative.len(),
                analysis.lexicon.neutral.len(),
                analysis.rules.themes.len()
            );
        }
        Commands::Run { all } => {
            // Configuration problems abort before any post is touched.
            let analysis = Arc::new(config.load_analysis_config()?);
            let persistence = PersistenceBootstrap::init(&config.database_url).await?;

            let gateway =
                PersistenceGateway::open(persistence.sentiment_repository.clone(), config.id_floor)
                    .await?;
            let mut pipeline = SentimentPipeline::new(
                persistence.article_repository.clone(),
                gateway,
                PostAnalyzer::new(analysis),
            );

            let scope = if all { RunScope::All } else { RunScope::Unanalyzed };
            let summary = pipeline.run(scope, Utc::now().date_naive()).await?;

            for report in summary.reports.iter().filter(|r| !r.instruments.is_empty()) {
                for instrument in &report.instruments {
                    if let CandidateOutcome::Written { id, polarity, score } = instrument.outcome {
                        info!(
                            "post {} -> {} #{}: {} ({})",
                            report.post_key, instrument.ticker, id, polarity, score
                        );
                    }
                }
            }
            info!(
                "Total: {} saved, {} skipped, {} failed",
                summary.written, summary.skipped, summary.failed
            );
            if summary.failed > 0 {
                warn!("{} records could not be written", summary.failed);
            }
        }
        Commands::Insert { file } => {
            let records = load_manual_records(&file)?;
            let persistence = PersistenceBootstrap::init(&config.database_url).await?;
            let mut gateway =
                PersistenceGateway::open(persistence.sentiment_repository.clone(), config.id_floor)
                    .await?;

            let summary = import_records(&mut gateway, records, Utc::now().date_naive()).await;
            info!(
                "Inserted ids {:?}; {} skipped, {} rejected, {} failed",
                summary.written, summary.skipped, summary.rejected, summary.failed
            );
        }
    }

    Ok(())
}
