use sea_orm::Database;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crypto_data_pipeline::config;
use crypto_data_pipeline::services::loader::{CryptoDataLoader, LoadOutcome};

const DEFAULT_INPUT: &str = "landing_zone/crypto_prices_sample.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let database_url = config::database_url_from_env()?;

    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;

    let loader = CryptoDataLoader::new(db);

    // Single staged document by default; pass a directory to load every
    // staged document independently.
    let target = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));

    if target.is_dir() {
        let outcomes = loader.load_directory(&target).await?;
        for outcome in &outcomes {
            print_outcome(outcome);
        }
        tracing::info!(batches = outcomes.len(), "Directory load finished");
    } else {
        let outcome = loader.load_json_file(&target).await?;
        print_outcome(&outcome);
    }

    Ok(())
}

fn print_outcome(outcome: &LoadOutcome) {
    println!(
        "✅ Batch {}: {} loaded, {} duplicates, {} quality failures",
        outcome.batch_id, outcome.loaded, outcome.duplicates, outcome.quality_failures
    );
}
