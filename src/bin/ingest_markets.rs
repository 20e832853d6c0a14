//! Stage a raw market data document in the landing zone.
//!
//! Fetches the current markets listing for the tracked coins and writes
//! the payload the loader consumes: ingestion timestamp, source label and
//! the provider's records, untouched.

use chrono::Utc;
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crypto_data_pipeline::services::coingecko::CoinGeckoService;

const DEFAULT_TRACKED_COINS: &str = "bitcoin,ethereum,solana";
const OUTPUT_FILE: &str = "crypto_prices_sample.json";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenv().ok();

    let api_key = env::var("COINGECKO_API_KEY").ok().filter(|k| !k.is_empty());
    let base_url = env::var("COINGECKO_BASE_URL").ok();
    let ids = env::var("COINGECKO_IDS").unwrap_or_else(|_| DEFAULT_TRACKED_COINS.to_string());

    let output_dir = PathBuf::from(
        env::var("LANDING_ZONE_DIR").unwrap_or_else(|_| "landing_zone".to_string()),
    );
    tokio::fs::create_dir_all(&output_dir).await?;

    let coingecko = CoinGeckoService::new(api_key, base_url);
    let records = coingecko.fetch_markets(&ids).await?;
    let record_count = records.len();

    let payload = serde_json::json!({
        "ingested_at": Utc::now().to_rfc3339(),
        "source": "CoinGecko",
        "records": records,
    });

    let output_file = output_dir.join(OUTPUT_FILE);
    tokio::fs::write(&output_file, serde_json::to_vec_pretty(&payload)?).await?;

    tracing::info!(
        records = record_count,
        path = %output_file.display(),
        "Staged market data document"
    );
    println!("✅ Data saved to {}", output_file.display());

    Ok(())
}
