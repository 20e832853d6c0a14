use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr};
use std::env;

/// Set up test database connection
/// Uses TEST_DATABASE_URL environment variable or falls back to default
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let database_url = env::var("TEST_DATABASE_URL").unwrap_or_else(|_| {
        "postgresql://postgres@localhost:5432/crypto_pipeline_test".to_string()
    });

    Database::connect(&database_url).await
}

/// Provision the pipeline schema in the test database. Idempotent; tests
/// keep their rows apart with per-run unique ids instead of truncating,
/// so runs never interfere with each other.
pub async fn provision_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute_unprepared(
        r#"
        CREATE TABLE IF NOT EXISTS ingestion_batches (
            batch_id SERIAL PRIMARY KEY,
            ingested_at TIMESTAMPTZ NOT NULL,
            source TEXT NOT NULL,
            record_count INTEGER NOT NULL,
            status TEXT NOT NULL,
            created_at TIMESTAMPTZ
        );
        CREATE TABLE IF NOT EXISTS cryptocurrencies (
            crypto_id TEXT PRIMARY KEY,
            symbol TEXT NOT NULL,
            name TEXT NOT NULL,
            image_url TEXT,
            updated_at TIMESTAMPTZ
        );
        CREATE TABLE IF NOT EXISTS price_snapshots (
            snapshot_id BIGSERIAL PRIMARY KEY,
            crypto_id TEXT NOT NULL REFERENCES cryptocurrencies (crypto_id),
            batch_id INTEGER NOT NULL REFERENCES ingestion_batches (batch_id),
            current_price NUMERIC(30, 10) NOT NULL,
            high_24h NUMERIC(30, 10),
            low_24h NUMERIC(30, 10),
            price_change_24h NUMERIC(30, 10),
            price_change_pct_24h NUMERIC(30, 10),
            ath NUMERIC(30, 10),
            ath_change_pct NUMERIC(30, 10),
            ath_date TIMESTAMPTZ,
            atl NUMERIC(30, 10),
            atl_change_pct NUMERIC(30, 10),
            atl_date TIMESTAMPTZ,
            last_updated TIMESTAMPTZ NOT NULL,
            snapshot_time TIMESTAMP NOT NULL,
            UNIQUE (crypto_id, snapshot_time)
        );
        CREATE TABLE IF NOT EXISTS market_metrics (
            metric_id BIGSERIAL PRIMARY KEY,
            snapshot_id BIGINT NOT NULL UNIQUE REFERENCES price_snapshots (snapshot_id),
            market_cap NUMERIC(30, 10),
            market_cap_rank INTEGER,
            fully_diluted_valuation NUMERIC(30, 10),
            total_volume NUMERIC(30, 10),
            market_cap_change_24h NUMERIC(30, 10),
            market_cap_change_pct_24h NUMERIC(30, 10),
            circulating_supply NUMERIC(30, 10),
            total_supply NUMERIC(30, 10),
            max_supply NUMERIC(30, 10),
            roi_times NUMERIC(30, 10),
            roi_currency TEXT,
            roi_percentage NUMERIC(30, 10)
        );
        "#,
    )
    .await?;
    Ok(())
}

/// Process- and time-unique identifier so concurrent or repeated test
/// runs never collide on the snapshot dedup key or master data rows.
#[allow(dead_code)]
pub fn unique_id(prefix: &str) -> String {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    format!("{}-{}-{}", prefix, std::process::id(), nanos)
}
