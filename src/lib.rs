// src/lib.rs

pub mod config;

pub mod entities {
    pub mod prelude;
    pub mod cryptocurrencies;
    pub mod ingestion_batches;
    pub mod market_metrics;
    pub mod price_snapshots;
}

pub mod services {
    pub mod bucketing;
    pub mod coingecko;
    pub mod loader;
    pub mod validator;
}

pub mod models;
