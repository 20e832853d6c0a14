//! `SeaORM` Entity for price snapshot time-series storage
//!
//! One row per (crypto_id, snapshot_time) bucket; the unique constraint on
//! that pair is the deduplication key. Rows are insert-only.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "price_snapshots")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub snapshot_id: i64,
    pub crypto_id: String,
    pub batch_id: i32,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))")]
    pub current_price: Decimal,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub high_24h: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub low_24h: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub price_change_24h: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub price_change_pct_24h: Option<Decimal>,
    /// All-time high
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub ath: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub ath_change_pct: Option<Decimal>,
    pub ath_date: Option<DateTimeWithTimeZone>,
    /// All-time low
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub atl: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub atl_change_pct: Option<Decimal>,
    pub atl_date: Option<DateTimeWithTimeZone>,
    /// Provider-reported last update time
    pub last_updated: DateTimeWithTimeZone,
    /// Batch ingestion time rounded to the nearest snapshot interval
    /// boundary (whole seconds)
    pub snapshot_time: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cryptocurrencies::Entity",
        from = "Column::CryptoId",
        to = "super::cryptocurrencies::Column::CryptoId"
    )]
    Cryptocurrencies,
    #[sea_orm(
        belongs_to = "super::ingestion_batches::Entity",
        from = "Column::BatchId",
        to = "super::ingestion_batches::Column::BatchId"
    )]
    IngestionBatches,
    #[sea_orm(has_one = "super::market_metrics::Entity")]
    MarketMetrics,
}

impl Related<super::cryptocurrencies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cryptocurrencies.def()
    }
}

impl Related<super::ingestion_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::IngestionBatches.def()
    }
}

impl Related<super::market_metrics::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MarketMetrics.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
