//! `SeaORM` Entity for market metrics
//!
//! 1:1 with a price snapshot; only written when the parent snapshot was
//! newly inserted, so metrics never exist for a deduplicated bucket.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "market_metrics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub metric_id: i64,
    #[sea_orm(unique)]
    pub snapshot_id: i64,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub market_cap: Option<Decimal>,
    pub market_cap_rank: Option<i32>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub fully_diluted_valuation: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub total_volume: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub market_cap_change_24h: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub market_cap_change_pct_24h: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub circulating_supply: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub total_supply: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub max_supply: Option<Decimal>,
    // ROI triple: all three null, or all three from the provider's nested
    // roi structure
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub roi_times: Option<Decimal>,
    pub roi_currency: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((30, 10)))", nullable)]
    pub roi_percentage: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::price_snapshots::Entity",
        from = "Column::SnapshotId",
        to = "super::price_snapshots::Column::SnapshotId"
    )]
    PriceSnapshots,
}

impl Related<super::price_snapshots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceSnapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
