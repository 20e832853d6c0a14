//! `SeaORM` Entity for the ingestion_batches audit table

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ingestion_batches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub batch_id: i32,
    /// When the upstream fetch produced this document
    pub ingested_at: DateTimeWithTimeZone,
    /// Upstream provider label, e.g. "CoinGecko"
    pub source: String,
    /// Record count declared by the input document
    pub record_count: i32,
    /// 'pending', 'completed' or 'failed'
    pub status: String,
    pub created_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::price_snapshots::Entity")]
    PriceSnapshots,
}

impl Related<super::price_snapshots::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceSnapshots.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Batch statuses. A batch starts as `pending`; callers only ever observe
/// `completed` (returned outcome) or `failed` (propagated error).
pub mod status {
    pub const PENDING: &str = "pending";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
}
