//! `SeaORM` Entity for cryptocurrency master data
//!
//! Slowly-changing metadata keyed by the provider's stable coin id.
//! Upserted on every sighting; no history kept.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cryptocurrencies")]
pub struct Model {
    /// Stable external id, e.g. "bitcoin"
    #[sea_orm(primary_key, auto_increment = false)]
    pub crypto_id: String,
    pub symbol: String,
    pub name: String,
    pub image_url: Option<String>,
    pub updated_at: Option<DateTimeWithTimeZone>,
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
