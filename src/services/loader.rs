//! Crypto market data loader
//!
//! Loads staged raw market documents into the normalized schema: one
//! ingestion batch per document, upserted cryptocurrency master data,
//! time-bucket deduplicated price snapshots and their 1:1 market metrics.
//!
//! All data writes for a batch run inside one transaction. The batch row
//! itself is committed up front so the audit trail, and a terminal
//! `failed` status written after a rollback, survive the discarded unit
//! of work.

use std::path::Path;

use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Set,
    TransactionTrait, TryInsertResult,
};
use tracing::{debug, error, info, warn};

use crate::entities::ingestion_batches::status;
use crate::entities::{cryptocurrencies, ingestion_batches, market_metrics, price_snapshots};
use crate::entities::prelude::*;
use crate::models::market_data::{parse_provider_timestamp, RawBatchDocument, RawMarketRecord};
use crate::services::bucketing::{round_to_snapshot_interval, DEFAULT_SNAPSHOT_INTERVAL_MINUTES};
use crate::services::validator::validate_record;

/// Error types for the load path. Data-quality rejections are not here;
/// they are per-record outcomes counted by the coordinator.
#[derive(Debug)]
pub enum LoadError {
    Database(DbErr),
    /// The input document could not be read or did not parse
    MalformedDocument(String),
    /// A provider timestamp inside a record could not be parsed
    InvalidTimestamp { field: &'static str, value: String },
    Io(std::io::Error),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Database(err) => write!(f, "Database error: {}", err),
            LoadError::MalformedDocument(msg) => write!(f, "Malformed input document: {}", msg),
            LoadError::InvalidTimestamp { field, value } => {
                write!(f, "Unparseable {} timestamp '{}'", field, value)
            }
            LoadError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Database(err) => Some(err),
            LoadError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbErr> for LoadError {
    fn from(err: DbErr) -> Self {
        LoadError::Database(err)
    }
}

impl From<std::io::Error> for LoadError {
    fn from(err: std::io::Error) -> Self {
        LoadError::Io(err)
    }
}

/// Per-batch outcome report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub batch_id: i32,
    /// Records with a newly inserted snapshot (and metrics row)
    pub loaded: usize,
    /// Records skipped because their bucket already holds a snapshot
    pub duplicates: usize,
    /// Records rejected by the data-quality gate
    pub quality_failures: usize,
}

/// Loads staged market data documents into the database.
pub struct CryptoDataLoader {
    db: DatabaseConnection,
    interval_minutes: i64,
}

impl CryptoDataLoader {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_interval(db, DEFAULT_SNAPSHOT_INTERVAL_MINUTES)
    }

    pub fn with_interval(db: DatabaseConnection, interval_minutes: i64) -> Self {
        Self {
            db,
            interval_minutes,
        }
    }

    /// Load one parsed input document as one ingestion batch.
    ///
    /// The snapshot bucket is computed once from the document's own
    /// ingestion timestamp, so every record in the document shares one
    /// bucket regardless of per-record timestamps. On any propagated
    /// error the batch's data writes are rolled back and the batch row is
    /// left with a `failed` status in a follow-up commit.
    pub async fn load_document(&self, doc: &RawBatchDocument) -> Result<LoadOutcome, LoadError> {
        let batch_id = create_ingestion_batch(&self.db, doc).await?;
        let snapshot_time = round_to_snapshot_interval(doc.ingested_at, self.interval_minutes);
        debug!(batch_id, snapshot_time = %snapshot_time, "Computed snapshot bucket for batch");

        let txn = self.db.begin().await?;

        let result = async {
            let outcome = load_records(&txn, batch_id, snapshot_time, &doc.records).await?;
            update_batch_status(&txn, batch_id, status::COMPLETED).await?;
            Ok::<LoadOutcome, LoadError>(outcome)
        }
        .await;

        match result {
            Ok(outcome) => {
                if let Err(commit_err) = txn.commit().await {
                    error!(batch_id, error = %commit_err, "Commit failed");
                    self.mark_batch_failed(batch_id).await;
                    return Err(commit_err.into());
                }
                info!(
                    batch_id,
                    loaded = outcome.loaded,
                    duplicates = outcome.duplicates,
                    quality_failures = outcome.quality_failures,
                    "Batch completed"
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(batch_id, error = %err, "Batch load failed, rolling back");
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(batch_id, error = %rollback_err, "Rollback failed");
                }
                self.mark_batch_failed(batch_id).await;
                Err(err)
            }
        }
    }

    /// Read, parse and load one staged JSON document.
    pub async fn load_json_file(&self, path: &Path) -> Result<LoadOutcome, LoadError> {
        info!(path = %path.display(), "Loading market data document");
        let raw = tokio::fs::read_to_string(path).await?;
        let doc: RawBatchDocument = serde_json::from_str(&raw)
            .map_err(|err| LoadError::MalformedDocument(format!("{}: {}", path.display(), err)))?;
        self.load_document(&doc).await
    }

    /// Load every `.json` document in a directory, in path order. A
    /// failing document is logged and skipped; it never blocks or rolls
    /// back the others.
    pub async fn load_directory(&self, dir: &Path) -> Result<Vec<LoadOutcome>, LoadError> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        info!(count = paths.len(), dir = %dir.display(), "Found staged documents");

        let mut outcomes = Vec::new();
        for path in paths {
            match self.load_json_file(&path).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(err) => {
                    error!(path = %path.display(), error = %err, "Failed to load document, continuing");
                }
            }
        }
        Ok(outcomes)
    }

    /// Best-effort terminal status for a batch whose unit of work was
    /// discarded. The batch row was committed at creation, so this write
    /// survives independently.
    async fn mark_batch_failed(&self, batch_id: i32) {
        if let Err(err) = update_batch_status(&self.db, batch_id, status::FAILED).await {
            warn!(batch_id, error = %err, "Could not record failed batch status");
        }
    }
}

/// Route every record through validate -> upsert -> snapshot insert ->
/// metrics, aggregating the three counters.
async fn load_records<C: ConnectionTrait>(
    conn: &C,
    batch_id: i32,
    snapshot_time: NaiveDateTime,
    records: &[RawMarketRecord],
) -> Result<LoadOutcome, LoadError> {
    let mut outcome = LoadOutcome {
        batch_id,
        loaded: 0,
        duplicates: 0,
        quality_failures: 0,
    };

    for record in records {
        if let Err(dq_err) = validate_record(record) {
            outcome.quality_failures += 1;
            warn!(
                crypto_id = record.id.as_deref().unwrap_or("<unknown>"),
                error = %dq_err,
                "Data quality failure, record skipped"
            );
            continue;
        }

        let crypto_id = upsert_cryptocurrency(conn, record).await?;

        match insert_price_snapshot(conn, &crypto_id, batch_id, record, snapshot_time).await? {
            Some(snapshot_id) => {
                insert_market_metrics(conn, snapshot_id, record).await?;
                outcome.loaded += 1;
            }
            None => {
                debug!(
                    crypto_id = %crypto_id,
                    snapshot_time = %snapshot_time,
                    "Duplicate snapshot skipped"
                );
                outcome.duplicates += 1;
            }
        }
    }

    Ok(outcome)
}

/// Create the batch audit row with `pending` status.
async fn create_ingestion_batch<C: ConnectionTrait>(
    conn: &C,
    doc: &RawBatchDocument,
) -> Result<i32, LoadError> {
    let batch = ingestion_batches::ActiveModel {
        ingested_at: Set(doc.ingested_at.fixed_offset()),
        source: Set(doc.source.clone()),
        record_count: Set(doc.records.len() as i32),
        status: Set(status::PENDING.to_owned()),
        created_at: Set(Some(Utc::now().fixed_offset())),
        ..Default::default()
    };
    let inserted = batch.insert(conn).await?;
    info!(
        batch_id = inserted.batch_id,
        source = %inserted.source,
        record_count = inserted.record_count,
        "Created ingestion batch"
    );
    Ok(inserted.batch_id)
}

async fn update_batch_status<C: ConnectionTrait>(
    conn: &C,
    batch_id: i32,
    new_status: &str,
) -> Result<(), DbErr> {
    let batch = ingestion_batches::ActiveModel {
        batch_id: Set(batch_id),
        status: Set(new_status.to_owned()),
        ..Default::default()
    };
    batch.update(conn).await?;
    Ok(())
}

/// Insert-or-update master data for the record's asset, returning the
/// canonical asset id. Last write wins; repeated calls converge on the
/// same row.
async fn upsert_cryptocurrency<C: ConnectionTrait>(
    conn: &C,
    record: &RawMarketRecord,
) -> Result<String, LoadError> {
    // The validator rejects records without identity fields before this
    // point; an empty id must never become a primary key regardless.
    let coin = cryptocurrencies::ActiveModel {
        crypto_id: Set(required_field(record.id.as_deref(), "id")?),
        symbol: Set(required_field(record.symbol.as_deref(), "symbol")?),
        name: Set(required_field(record.name.as_deref(), "name")?),
        image_url: Set(record.image.clone()),
        updated_at: Set(Some(Utc::now().fixed_offset())),
    };

    let result = Cryptocurrencies::insert(coin)
        .on_conflict(
            OnConflict::column(cryptocurrencies::Column::CryptoId)
                .update_columns([
                    cryptocurrencies::Column::Symbol,
                    cryptocurrencies::Column::Name,
                    cryptocurrencies::Column::ImageUrl,
                    cryptocurrencies::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec(conn)
        .await?;

    Ok(result.last_insert_id)
}

/// Attempt to insert one price snapshot for (crypto_id, snapshot_time).
///
/// The existence check and the insert are a single storage-level
/// insert-or-ignore, so concurrent loaders targeting the same bucket
/// cannot both win; the loser observes `None` (duplicate), not an error.
async fn insert_price_snapshot<C: ConnectionTrait>(
    conn: &C,
    crypto_id: &str,
    batch_id: i32,
    record: &RawMarketRecord,
    snapshot_time: NaiveDateTime,
) -> Result<Option<i64>, LoadError> {
    let last_updated = match record.last_updated.as_deref() {
        Some(raw) => parse_timestamp_field(raw, "last_updated")?,
        None => {
            return Err(LoadError::InvalidTimestamp {
                field: "last_updated",
                value: String::new(),
            })
        }
    };
    let ath_date = parse_optional_date(record.ath_date.as_deref(), "ath_date")?;
    let atl_date = parse_optional_date(record.atl_date.as_deref(), "atl_date")?;

    let snapshot = price_snapshots::ActiveModel {
        crypto_id: Set(crypto_id.to_owned()),
        batch_id: Set(batch_id),
        current_price: Set(record.current_price.unwrap_or_default()),
        high_24h: Set(record.high_24h),
        low_24h: Set(record.low_24h),
        price_change_24h: Set(record.price_change_24h),
        price_change_pct_24h: Set(record.price_change_percentage_24h),
        ath: Set(record.ath),
        ath_change_pct: Set(record.ath_change_percentage),
        ath_date: Set(ath_date),
        atl: Set(record.atl),
        atl_change_pct: Set(record.atl_change_percentage),
        atl_date: Set(atl_date),
        last_updated: Set(last_updated),
        snapshot_time: Set(snapshot_time),
        ..Default::default()
    };

    let result = PriceSnapshots::insert(snapshot)
        .on_conflict(
            OnConflict::columns([
                price_snapshots::Column::CryptoId,
                price_snapshots::Column::SnapshotTime,
            ])
            .do_nothing()
            .to_owned(),
        )
        .do_nothing()
        .exec(conn)
        .await?;

    match result {
        TryInsertResult::Inserted(inserted) => Ok(Some(inserted.last_insert_id)),
        TryInsertResult::Conflicted | TryInsertResult::Empty => Ok(None),
    }
}

/// Insert the metrics row for a newly inserted snapshot. Never called for
/// a duplicate; the row's existence is governed entirely by its parent.
async fn insert_market_metrics<C: ConnectionTrait>(
    conn: &C,
    snapshot_id: i64,
    record: &RawMarketRecord,
) -> Result<(), LoadError> {
    let roi = record.roi.as_ref();

    let metrics = market_metrics::ActiveModel {
        snapshot_id: Set(snapshot_id),
        market_cap: Set(record.market_cap),
        market_cap_rank: Set(record.market_cap_rank),
        fully_diluted_valuation: Set(record.fully_diluted_valuation),
        total_volume: Set(record.total_volume),
        market_cap_change_24h: Set(record.market_cap_change_24h),
        market_cap_change_pct_24h: Set(record.market_cap_change_percentage_24h),
        circulating_supply: Set(record.circulating_supply),
        total_supply: Set(record.total_supply),
        max_supply: Set(record.max_supply),
        roi_times: Set(roi.and_then(|r| r.times)),
        roi_currency: Set(roi.and_then(|r| r.currency.clone())),
        roi_percentage: Set(roi.and_then(|r| r.percentage)),
        ..Default::default()
    };
    metrics.insert(conn).await?;
    Ok(())
}

fn required_field(value: Option<&str>, field: &'static str) -> Result<String, LoadError> {
    value
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            LoadError::MalformedDocument(format!("record is missing required field '{}'", field))
        })
}

fn parse_timestamp_field(
    raw: &str,
    field: &'static str,
) -> Result<sea_orm::prelude::DateTimeWithTimeZone, LoadError> {
    parse_provider_timestamp(raw)
        .map(|dt| dt.fixed_offset())
        .map_err(|_| LoadError::InvalidTimestamp {
            field,
            value: raw.to_owned(),
        })
}

fn parse_optional_date(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Option<sea_orm::prelude::DateTimeWithTimeZone>, LoadError> {
    match raw {
        // Absent upstream dates stay null, no sentinel
        None => Ok(None),
        Some(s) => parse_timestamp_field(s, field).map(Some),
    }
}
