//! Deterministic time bucketing for snapshot deduplication
//!
//! A timestamp maps to the nearest fixed-width interval boundary, with a
//! tie at the exact midpoint going to the lower boundary. The coordinator
//! computes the bucket once per batch from the batch's own ingestion
//! timestamp, so every record in one document shares a single bucket.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Default snapshot interval width in minutes
pub const DEFAULT_SNAPSHOT_INTERVAL_MINUTES: i64 = 5;

/// Round a timestamp to the nearest snapshot interval boundary.
///
/// Pure and deterministic; identical inputs always yield identical
/// buckets, and any timestamp within `(bucket - width/2, bucket + width/2]`
/// maps to that bucket. Sub-second precision is dropped before rounding.
pub fn round_to_snapshot_interval(timestamp: DateTime<Utc>, interval_minutes: i64) -> NaiveDateTime {
    let width_secs = interval_minutes.max(1) * 60;
    let secs = timestamp.timestamp();
    let remainder = secs.rem_euclid(width_secs);
    let mut bucket = secs - remainder;
    // Past the midpoint rounds up; the midpoint itself stays down
    if remainder * 2 > width_secs {
        bucket += width_secs;
    }
    DateTime::<Utc>::from_timestamp(bucket, 0)
        .expect("rounded timestamp stays in range")
        .naive_utc()
}
