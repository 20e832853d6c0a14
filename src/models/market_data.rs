//! Input models for staged market data documents
//!
//! A document is the payload the upstream fetcher stages in the landing
//! zone: an ingestion timestamp, a source label and the provider's raw
//! market records. Everything below identity level is optional at parse
//! time; the validator decides what is acceptable per record so a single
//! bad record never sinks document parsing.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// One staged input document, one ingestion batch.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBatchDocument {
    #[serde(deserialize_with = "deserialize_provider_timestamp")]
    pub ingested_at: DateTime<Utc>,
    pub source: String,
    pub records: Vec<RawMarketRecord>,
}

/// One raw asset record as reported by the provider's markets endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMarketRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub current_price: Option<Decimal>,
    #[serde(default)]
    pub high_24h: Option<Decimal>,
    #[serde(default)]
    pub low_24h: Option<Decimal>,
    #[serde(default)]
    pub price_change_24h: Option<Decimal>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<Decimal>,
    #[serde(default)]
    pub ath: Option<Decimal>,
    #[serde(default)]
    pub ath_change_percentage: Option<Decimal>,
    #[serde(default)]
    pub ath_date: Option<String>,
    #[serde(default)]
    pub atl: Option<Decimal>,
    #[serde(default)]
    pub atl_change_percentage: Option<Decimal>,
    #[serde(default)]
    pub atl_date: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub market_cap: Option<Decimal>,
    #[serde(default)]
    pub market_cap_rank: Option<i32>,
    #[serde(default)]
    pub fully_diluted_valuation: Option<Decimal>,
    #[serde(default)]
    pub total_volume: Option<Decimal>,
    #[serde(default)]
    pub market_cap_change_24h: Option<Decimal>,
    #[serde(default)]
    pub market_cap_change_percentage_24h: Option<Decimal>,
    #[serde(default)]
    pub circulating_supply: Option<Decimal>,
    #[serde(default)]
    pub total_supply: Option<Decimal>,
    #[serde(default)]
    pub max_supply: Option<Decimal>,
    #[serde(default)]
    pub roi: Option<RawRoi>,
}

/// Optional nested return-on-investment structure; the provider reports
/// the triple together or not at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRoi {
    #[serde(default)]
    pub times: Option<Decimal>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub percentage: Option<Decimal>,
}

/// Parse a provider timestamp: RFC 3339 first ("Z" or explicit offset),
/// falling back to a naive ISO 8601 string interpreted as UTC, which is
/// what the fetcher historically wrote.
pub fn parse_provider_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(err) => raw
            .parse::<NaiveDateTime>()
            .map(|naive| naive.and_utc())
            .map_err(|_| err),
    }
}

fn deserialize_provider_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_provider_timestamp(&raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_rfc3339_timestamps() {
        let z = parse_provider_timestamp("2024-01-15T10:02:30Z").unwrap();
        let offset = parse_provider_timestamp("2024-01-15T10:02:30+00:00").unwrap();
        assert_eq!(z, offset);
    }

    #[test]
    fn test_parse_naive_timestamp_as_utc() {
        let naive = parse_provider_timestamp("2024-01-15T10:02:30.123456").unwrap();
        assert_eq!(naive.timestamp(), 1705312950);
    }

    #[test]
    fn test_parse_garbage_timestamp_fails() {
        assert!(parse_provider_timestamp("not-a-date").is_err());
    }

    #[test]
    fn test_document_with_roi() {
        let doc: RawBatchDocument = serde_json::from_value(serde_json::json!({
            "ingested_at": "2024-01-15T10:02:30Z",
            "source": "CoinGecko",
            "records": [{
                "id": "ethereum",
                "symbol": "eth",
                "name": "Ethereum",
                "current_price": 2500.12,
                "roi": { "times": 55.7, "currency": "btc", "percentage": 5570.3 }
            }]
        }))
        .unwrap();

        assert_eq!(doc.source, "CoinGecko");
        let record = &doc.records[0];
        assert_eq!(record.current_price, Some(dec!(2500.12)));
        let roi = record.roi.as_ref().unwrap();
        assert_eq!(roi.times, Some(dec!(55.7)));
        assert_eq!(roi.currency.as_deref(), Some("btc"));
    }

    #[test]
    fn test_document_without_roi() {
        let doc: RawBatchDocument = serde_json::from_value(serde_json::json!({
            "ingested_at": "2024-01-15T10:02:30Z",
            "source": "CoinGecko",
            "records": [{ "id": "bitcoin", "symbol": "btc", "name": "Bitcoin", "roi": null }]
        }))
        .unwrap();

        assert!(doc.records[0].roi.is_none());
    }

    #[test]
    fn test_document_missing_top_level_field_fails() {
        let result: Result<RawBatchDocument, _> = serde_json::from_value(serde_json::json!({
            "ingested_at": "2024-01-15T10:02:30Z",
            "records": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_record_with_null_fields_parses() {
        let doc: RawBatchDocument = serde_json::from_value(serde_json::json!({
            "ingested_at": "2024-01-15T10:02:30Z",
            "source": "CoinGecko",
            "records": [{
                "id": "bitcoin",
                "symbol": "btc",
                "name": "Bitcoin",
                "current_price": 43250.0,
                "max_supply": null,
                "fully_diluted_valuation": null
            }]
        }))
        .unwrap();

        let record = &doc.records[0];
        assert!(record.max_supply.is_none());
        assert!(record.fully_diluted_valuation.is_none());
    }
}
