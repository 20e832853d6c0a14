//! Per-record data-quality gate
//!
//! A rejected record is counted and skipped by the coordinator; it never
//! aborts the batch. Rejection is a typed result here, not an error path
//! the coordinator has to catch.

use rust_decimal::Decimal;

use crate::models::market_data::RawMarketRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataQualityError {
    /// A required field is absent or empty
    MissingField(&'static str),
    /// A field that must be strictly positive is zero or negative
    NonPositive { field: &'static str, value: Decimal },
    /// A field that must be non-negative is negative
    Negative { field: &'static str, value: Decimal },
    /// market_cap_rank must be greater than zero when present
    InvalidRank(i32),
}

impl std::fmt::Display for DataQualityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataQualityError::MissingField(field) => {
                write!(f, "Missing required field '{}'", field)
            }
            DataQualityError::NonPositive { field, value } => {
                write!(f, "{} must be strictly positive (found {})", field, value)
            }
            DataQualityError::Negative { field, value } => {
                write!(f, "{} has invalid negative value {}", field, value)
            }
            DataQualityError::InvalidRank(rank) => {
                write!(f, "market_cap_rank must be greater than zero (found {})", rank)
            }
        }
    }
}

impl std::error::Error for DataQualityError {}

/// Validate one inbound record for data-quality compliance.
///
/// Rules: identity fields (id, symbol, name) must be present and
/// non-empty; current_price must be strictly positive; price extremes and
/// market figures may be absent but never negative; market_cap_rank, when
/// present, must be greater than zero.
pub fn validate_record(record: &RawMarketRecord) -> Result<(), DataQualityError> {
    require_non_empty("id", record.id.as_deref())?;
    require_non_empty("symbol", record.symbol.as_deref())?;
    require_non_empty("name", record.name.as_deref())?;

    match record.current_price {
        None => return Err(DataQualityError::MissingField("current_price")),
        Some(price) if price <= Decimal::ZERO => {
            return Err(DataQualityError::NonPositive {
                field: "current_price",
                value: price,
            })
        }
        Some(_) => {}
    }

    let non_negative_fields = [
        ("high_24h", record.high_24h),
        ("low_24h", record.low_24h),
        ("ath", record.ath),
        ("atl", record.atl),
        ("market_cap", record.market_cap),
        ("fully_diluted_valuation", record.fully_diluted_valuation),
        ("total_volume", record.total_volume),
        ("circulating_supply", record.circulating_supply),
        ("total_supply", record.total_supply),
        ("max_supply", record.max_supply),
    ];
    for (field, value) in non_negative_fields {
        require_non_negative(field, value)?;
    }

    if let Some(rank) = record.market_cap_rank {
        if rank <= 0 {
            return Err(DataQualityError::InvalidRank(rank));
        }
    }

    Ok(())
}

fn require_non_empty(field: &'static str, value: Option<&str>) -> Result<(), DataQualityError> {
    match value {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(DataQualityError::MissingField(field)),
    }
}

fn require_non_negative(
    field: &'static str,
    value: Option<Decimal>,
) -> Result<(), DataQualityError> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(DataQualityError::Negative { field, value: v }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn valid_record() -> RawMarketRecord {
        RawMarketRecord {
            id: Some("bitcoin".to_string()),
            symbol: Some("btc".to_string()),
            name: Some("Bitcoin".to_string()),
            current_price: Some(dec!(43250.5)),
            high_24h: Some(dec!(44000)),
            low_24h: Some(dec!(42800)),
            ath: Some(dec!(69000)),
            atl: Some(dec!(67.81)),
            market_cap: Some(dec!(845000000000)),
            market_cap_rank: Some(1),
            total_volume: Some(dec!(23400000000)),
            circulating_supply: Some(dec!(19600000)),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_record_passes() {
        assert_eq!(validate_record(&valid_record()), Ok(()));
    }

    #[test]
    fn test_missing_name_rejected() {
        let mut record = valid_record();
        record.name = None;
        assert_eq!(
            validate_record(&record),
            Err(DataQualityError::MissingField("name"))
        );

        record.name = Some(String::new());
        assert_eq!(
            validate_record(&record),
            Err(DataQualityError::MissingField("name"))
        );
    }

    #[test]
    fn test_zero_price_rejected() {
        let mut record = valid_record();
        record.current_price = Some(Decimal::ZERO);
        assert!(matches!(
            validate_record(&record),
            Err(DataQualityError::NonPositive { field: "current_price", .. })
        ));
    }

    #[test]
    fn test_missing_price_rejected() {
        let mut record = valid_record();
        record.current_price = None;
        assert_eq!(
            validate_record(&record),
            Err(DataQualityError::MissingField("current_price"))
        );
    }

    #[test]
    fn test_zero_rank_rejected() {
        let mut record = valid_record();
        record.market_cap_rank = Some(0);
        assert_eq!(validate_record(&record), Err(DataQualityError::InvalidRank(0)));
    }

    #[test]
    fn test_absent_rank_permitted() {
        let mut record = valid_record();
        record.market_cap_rank = None;
        assert_eq!(validate_record(&record), Ok(()));
    }

    #[test]
    fn test_negative_supply_rejected() {
        let mut record = valid_record();
        record.max_supply = Some(dec!(-1));
        assert!(matches!(
            validate_record(&record),
            Err(DataQualityError::Negative { field: "max_supply", .. })
        ));
    }

    #[test]
    fn test_zero_and_absent_extremes_permitted() {
        let mut record = valid_record();
        record.low_24h = Some(Decimal::ZERO);
        record.ath = None;
        record.atl = None;
        assert_eq!(validate_record(&record), Ok(()));
    }

    #[test]
    fn test_negative_low_rejected() {
        let mut record = valid_record();
        record.low_24h = Some(dec!(-0.01));
        assert!(matches!(
            validate_record(&record),
            Err(DataQualityError::Negative { field: "low_24h", .. })
        ));
    }
}
