//! CSV tick file source.

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::ReaderBuilder;
use odte_core::error::DataError;
use odte_core::types::{NormalizedTick, OptionQuote};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

/// CSV record format. Option columns are empty when no contract was
/// quotable that period.
#[derive(Debug, Deserialize)]
struct TickRecord {
    #[serde(alias = "Timestamp", alias = "time")]
    timestamp: String,
    #[serde(alias = "Symbol")]
    symbol: String,
    #[serde(alias = "Price", alias = "close")]
    price: Decimal,
    #[serde(alias = "vwap")]
    session_vwap: Decimal,
    ma9: Decimal,
    #[serde(default)]
    option_symbol: Option<String>,
    #[serde(default)]
    strike: Option<Decimal>,
    #[serde(default)]
    bid: Option<Decimal>,
    #[serde(default)]
    ask: Option<Decimal>,
    #[serde(default)]
    last: Option<Decimal>,
    #[serde(default)]
    expiry: Option<String>,
}

/// CSV-backed source of normalized ticks.
pub struct TickFileSource {
    path: String,
}

impl TickFileSource {
    /// Create a source over an existing tick file.
    pub fn new(path: &str) -> Result<Self, DataError> {
        if !Path::new(path).exists() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(Self {
            path: path.to_string(),
        })
    }

    /// Load every tick, sorted by timestamp.
    pub fn load_all(&self) -> Result<Vec<NormalizedTick>, DataError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| DataError::Parse(e.to_string()))?;

        let mut ticks = Vec::new();
        for result in reader.deserialize() {
            let record: TickRecord = result.map_err(|e| DataError::Parse(e.to_string()))?;
            ticks.push(Self::to_tick(record)?);
        }
        ticks.sort_by_key(|t| t.at);
        Ok(ticks)
    }

    fn to_tick(record: TickRecord) -> Result<NormalizedTick, DataError> {
        let at = Self::parse_timestamp(&record.timestamp)?;
        let option = match (record.option_symbol, record.strike, record.bid, record.ask) {
            (Some(option_symbol), Some(strike), Some(bid), Some(ask))
                if !option_symbol.is_empty() =>
            {
                let expiry = match record.expiry {
                    Some(raw) if !raw.is_empty() => Self::parse_timestamp(&raw)?,
                    _ => at,
                };
                Some(OptionQuote {
                    option_symbol,
                    strike,
                    bid,
                    ask,
                    last: record.last.unwrap_or((bid + ask) / Decimal::TWO),
                    expiry,
                    at,
                })
            }
            _ => None,
        };
        Ok(NormalizedTick {
            at,
            symbol: record.symbol,
            price: record.price,
            session_vwap: record.session_vwap,
            ma9: record.ma9,
            option,
        })
    }

    /// Parse RFC 3339 or a naive `YYYY-MM-DD HH:MM:SS` treated as UTC.
    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, DataError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
            return Ok(dt.and_utc());
        }
        Err(DataError::Parse(format!("unrecognized timestamp: {raw}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn write_fixture(contents: &str) -> temppath::TempPath {
        temppath::write(contents)
    }

    // Minimal scratch-file helper; std-only.
    mod temppath {
        use std::path::PathBuf;

        pub struct TempPath(pub PathBuf);

        impl Drop for TempPath {
            fn drop(&mut self) {
                let _ = std::fs::remove_file(&self.0);
            }
        }

        pub fn write(contents: &str) -> TempPath {
            let mut path = std::env::temp_dir();
            path.push(format!(
                "odte-ticks-{}-{}.csv",
                std::process::id(),
                contents.len()
            ));
            std::fs::write(&path, contents).unwrap();
            TempPath(path)
        }
    }

    #[test]
    fn test_load_ticks_with_and_without_options() {
        let csv = "\
timestamp,symbol,price,session_vwap,ma9,option_symbol,strike,bid,ask,last,expiry
2025-06-16 15:00:00,QQQ,480.10,409.00,410.00,QQQ250616C00480000,480,1.90,2.10,2.00,2025-06-16 20:00:00
2025-06-16 15:00:10,QQQ,480.20,410.00,409.00,,,,,,
";
        let fixture = write_fixture(csv);
        let ticks = TickFileSource::new(fixture.0.to_str().unwrap())
            .unwrap()
            .load_all()
            .unwrap();

        assert_eq!(ticks.len(), 2);
        let first = &ticks[0];
        assert_eq!(first.session_vwap, dec!(409.00));
        let quote = first.option.as_ref().unwrap();
        assert_eq!(quote.bid, dec!(1.90));
        assert!(ticks[1].option.is_none());
    }

    #[test]
    fn test_rows_are_sorted_by_timestamp() {
        let csv = "\
timestamp,symbol,price,session_vwap,ma9,option_symbol,strike,bid,ask,last,expiry
2025-06-16 15:00:10,QQQ,480.20,410.00,409.00,,,,,,
2025-06-16 15:00:00,QQQ,480.10,409.00,410.00,,,,,,
";
        let fixture = write_fixture(csv);
        let ticks = TickFileSource::new(fixture.0.to_str().unwrap())
            .unwrap()
            .load_all()
            .unwrap();
        assert!(ticks[0].at < ticks[1].at);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            TickFileSource::new("/nonexistent/ticks.csv"),
            Err(DataError::NoDataAvailable)
        ));
    }
}
