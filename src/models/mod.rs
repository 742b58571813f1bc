use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Timestamp layout used in every CSV file
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Every daily bar is stamped at the market open, 09:30:00
pub fn session_open() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 30, 0).expect("09:30:00 is a valid time")
}

/// One synthetic trading day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Calendar day of the bar
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Ordered daily bars for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub symbol: String,
    pub bars: Vec<Bar>,
}

impl Series {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            bars: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }
}

/// Bar tagged with its symbol, the row type of the combined file
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolBar {
    pub symbol: String,
    pub bar: Bar,
}

/// Fixed generation inputs for one symbol
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolParams {
    pub symbol: String,
    pub initial_price: f64,
    /// Standard deviation of the daily return
    pub volatility: f64,
    /// Mean daily return
    pub drift: f64,
}

impl SymbolParams {
    pub fn new(symbol: &str, initial_price: f64, volatility: f64, drift: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            initial_price,
            volatility,
            drift,
        }
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Round to cents
pub fn round_price(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekend_detection() {
        // 2023-01-06 is a Friday
        let friday = NaiveDate::from_ymd_opt(2023, 1, 6).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2023, 1, 7).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2023, 1, 8).unwrap();
        let monday = NaiveDate::from_ymd_opt(2023, 1, 9).unwrap();

        assert!(!is_weekend(friday));
        assert!(is_weekend(saturday));
        assert!(is_weekend(sunday));
        assert!(!is_weekend(monday));
    }

    #[test]
    fn test_round_price() {
        assert_eq!(round_price(100.0), 100.0);
        assert_eq!(round_price(101.236), 101.24);
        assert_eq!(round_price(99.994), 99.99);
    }

    #[test]
    fn test_timestamp_format() {
        let bar = Bar {
            timestamp: NaiveDate::from_ymd_opt(2023, 1, 2)
                .unwrap()
                .and_time(session_open()),
            open: 100.0,
            high: 101.0,
            low: 99.0,
            close: 100.5,
            volume: 1_000_000,
        };

        assert_eq!(bar.formatted_timestamp(), "2023-01-02T09:30:00");
        assert_eq!(bar.date(), NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
    }
}
