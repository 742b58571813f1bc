use crate::error::{Error, Result};
use crate::models::{is_weekend, Bar, Series, SymbolBar};
use std::collections::BTreeMap;

/// Two prices within half a cent are treated as equal
const PRICE_TOLERANCE: f64 = 0.005;

/// Validates generated bars for sanity and correctness
pub struct BarValidator;

impl BarValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a single bar
    pub fn validate(&self, symbol: &str, bar: &Bar) -> Result<()> {
        self.validate_prices(symbol, bar)?;
        self.validate_trading_day(symbol, bar)?;
        self.validate_ohlc_relationship(symbol, bar)?;
        Ok(())
    }

    /// Validate every bar plus ordering and open/close chaining
    pub fn validate_series(&self, series: &Series) -> Result<()> {
        for bar in &series.bars {
            self.validate(&series.symbol, bar)?;
        }

        self.validate_chain(&series.symbol, &series.bars)
    }

    /// Bars must be strictly increasing in time and each open must match the
    /// previous close
    fn validate_chain(&self, symbol: &str, bars: &[Bar]) -> Result<()> {
        for pair in bars.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.timestamp <= prev.timestamp {
                return Err(invalid(
                    symbol,
                    next,
                    format!("not after previous bar ({})", prev.formatted_timestamp()),
                ));
            }
            if (next.open - prev.close).abs() > PRICE_TOLERANCE {
                return Err(invalid(
                    symbol,
                    next,
                    format!("open ({}) does not match previous close ({})", next.open, prev.close),
                ));
            }
        }

        Ok(())
    }

    /// Validate combined rows: every bar, `(timestamp, symbol)` ordering and
    /// chaining within each symbol
    pub fn validate_combined(&self, rows: &[SymbolBar]) -> Result<()> {
        for row in rows {
            self.validate(&row.symbol, &row.bar)?;
        }

        for pair in rows.windows(2) {
            let prev = (&pair[0].bar.timestamp, &pair[0].symbol);
            let next = (&pair[1].bar.timestamp, &pair[1].symbol);
            if next < prev {
                return Err(invalid(
                    &pair[1].symbol,
                    &pair[1].bar,
                    format!(
                        "out of order after {} {}",
                        pair[0].bar.formatted_timestamp(),
                        pair[0].symbol
                    ),
                ));
            }
        }

        let mut by_symbol: BTreeMap<&str, Vec<Bar>> = BTreeMap::new();
        for row in rows {
            by_symbol.entry(row.symbol.as_str()).or_default().push(row.bar);
        }
        for (symbol, bars) in &by_symbol {
            self.validate_chain(symbol, bars)?;
        }

        Ok(())
    }

    /// Validate that all prices and the volume are positive
    fn validate_prices(&self, symbol: &str, bar: &Bar) -> Result<()> {
        if bar.open <= 0.0 {
            return Err(invalid(symbol, bar, format!("Invalid open price: {}", bar.open)));
        }
        if bar.high <= 0.0 {
            return Err(invalid(symbol, bar, format!("Invalid high price: {}", bar.high)));
        }
        if bar.low <= 0.0 {
            return Err(invalid(symbol, bar, format!("Invalid low price: {}", bar.low)));
        }
        if bar.close <= 0.0 {
            return Err(invalid(symbol, bar, format!("Invalid close price: {}", bar.close)));
        }
        if bar.volume == 0 {
            return Err(invalid(symbol, bar, "Invalid volume: 0".to_string()));
        }
        Ok(())
    }

    fn validate_trading_day(&self, symbol: &str, bar: &Bar) -> Result<()> {
        if is_weekend(bar.date()) {
            return Err(invalid(symbol, bar, "falls on a weekend".to_string()));
        }
        Ok(())
    }

    /// Validate OHLC relationships (high >= low, etc.)
    fn validate_ohlc_relationship(&self, symbol: &str, bar: &Bar) -> Result<()> {
        if bar.high < bar.low {
            return Err(invalid(
                symbol,
                bar,
                format!("High ({}) is less than low ({})", bar.high, bar.low),
            ));
        }

        if bar.high < bar.open {
            return Err(invalid(
                symbol,
                bar,
                format!("High ({}) is less than open ({})", bar.high, bar.open),
            ));
        }
        if bar.high < bar.close {
            return Err(invalid(
                symbol,
                bar,
                format!("High ({}) is less than close ({})", bar.high, bar.close),
            ));
        }

        if bar.low > bar.open {
            return Err(invalid(
                symbol,
                bar,
                format!("Low ({}) is greater than open ({})", bar.low, bar.open),
            ));
        }
        if bar.low > bar.close {
            return Err(invalid(
                symbol,
                bar,
                format!("Low ({}) is greater than close ({})", bar.low, bar.close),
            ));
        }

        Ok(())
    }
}

impl Default for BarValidator {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid(symbol: &str, bar: &Bar, reason: String) -> Error {
    Error::InvalidBar {
        symbol: symbol.to_string(),
        timestamp: bar.formatted_timestamp(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::session_open;
    use chrono::NaiveDate;

    fn make_valid_bar() -> Bar {
        Bar {
            // Monday
            timestamp: NaiveDate::from_ymd_opt(2023, 1, 2)
                .unwrap()
                .and_time(session_open()),
            open: 100.0,
            high: 102.0,
            low: 99.0,
            close: 101.0,
            volume: 1_000_000,
        }
    }

    fn next_day(bar: &Bar) -> Bar {
        Bar {
            timestamp: bar.timestamp + chrono::Duration::days(1),
            open: bar.close,
            ..*bar
        }
    }

    #[test]
    fn test_validate_valid_bar() {
        let validator = BarValidator::new();
        assert!(validator.validate("TEST", &make_valid_bar()).is_ok());
    }

    #[test]
    fn test_validate_negative_open() {
        let validator = BarValidator::new();
        let mut bar = make_valid_bar();
        bar.open = -100.0;

        let result = validator.validate("TEST", &bar);
        assert!(result.unwrap_err().to_string().contains("Invalid open price"));
    }

    #[test]
    fn test_validate_zero_volume() {
        let validator = BarValidator::new();
        let mut bar = make_valid_bar();
        bar.volume = 0;

        assert!(validator.validate("TEST", &bar).is_err());
    }

    #[test]
    fn test_validate_high_below_close() {
        let validator = BarValidator::new();
        let mut bar = make_valid_bar();
        bar.high = 100.5;

        let result = validator.validate("TEST", &bar);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("High (100.5) is less than close (101)"));
    }

    #[test]
    fn test_validate_low_above_open() {
        let validator = BarValidator::new();
        let mut bar = make_valid_bar();
        bar.low = 100.5;

        let result = validator.validate("TEST", &bar);
        assert!(result.unwrap_err().to_string().contains("Low (100.5) is greater than open"));
    }

    #[test]
    fn test_validate_weekend_bar() {
        let validator = BarValidator::new();
        let mut bar = make_valid_bar();
        bar.timestamp = NaiveDate::from_ymd_opt(2023, 1, 7)
            .unwrap()
            .and_time(session_open());

        let result = validator.validate("TEST", &bar);
        assert!(result.unwrap_err().to_string().contains("weekend"));
    }

    #[test]
    fn test_validate_series_chaining() {
        let validator = BarValidator::new();
        let first = make_valid_bar();
        let second = next_day(&first);

        let mut series = Series {
            symbol: "TEST".to_string(),
            bars: vec![first, second],
        };
        assert!(validator.validate_series(&series).is_ok());

        series.bars[1].open = 98.0;
        series.bars[1].low = 97.0;
        let result = validator.validate_series(&series);
        assert!(result.unwrap_err().to_string().contains("does not match previous close"));
    }

    #[test]
    fn test_validate_series_ordering() {
        let validator = BarValidator::new();
        let first = make_valid_bar();
        let mut second = next_day(&first);
        second.timestamp = first.timestamp;

        let series = Series {
            symbol: "TEST".to_string(),
            bars: vec![first, second],
        };
        assert!(validator.validate_series(&series).is_err());
    }

    #[test]
    fn test_validate_combined_ordering() {
        let validator = BarValidator::new();
        let bar = make_valid_bar();
        let row = |symbol: &str| SymbolBar {
            symbol: symbol.to_string(),
            bar,
        };

        assert!(validator.validate_combined(&[row("AAPL"), row("MSFT")]).is_ok());

        let result = validator.validate_combined(&[row("MSFT"), row("AAPL")]);
        assert!(result.unwrap_err().to_string().contains("out of order"));
    }

    #[test]
    fn test_validate_combined_chaining_per_symbol() {
        let validator = BarValidator::new();
        let first = make_valid_bar();
        let second = next_day(&first);
        let row = |symbol: &str, bar: Bar| SymbolBar {
            symbol: symbol.to_string(),
            bar,
        };

        // Interleaved symbols each chain correctly
        let rows = vec![
            row("AAPL", first),
            row("MSFT", first),
            row("AAPL", second),
            row("MSFT", second),
        ];
        assert!(validator.validate_combined(&rows).is_ok());

        let mut broken = second;
        broken.open = 98.0;
        broken.low = 97.0;
        let rows = vec![
            row("AAPL", first),
            row("MSFT", first),
            row("AAPL", second),
            row("MSFT", broken),
        ];
        let err = validator.validate_combined(&rows).unwrap_err().to_string();
        assert!(err.contains("MSFT"), "unexpected error: {}", err);
        assert!(err.contains("does not match previous close"));
    }
}
