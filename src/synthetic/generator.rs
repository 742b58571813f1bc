use crate::error::{Error, Result};
use crate::models::{is_weekend, round_price, session_open, Bar, Series, SymbolParams};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Default lower bound applied to generated prices
pub const DEFAULT_PRICE_FLOOR: f64 = 0.01;

/// Intraday excursions are drawn at half the daily volatility
const INTRADAY_VOL_RATIO: f64 = 0.5;

const MIN_BASE_VOLUME: u64 = 1_000_000;
const MAX_BASE_VOLUME: u64 = 5_000_000;

/// Volume grows by this factor per unit of absolute daily return
const VOLUME_RETURN_SENSITIVITY: f64 = 10.0;

/// Generates daily OHLCV series from a seeded random stream
///
/// The stream is owned by the generator and advanced in a fixed order per
/// bar (daily return, high move, low move, base volume), so the same seed
/// and the same sequence of calls always reproduce the same bars.
pub struct SeriesGenerator {
    rng: StdRng,
    price_floor: f64,
}

impl SeriesGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            price_floor: DEFAULT_PRICE_FLOOR,
        }
    }

    pub fn with_price_floor(mut self, price_floor: f64) -> Self {
        self.price_floor = price_floor;
        self
    }

    pub fn price_floor(&self) -> f64 {
        self.price_floor
    }

    /// Generate one bar per weekday in `[start, end]`
    ///
    /// # Arguments
    /// * `params` - Symbol, starting price, daily volatility and drift
    /// * `start` - First calendar day (inclusive)
    /// * `end` - Last calendar day (inclusive)
    ///
    /// # Returns
    /// The series in date order; empty when `start > end` or the range only
    /// covers a weekend
    pub fn generate(
        &mut self,
        params: &SymbolParams,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series> {
        self.validate(params)?;

        let mut series = Series::new(params.symbol.clone());
        let mut price = params.initial_price;

        for date in start.iter_days().take_while(|d| *d <= end) {
            if is_weekend(date) {
                continue;
            }

            let (bar, close) = self.next_bar(params, date, price);
            series.bars.push(bar);

            // Unrounded close carries into tomorrow's open
            price = close;
        }

        tracing::debug!(
            "Generated {} bars for {} ({} -> {})",
            series.len(),
            params.symbol,
            start,
            end
        );

        Ok(series)
    }

    /// Build a single bar opening at `price`, returning it with the
    /// full-precision close
    fn next_bar(&mut self, params: &SymbolParams, date: NaiveDate, price: f64) -> (Bar, f64) {
        let daily_return = params.drift + params.volatility * self.standard_normal();

        let open = price;
        let mut close = open * (1.0 + daily_return);
        if close < self.price_floor {
            tracing::warn!(
                "{} close {:.4} on {} fell below floor, clamping to {}",
                params.symbol,
                close,
                date,
                self.price_floor
            );
            close = self.price_floor;
        }

        let intraday_vol = params.volatility * INTRADAY_VOL_RATIO;
        let high_move = self.half_normal(intraday_vol);
        let low_move = self.half_normal(intraday_vol);

        let high = (open.max(close) * (1.0 + high_move)).max(open).max(close);
        let low = (open.min(close) * (1.0 - low_move))
            .max(self.price_floor)
            .min(open)
            .min(close);

        let base_volume = self.rng.gen_range(MIN_BASE_VOLUME..=MAX_BASE_VOLUME);
        let volume = scale_volume(base_volume, daily_return);

        let bar = Bar {
            timestamp: date.and_time(session_open()),
            open: round_price(open),
            high: round_price(high),
            low: round_price(low),
            close: round_price(close),
            volume,
        };

        (bar, close)
    }

    fn standard_normal(&mut self) -> f64 {
        self.rng.sample(StandardNormal)
    }

    /// Absolute value of a zero-mean normal draw with the given scale
    fn half_normal(&mut self, scale: f64) -> f64 {
        (self.standard_normal() * scale).abs()
    }

    fn validate(&self, params: &SymbolParams) -> Result<()> {
        let invalid = |reason: String| Error::InvalidParameters {
            symbol: params.symbol.clone(),
            reason,
        };

        // Prices are written in cents, so the floor must survive rounding
        if !(round_price(self.price_floor) > 0.0 && self.price_floor.is_finite()) {
            return Err(invalid(format!(
                "price floor must be at least half a cent: {}",
                self.price_floor
            )));
        }
        if !(params.initial_price > 0.0 && params.initial_price.is_finite()) {
            return Err(invalid(format!(
                "initial price must be positive: {}",
                params.initial_price
            )));
        }
        if !(params.volatility >= 0.0 && params.volatility.is_finite()) {
            return Err(invalid(format!(
                "volatility must be non-negative: {}",
                params.volatility
            )));
        }
        if !params.drift.is_finite() {
            return Err(invalid(format!("drift must be finite: {}", params.drift)));
        }
        Ok(())
    }
}

/// Busier days trade more: scale the base volume by the size of the move
pub fn scale_volume(base_volume: u64, daily_return: f64) -> u64 {
    let multiplier = 1.0 + daily_return.abs() * VOLUME_RETURN_SENSITIVITY;
    (base_volume as f64 * multiplier).round() as u64
}

/// Seed offset for the combined file, stable across runs and never zero
pub fn symbol_seed_offset(symbol: &str) -> u64 {
    // FNV-1a
    let hash = symbol.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| {
        (acc ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
    });
    1 + hash % 1000
}
