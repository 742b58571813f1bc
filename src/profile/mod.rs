use crate::error::Result;
use crate::models::SymbolParams;
use crate::synthetic::DEFAULT_PRICE_FLOOR;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Prefix for environment overrides, e.g. `MOCKBARS_SEED=7`
pub const ENV_PREFIX: &str = "MOCKBARS";

/// Everything one generation run needs
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunProfile {
    pub output_dir: PathBuf,
    pub seed: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub price_floor: f64,
    pub symbols: Vec<SymbolParams>,
}

impl Default for RunProfile {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("data"),
            seed: 42,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2023, 12, 31).unwrap_or_default(),
            price_floor: DEFAULT_PRICE_FLOOR,
            symbols: default_symbols(),
        }
    }
}

impl RunProfile {
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// `<output_dir>/<symbol_lowercase>_daily.csv`
    pub fn symbol_path(&self, symbol: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_daily.csv", symbol.to_lowercase()))
    }

    pub fn combined_path(&self) -> PathBuf {
        self.output_dir.join("multi_symbol_daily.csv")
    }
}

/// Reference symbol table: moderate, high and low volatility names
pub fn default_symbols() -> Vec<SymbolParams> {
    vec![
        SymbolParams::new("AAPL", 150.0, 0.02, 0.0003),
        SymbolParams::new("GOOGL", 100.0, 0.025, 0.0002),
        SymbolParams::new("MSFT", 250.0, 0.018, 0.0004),
        SymbolParams::new("SPY", 400.0, 0.012, 0.0002),
        SymbolParams::new("QQQ", 300.0, 0.015, 0.0003),
        SymbolParams::new("TSLA", 200.0, 0.04, 0.0001),
    ]
}

/// Load the run profile: an optional TOML file, then `MOCKBARS_*`
/// environment overrides
///
/// Keys set by neither source fall back to the reference profile.
pub fn load_profile(path: Option<&Path>) -> Result<RunProfile> {
    load_with_prefix(path, ENV_PREFIX)
}

fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<RunProfile> {
    let mut builder = config::Config::builder();
    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    Ok(settings.try_deserialize()?)
}
