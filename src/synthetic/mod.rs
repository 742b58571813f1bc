pub mod generator;
pub mod runner;

pub use generator::{scale_volume, symbol_seed_offset, SeriesGenerator, DEFAULT_PRICE_FLOOR};
pub use runner::{FixtureRunner, RunSummary};
