use crate::error::Result;
use crate::profile::RunProfile;
use crate::models::{Series, SymbolBar};
use crate::output;
use crate::synthetic::generator::{symbol_seed_offset, SeriesGenerator};
use crate::validation::BarValidator;
use std::path::PathBuf;

/// Files produced (or checked) by one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub files: Vec<(PathBuf, usize)>,
    pub combined_rows: usize,
}

impl RunSummary {
    pub fn total_bars(&self) -> usize {
        self.files.iter().map(|(_, bars)| bars).sum()
    }
}

/// Drives generation for every symbol of a profile and writes the fixtures
pub struct FixtureRunner {
    profile: RunProfile,
    validator: BarValidator,
}

impl FixtureRunner {
    pub fn new(profile: RunProfile) -> Self {
        Self {
            profile,
            validator: BarValidator::new(),
        }
    }

    pub fn profile(&self) -> &RunProfile {
        &self.profile
    }

    /// One series per symbol, drawn from a single stream seeded with the
    /// profile seed and consumed in profile order
    pub fn generate_per_symbol(&self) -> Result<Vec<Series>> {
        let mut generator =
            SeriesGenerator::new(self.profile.seed).with_price_floor(self.profile.price_floor);

        self.profile
            .symbols
            .iter()
            .map(|params| {
                generator.generate(params, self.profile.start_date, self.profile.end_date)
            })
            .collect()
    }

    /// Independent re-run per symbol with a symbol-derived seed, merged and
    /// sorted by `(timestamp, symbol)`
    pub fn generate_combined(&self) -> Result<Vec<SymbolBar>> {
        let mut all_series = Vec::with_capacity(self.profile.symbols.len());

        for params in &self.profile.symbols {
            let seed = self
                .profile
                .seed
                .wrapping_add(symbol_seed_offset(&params.symbol));
            let mut generator =
                SeriesGenerator::new(seed).with_price_floor(self.profile.price_floor);
            all_series.push(generator.generate(
                params,
                self.profile.start_date,
                self.profile.end_date,
            )?);
        }

        Ok(output::merge_sorted(&all_series))
    }

    /// Generate, validate and write every fixture file
    pub fn run(&self) -> Result<RunSummary> {
        std::fs::create_dir_all(&self.profile.output_dir)?;

        let mut files = Vec::with_capacity(self.profile.symbols.len());
        for series in self.generate_per_symbol()? {
            self.validator.validate_series(&series)?;

            let path = self.profile.symbol_path(&series.symbol);
            output::write_series(&path, &series)?;
            tracing::info!(
                "Generated {} bars for {} -> {}",
                series.len(),
                series.symbol,
                path.display()
            );
            files.push((path, series.len()));
        }

        tracing::info!("Generating combined multi-symbol file...");
        let rows = self.generate_combined()?;
        self.validator.validate_combined(&rows)?;

        let combined_path = self.profile.combined_path();
        output::write_combined(&combined_path, &rows)?;
        tracing::info!(
            "Generated combined file with {} total bars -> {}",
            rows.len(),
            combined_path.display()
        );

        Ok(RunSummary {
            files,
            combined_rows: rows.len(),
        })
    }

    /// Re-read the files this profile writes and validate every bar
    pub fn verify(&self) -> Result<RunSummary> {
        let mut files = Vec::with_capacity(self.profile.symbols.len());

        for params in &self.profile.symbols {
            let path = self.profile.symbol_path(&params.symbol);
            let series = output::load_series(&path, &params.symbol)?;
            self.validator.validate_series(&series)?;
            tracing::info!("Verified {} bars in {}", series.len(), path.display());
            files.push((path, series.len()));
        }

        let combined_path = self.profile.combined_path();
        let rows = output::load_combined(&combined_path)?;
        self.validator.validate_combined(&rows)?;
        tracing::info!("Verified {} rows in {}", rows.len(), combined_path.display());

        Ok(RunSummary {
            files,
            combined_rows: rows.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SymbolParams;
    use chrono::NaiveDate;

    fn short_profile() -> RunProfile {
        RunProfile {
            start_date: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 31).unwrap(),
            symbols: vec![
                SymbolParams::new("MSFT", 250.0, 0.018, 0.0004),
                SymbolParams::new("AAPL", 150.0, 0.02, 0.0003),
            ],
            ..RunProfile::default()
        }
    }

    #[test]
    fn test_generate_per_symbol_in_profile_order() {
        let runner = FixtureRunner::new(short_profile());
        let series = runner.generate_per_symbol().unwrap();

        assert_eq!(series.len(), 2);
        assert_eq!(series[0].symbol, "MSFT");
        assert_eq!(series[1].symbol, "AAPL");
        // January 2023 from the 2nd: 22 weekdays
        assert_eq!(series[0].len(), 22);
        assert_eq!(series[0].first().unwrap().open, 250.0);
    }

    #[test]
    fn test_combined_is_sorted_and_complete() {
        let runner = FixtureRunner::new(short_profile());
        let rows = runner.generate_combined().unwrap();

        assert_eq!(rows.len(), 44);
        assert_eq!(rows[0].symbol, "AAPL");
        assert_eq!(rows[1].symbol, "MSFT");
        for pair in rows.windows(2) {
            let a = (pair[0].bar.timestamp, &pair[0].symbol);
            let b = (pair[1].bar.timestamp, &pair[1].symbol);
            assert!(a < b);
        }
    }

    #[test]
    fn test_combined_draws_are_independent_of_per_symbol() {
        let runner = FixtureRunner::new(short_profile());
        let per_symbol = runner.generate_per_symbol().unwrap();
        let combined = runner.generate_combined().unwrap();

        let msft_combined: Vec<_> = combined
            .iter()
            .filter(|r| r.symbol == "MSFT")
            .map(|r| r.bar)
            .collect();

        // Same model, same dates, different random draws
        assert_eq!(msft_combined.len(), per_symbol[0].len());
        assert_eq!(msft_combined[0].open, per_symbol[0].bars[0].open);
        assert_ne!(msft_combined, per_symbol[0].bars);
    }

    #[test]
    fn test_run_summary_totals() {
        let summary = RunSummary {
            files: vec![(PathBuf::from("a"), 3), (PathBuf::from("b"), 4)],
            combined_rows: 7,
        };
        assert_eq!(summary.total_bars(), 7);
    }
}
