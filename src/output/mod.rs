//! CSV serialization of generated series
//!
//! Per-symbol files carry `timestamp,open,high,low,close,volume`; the combined
//! file inserts a `symbol` column after the timestamp. Prices are written with
//! two decimals.

use crate::error::{Error, Result};
use crate::models::{Bar, Series, SymbolBar, TIMESTAMP_FORMAT};
use chrono::NaiveDateTime;
use serde::Deserialize;
use std::path::Path;

pub const SERIES_HEADER: [&str; 6] = ["timestamp", "open", "high", "low", "close", "volume"];
pub const COMBINED_HEADER: [&str; 7] = [
    "timestamp", "symbol", "open", "high", "low", "close", "volume",
];

#[derive(Debug, Deserialize)]
struct SeriesRecord {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

#[derive(Debug, Deserialize)]
struct CombinedRecord {
    timestamp: String,
    symbol: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

/// Write one symbol's bars
pub fn write_series(path: &Path, series: &Series) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(SERIES_HEADER)?;

    for bar in &series.bars {
        writer.write_record([
            bar.formatted_timestamp(),
            format_price(bar.open),
            format_price(bar.high),
            format_price(bar.low),
            format_price(bar.close),
            bar.volume.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the multi-symbol file; rows are written in the order given
pub fn write_combined(path: &Path, rows: &[SymbolBar]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COMBINED_HEADER)?;

    for row in rows {
        let bar = &row.bar;
        writer.write_record([
            bar.formatted_timestamp(),
            row.symbol.clone(),
            format_price(bar.open),
            format_price(bar.high),
            format_price(bar.low),
            format_price(bar.close),
            bar.volume.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Flatten several series into rows ordered by `(timestamp, symbol)`
pub fn merge_sorted(series: &[Series]) -> Vec<SymbolBar> {
    let mut rows: Vec<SymbolBar> = series
        .iter()
        .flat_map(|s| {
            s.bars.iter().map(move |bar| SymbolBar {
                symbol: s.symbol.clone(),
                bar: *bar,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.bar
            .timestamp
            .cmp(&b.bar.timestamp)
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
    rows
}

/// Read a per-symbol file back into a series
pub fn load_series(path: &Path, symbol: &str) -> Result<Series> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut series = Series::new(symbol);

    for result in reader.deserialize() {
        let record: SeriesRecord = result?;
        series.bars.push(Bar {
            timestamp: parse_timestamp(&record.timestamp)?,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }

    Ok(series)
}

/// Read the combined file back, preserving row order
pub fn load_combined(path: &Path) -> Result<Vec<SymbolBar>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();

    for result in reader.deserialize() {
        let record: CombinedRecord = result?;
        rows.push(SymbolBar {
            symbol: record.symbol,
            bar: Bar {
                timestamp: parse_timestamp(&record.timestamp)?,
                open: record.open,
                high: record.high,
                low: record.low,
                close: record.close,
                volume: record.volume,
            },
        });
    }

    Ok(rows)
}

fn format_price(value: f64) -> String {
    format!("{:.2}", value)
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| Error::Parse {
        field: "timestamp",
        value: value.to_string(),
    })
}
