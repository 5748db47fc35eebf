// File: crates/demo/src/main.rs
// Summary: Demo loads an OHLC CSV, builds doubling and calendar aggregation indexes, and prints
// the resolution map plus the buckets a chart would draw for a few viewports.

use anyhow::{Context, Result};
use chart_index::{AggregationIndex, Candle, IndexOptions, Series, StrategyKind};
use std::path::{Path, PathBuf};

/// Plot width the sample viewports are rendered into.
const PLOT_WIDTH_PX: f64 = 1500.0;

fn main() -> Result<()> {
    env_logger::init();

    // Accept path from CLI or fall back to sample filename (supports .csv/.cvs swap)
    let raw = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "binanceus_CRVUSDT_6h_2023-09-13_to_2025-01-21.cvs".to_string());
    let options = match std::env::args().nth(2) {
        Some(json) => IndexOptions::from_json(&json).context("parsing index options")?,
        None => IndexOptions::default(),
    };

    let (path, used_alt) = resolve_path(&raw)?;
    println!("Using input file: {}", path.display());
    if used_alt {
        println!("  (extension swapped between .csv/.cvs)");
    }

    let candles = load_ohlc_csv(&path)
        .with_context(|| format!("failed to load CSV '{}'", path.display()))?;
    println!("Loaded {} candles", candles.len());
    if candles.is_empty() {
        anyhow::bail!("no candles loaded; check headers/delimiter.");
    }

    let series = Series::from_candles(&candles);
    let time_options = IndexOptions { strategy: StrategyKind::Time, ..options.clone() };
    for opts in [options, time_options] {
        let mut index = AggregationIndex::with_options(&opts);
        index.set_data(series.clone());
        report(&index);
    }
    Ok(())
}

fn report(index: &AggregationIndex) {
    println!();
    println!("== strategy `{}`", index.strategy_name());
    for key in index.level_names() {
        println!("  {:<12} {:>8} buckets", key.to_string(), index.bucket_count(key));
    }

    let x = index.series().x();
    let (first, last) = (x[0], x[x.len() - 1]);
    let span = last - first;
    // full range, then progressively narrower windows centered on the data
    for fraction in [1.0, 0.25, 0.05, 0.01] {
        let half = span * fraction / 2.0;
        let center = first + span / 2.0;
        let (min, max) = (center - half, center + half);
        let est_step = (max - min) / PLOT_WIDTH_PX;
        let agg = index.query(min, max, est_step);
        let (lo, hi) = minmax_buckets(agg.buckets());
        println!(
            "  view {:>5.1}% -> level {:<12} rows {:>7}..{:<7} ({} buckets, price [{:.4}, {:.4}])",
            fraction * 100.0,
            agg.level.to_string(),
            agg.range.start,
            agg.range.end,
            agg.len(),
            lo,
            hi
        );
    }
}

fn minmax_buckets(buckets: &[chart_index::Bucket]) -> (f64, f64) {
    let mut min_p = f64::INFINITY;
    let mut max_p = f64::NEG_INFINITY;
    for b in buckets {
        min_p = min_p.min(b.min_y);
        max_p = max_p.max(b.max_y);
    }
    (min_p, max_p)
}

/// Resolve path, trying .csv/.cvs swap if needed.
/// Returns (actual_path, used_alt)
fn resolve_path(raw: &str) -> Result<(PathBuf, bool)> {
    let p = Path::new(raw);
    if p.exists() {
        return Ok((p.to_path_buf(), false));
    }
    if let Some(alt) = swap_ext(p) {
        if alt.exists() {
            return Ok((alt, true));
        }
    }
    anyhow::bail!("file not found: {}", p.display());
}

/// Load Binance-like OHLC CSV into Candle vec, x in epoch milliseconds.
fn load_ohlc_csv(path: &Path) -> Result<Vec<Candle>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr
        .headers()?
        .iter()
        .map(|h| h.to_lowercase())
        .collect::<Vec<_>>();
    log::debug!("headers: {:?}", headers);

    let idx = |names: &[&str]| -> Option<usize> {
        headers.iter().position(|h| names.iter().any(|want| h == want))
    };

    let i_time = idx(&["time", "timestamp", "open_time", "date", "datetime"]);
    let i_open = idx(&["open", "o"]);
    let i_high = idx(&["high", "h"]);
    let i_low = idx(&["low", "l"]);
    let i_close = idx(&["close", "c", "adj_close", "close_price"]);

    if i_open.is_none() || i_high.is_none() || i_low.is_none() || i_close.is_none() {
        log::warn!("could not find one of open/high/low/close columns");
    }

    let mut out = Vec::new();
    let mut row_index = 0_f64;

    for rec in rdr.records() {
        let rec = rec?;
        let parse = |i: Option<usize>| -> Option<f64> { i.and_then(|ix| rec.get(ix)).and_then(|s| s.trim().parse::<f64>().ok()) };

        // rows without a usable timestamp fall back to their index
        let t = match i_time.and_then(|ix| rec.get(ix)).and_then(parse_time_to_millis) {
            Some(t) => t,
            None => row_index,
        };
        row_index += 1.0;

        let (o, h, l, c) = (parse(i_open), parse(i_high), parse(i_low), parse(i_close));
        if let (Some(o), Some(h), Some(l), Some(c)) = (o, h, l, c) {
            out.push(Candle { t, o, h, l, c });
        }
    }
    Ok(out)
}

fn parse_time_to_millis(s: &str) -> Option<f64> {
    let n = s.trim().parse::<i64>().ok()?;
    if n > 10_i64.pow(12) {
        return Some(n as f64);
    } // epoch ms
    if n > 10_i64.pow(9) {
        return Some(n as f64 * 1000.0);
    } // epoch sec -> ms
    Some(n as f64)
}

fn swap_ext(p: &Path) -> Option<std::path::PathBuf> {
    let mut alt = p.to_path_buf();
    let ext = p.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "cvs" => {
            alt.set_extension("csv");
            Some(alt)
        }
        "csv" => {
            alt.set_extension("cvs");
            Some(alt)
        }
        _ => None,
    }
}
