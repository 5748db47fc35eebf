// File: crates/chart-index/src/series.rs
// Summary: Immutable parallel-array series (x plus open/high/low/close) consumed by the pyramid builder.
// Notes:
// - Missing high/low/close channels fall back to `open`, turning the input into a
//   single-value-per-sample series.
// - Values are stored as given; NaN and infinities are not sanitized.

use crate::error::{IndexError, Result};

/// One OHLC sample, as produced by CSV loaders and feed adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candle {
    pub t: f64,  // time/index (displayed on X)
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    x: Vec<f64>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
}

impl Series {
    /// Build a series from owned channels. Absent channels are copied from `open`.
    pub fn new(
        x: Vec<f64>,
        open: Vec<f64>,
        high: Option<Vec<f64>>,
        low: Option<Vec<f64>>,
        close: Option<Vec<f64>>,
    ) -> Result<Self> {
        let n = x.len();
        check_len("open", n, open.len())?;
        if let Some(h) = &high { check_len("high", n, h.len())?; }
        if let Some(l) = &low { check_len("low", n, l.len())?; }
        if let Some(c) = &close { check_len("close", n, c.len())?; }

        let high = high.unwrap_or_else(|| open.clone());
        let low = low.unwrap_or_else(|| open.clone());
        let close = close.unwrap_or_else(|| open.clone());
        Ok(Self { x, open, high, low, close })
    }

    /// Borrowing variant of [`Series::new`].
    pub fn from_slices(
        x: &[f64],
        open: &[f64],
        high: Option<&[f64]>,
        low: Option<&[f64]>,
        close: Option<&[f64]>,
    ) -> Result<Self> {
        Self::new(
            x.to_vec(),
            open.to_vec(),
            high.map(<[f64]>::to_vec),
            low.map(<[f64]>::to_vec),
            close.map(<[f64]>::to_vec),
        )
    }

    /// Line-style series: one value per sample broadcast to every channel.
    pub fn single_value(x: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        Self::new(x, values, None, None, None)
    }

    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut s = Self {
            x: Vec::with_capacity(candles.len()),
            open: Vec::with_capacity(candles.len()),
            high: Vec::with_capacity(candles.len()),
            low: Vec::with_capacity(candles.len()),
            close: Vec::with_capacity(candles.len()),
        };
        for c in candles {
            s.x.push(c.t);
            s.open.push(c.o);
            s.high.push(c.h);
            s.low.push(c.l);
            s.close.push(c.c);
        }
        s
    }

    pub fn len(&self) -> usize { self.x.len() }
    pub fn is_empty(&self) -> bool { self.x.is_empty() }

    pub fn x(&self) -> &[f64] { &self.x }
    pub fn open(&self) -> &[f64] { &self.open }
    pub fn high(&self) -> &[f64] { &self.high }
    pub fn low(&self) -> &[f64] { &self.low }
    pub fn close(&self) -> &[f64] { &self.close }

    /// Distance between the first and last x, or `None` for an empty series.
    pub fn span(&self) -> Option<f64> {
        match (self.x.first(), self.x.last()) {
            (Some(first), Some(last)) => Some(last - first),
            _ => None,
        }
    }
}

fn check_len(channel: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(IndexError::LengthMismatch { channel, expected, actual })
    }
}
