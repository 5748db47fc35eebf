// File: crates/chart-index/src/bucket.rs
// Summary: One pyramid row summarizing a contiguous run of original samples.

use serde::{Deserialize, Serialize};

use crate::series::Series;

/// Summary of original samples `start_idx..=end_idx`.
/// Contract: `min_idx` and `max_idx` lie inside that range; `min_x`/`max_x`
/// are the x coordinates of those samples.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub start_idx: usize,
    pub end_idx: usize,
    pub min_idx: usize,
    pub max_idx: usize,
    pub open: f64,
    pub close: f64,
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bucket {
    /// Level-0 bucket for sample `i`: min from `low`, max from `high`.
    pub fn from_sample(series: &Series, i: usize) -> Self {
        let x = series.x()[i];
        Self {
            start_idx: i,
            end_idx: i,
            min_idx: i,
            max_idx: i,
            open: series.open()[i],
            close: series.close()[i],
            min_x: x,
            min_y: series.low()[i],
            max_x: x,
            max_y: series.high()[i],
        }
    }

    /// Merge with the bucket immediately to the right.
    /// On equal extremes the left bucket's point wins.
    pub fn merge(&self, next: &Bucket) -> Bucket {
        let (min_idx, min_x, min_y) = if self.min_y <= next.min_y {
            (self.min_idx, self.min_x, self.min_y)
        } else {
            (next.min_idx, next.min_x, next.min_y)
        };
        let (max_idx, max_x, max_y) = if self.max_y >= next.max_y {
            (self.max_idx, self.max_x, self.max_y)
        } else {
            (next.max_idx, next.max_x, next.max_y)
        };
        Bucket {
            start_idx: self.start_idx,
            end_idx: next.end_idx,
            min_idx,
            max_idx,
            open: self.open,
            close: next.close,
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Extend this bucket in place with the bucket to its right.
    /// Extremes are replaced only on strict improvement.
    pub fn absorb(&mut self, next: &Bucket) {
        self.end_idx = next.end_idx;
        self.close = next.close;
        if next.max_y > self.max_y {
            self.max_y = next.max_y;
            self.max_x = next.max_x;
            self.max_idx = next.max_idx;
        }
        if next.min_y < self.min_y {
            self.min_y = next.min_y;
            self.min_x = next.min_x;
            self.min_idx = next.min_idx;
        }
    }

    /// Number of original samples covered.
    pub fn sample_count(&self) -> usize { self.end_idx - self.start_idx + 1 }

    pub fn contains(&self, idx: usize) -> bool { self.start_idx <= idx && idx <= self.end_idx }
}
