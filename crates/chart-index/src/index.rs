// File: crates/chart-index/src/index.rs
// Summary: Aggregation index: owns one series snapshot and its pyramid, answers viewport queries.
// Notes:
// - A rebuild is prepared off to the side and swapped in only when it succeeds, so a
//   rejected input leaves the previous pyramid queryable.
// - Queries never fail: empty data and invalid bounds produce an empty range.

use std::ops::Range;

use crate::bucket::Bucket;
use crate::error::Result;
use crate::level::LevelKey;
use crate::options::IndexOptions;
use crate::pyramid::Pyramid;
use crate::series::Series;
use crate::strategy::{DoublingStrategy, PyramidStrategy};

pub struct AggregationIndex {
    strategy: Box<dyn PyramidStrategy>,
    series: Series,
    pyramid: Pyramid,
}

/// Result of [`AggregationIndex::query`].
#[derive(Clone, Debug, PartialEq)]
pub struct Aggregation<'a> {
    /// Level the buckets were taken from.
    pub level: LevelKey,
    /// Rows of the whole level inside the arena.
    pub level_range: Range<usize>,
    /// Rows covering the requested x range; a sub-range of `level_range`.
    pub range: Range<usize>,
    data: &'a [Bucket],
}

impl<'a> Aggregation<'a> {
    fn empty(data: &'a [Bucket]) -> Self {
        Self { level: LevelKey::Original, level_range: 0..0, range: 0..0, data }
    }

    /// Buckets covering the requested range, in x order.
    pub fn buckets(&self) -> &'a [Bucket] { &self.data[self.range.clone()] }

    /// The full bucket arena, for callers that index it with `range` themselves.
    pub fn data(&self) -> &'a [Bucket] { self.data }

    pub fn len(&self) -> usize { self.range.len() }
    pub fn is_empty(&self) -> bool { self.range.is_empty() }
}

impl Default for AggregationIndex {
    fn default() -> Self { Self::new() }
}

impl AggregationIndex {
    /// Empty index using binary doubling.
    pub fn new() -> Self { Self::with_strategy(DoublingStrategy) }

    pub fn with_strategy<S: PyramidStrategy + 'static>(strategy: S) -> Self {
        Self::with_boxed_strategy(Box::new(strategy))
    }

    pub fn with_boxed_strategy(strategy: Box<dyn PyramidStrategy>) -> Self {
        Self { strategy, series: Series::default(), pyramid: Pyramid::default() }
    }

    pub fn with_options(options: &IndexOptions) -> Self { Self::with_boxed_strategy(options.build_strategy()) }

    /// Replace the data and rebuild every level. Absent channels fall back to `open`.
    /// On a length mismatch the index keeps its previous contents.
    pub fn set_series(
        &mut self,
        x: &[f64],
        open: &[f64],
        high: Option<&[f64]>,
        low: Option<&[f64]>,
        close: Option<&[f64]>,
    ) -> Result<()> {
        let series = Series::from_slices(x, open, high, low, close).inspect_err(|e| {
            log::debug!("rejected series update: {e}");
        })?;
        self.set_data(series);
        Ok(())
    }

    /// Replace the data with an already validated series and rebuild.
    pub fn set_data(&mut self, series: Series) {
        let pyramid = Pyramid::build(&series, self.strategy.as_ref());
        self.series = series;
        self.pyramid = pyramid;
    }

    pub fn series(&self) -> &Series { &self.series }
    pub fn pyramid(&self) -> &Pyramid { &self.pyramid }
    pub fn strategy_name(&self) -> &'static str { self.strategy.name() }

    /// Levels in build order, finest first.
    pub fn level_names(&self) -> Vec<LevelKey> { self.pyramid.map().keys().collect() }

    /// Bucket count of `level`, or 0 when that level was not built.
    pub fn bucket_count(&self, level: LevelKey) -> usize {
        self.pyramid.level_range(level).map_or(0, |r| r.len())
    }

    pub fn level(&self, key: LevelKey) -> Option<&[Bucket]> { self.pyramid.level(key) }

    /// Level whose average x spacing is the smallest one still `>= est_step`.
    /// Falls back to `Original`; `None` only for an empty index.
    pub fn select_level(&self, est_step: f64) -> Option<(LevelKey, Range<usize>)> {
        let span = self.series.span()?;
        let mut best = (LevelKey::Original, self.pyramid.level_range(LevelKey::Original)?);
        let mut min_step = f64::INFINITY;
        for (key, range) in self.pyramid.map().iter() {
            let count = range.len();
            if count <= 1 {
                continue;
            }
            let step = span / (count - 1) as f64;
            if est_step <= step && step < min_step {
                min_step = step;
                best = (key, range);
            }
        }
        Some(best)
    }

    /// Minimal run of buckets covering `[min, max]` at the resolution closest to `est_step`
    /// x-units per bucket. `min > max` or NaN bounds give an empty result.
    pub fn query(&self, min: f64, max: f64, est_step: f64) -> Aggregation<'_> {
        let data = self.pyramid.buckets();
        if min.is_nan() || max.is_nan() || min > max {
            log::trace!("query with invalid range [{min}, {max}]");
            return Aggregation::empty(data);
        }
        let Some((level, level_range)) = self.select_level(est_step) else {
            return Aggregation::empty(data);
        };
        let x = self.series.x();
        let lo = search_min(data, x, &level_range, min).max(level_range.start);
        let hi = (search_max(data, x, &level_range, max) + 1).min(level_range.end);
        Aggregation { level, range: lo..hi.max(lo), level_range, data }
    }
}

/// First bucket holding a sample at or after `key`, or the bucket just before it when `key`
/// falls in the gap between two buckets. Repeated x values resolve to the earliest bucket.
fn search_min(buckets: &[Bucket], x: &[f64], level: &Range<usize>, key: f64) -> usize {
    let rows = &buckets[level.clone()];
    if key <= x[rows[0].start_idx] {
        return level.start;
    }
    let i = rows.partition_point(|b| x[b.end_idx] < key);
    if i == rows.len() {
        return level.end - 1;
    }
    if x[rows[i].start_idx] > key {
        level.start + i - 1
    } else {
        level.start + i
    }
}

/// Last bucket holding a sample at or before `key`, or the bucket just after it when `key`
/// falls in the gap between two buckets. Repeated x values resolve to the latest bucket.
fn search_max(buckets: &[Bucket], x: &[f64], level: &Range<usize>, key: f64) -> usize {
    let rows = &buckets[level.clone()];
    if key >= x[rows[rows.len() - 1].end_idx] {
        return level.end - 1;
    }
    let i = rows.partition_point(|b| x[b.start_idx] <= key);
    if i == 0 {
        return level.start;
    }
    if x[rows[i - 1].end_idx] < key {
        level.start + i
    } else {
        level.start + i - 1
    }
}
