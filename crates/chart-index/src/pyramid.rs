// File: crates/chart-index/src/pyramid.rs
// Summary: Bucket arena shared by every level plus the resolution map describing it.
// Notes:
// - Levels are row ranges into one Vec<Bucket>; appending a level continues writing
//   after the previous level's rows.
// - The pyramid is tied to the series it was built from and never updated in place.

use std::ops::Range;

use crate::bucket::Bucket;
use crate::level::{LevelKey, ResolutionMap};
use crate::series::Series;
use crate::strategy::PyramidStrategy;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Pyramid {
    buckets: Vec<Bucket>,
    map: ResolutionMap,
}

impl Pyramid {
    /// Level 0 only: one bucket per sample. An empty series yields an empty map.
    pub fn original(series: &Series) -> Self {
        let buckets: Vec<Bucket> = (0..series.len()).map(|i| Bucket::from_sample(series, i)).collect();
        let mut map = ResolutionMap::new();
        if !buckets.is_empty() {
            map.insert(LevelKey::Original, 0..buckets.len());
        }
        Self { buckets, map }
    }

    /// Level 0 followed by whatever coarser levels `strategy` produces.
    pub fn build(series: &Series, strategy: &dyn PyramidStrategy) -> Self {
        let mut pyramid = Self::original(series);
        if !series.is_empty() {
            strategy.build(series, &mut pyramid);
        }
        log::debug!(
            "pyramid built with `{}`: {} samples, {} levels, {} buckets",
            strategy.name(),
            series.len(),
            pyramid.map.len(),
            pyramid.buckets.len()
        );
        pyramid
    }

    pub fn buckets(&self) -> &[Bucket] { &self.buckets }
    pub fn map(&self) -> &ResolutionMap { &self.map }
    pub fn len(&self) -> usize { self.buckets.len() }
    pub fn is_empty(&self) -> bool { self.buckets.is_empty() }

    pub fn level_range(&self, key: LevelKey) -> Option<Range<usize>> { self.map.get(key) }

    pub fn level(&self, key: LevelKey) -> Option<&[Bucket]> {
        self.map.get(key).map(|r| &self.buckets[r])
    }

    /// Append a row; strategies call this while emitting a new level.
    pub fn push_bucket(&mut self, bucket: Bucket) { self.buckets.push(bucket); }

    /// Name the rows `range` as level `key`.
    /// Contract: `range` lies within the arena and was written by the caller.
    pub fn record_level(&mut self, key: LevelKey, range: Range<usize>) {
        debug_assert!(range.start <= range.end && range.end <= self.buckets.len());
        log::trace!("level {key}: rows {}..{} ({} buckets)", range.start, range.end, range.len());
        self.map.insert(key, range);
    }
}
