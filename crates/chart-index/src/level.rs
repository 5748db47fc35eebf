// File: crates/chart-index/src/level.rs
// Summary: Level keys and the resolution map (level -> row range inside the bucket arena).

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::calendar::CalendarStep;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelKey {
    /// One bucket per raw sample.
    Original,
    /// Pairwise merge level; the payload is the samples-per-bucket power of two.
    Double(u32),
    /// Calendar-aligned level.
    Time(CalendarStep),
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelKey::Original => f.write_str("original"),
            LevelKey::Double(step) => write!(f, "double_{step}"),
            LevelKey::Time(step) => write!(f, "time_{step}"),
        }
    }
}

/// Insertion-ordered map from level to its `[start, end)` rows. Finest level first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolutionMap {
    entries: Vec<(LevelKey, Range<usize>)>,
}

impl ResolutionMap {
    pub fn new() -> Self { Self::default() }

    /// Record `range` under `key`, replacing an earlier range for the same key.
    pub fn insert(&mut self, key: LevelKey, range: Range<usize>) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = range,
            None => self.entries.push((key, range)),
        }
    }

    pub fn get(&self, key: LevelKey) -> Option<Range<usize>> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, r)| r.clone())
    }

    pub fn contains(&self, key: LevelKey) -> bool { self.entries.iter().any(|(k, _)| *k == key) }

    pub fn keys(&self) -> impl Iterator<Item = LevelKey> + '_ { self.entries.iter().map(|(k, _)| *k) }

    pub fn iter(&self) -> impl Iterator<Item = (LevelKey, Range<usize>)> + '_ {
        self.entries.iter().map(|(k, r)| (*k, r.clone()))
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
