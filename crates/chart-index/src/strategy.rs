// File: crates/chart-index/src/strategy.rs
// Summary: Pyramid construction strategies (binary doubling, calendar bucketing, none).

use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::calendar::{Calendar, ChronoCalendar, UnitSpec, DEFAULT_UNITS};
use crate::error::{IndexError, Result};
use crate::level::LevelKey;
use crate::pyramid::Pyramid;
use crate::series::Series;

/// Skip factor for calendar units: a unit is skipped when the series spans more than
/// `DEFAULT_DENSITY * multiple * N` of it. Heuristic cost control; tune per data set.
pub const DEFAULT_DENSITY: f64 = 2.0;

/// Builds coarser levels on top of the level-0 rows already in the pyramid.
pub trait PyramidStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    /// Called only for non-empty series; `pyramid` holds the `Original` level.
    fn build(&self, series: &Series, pyramid: &mut Pyramid);
}

/// Closed set of built-in strategies, for configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Double,
    Time,
    None,
}

/// Level 0 only.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAggregation;

impl PyramidStrategy for NoAggregation {
    fn name(&self) -> &'static str { "none" }
    fn build(&self, _series: &Series, _pyramid: &mut Pyramid) {}
}

/// Level k holds `ceil(N / 2^k)` buckets, each the merge of two level k-1 buckets.
#[derive(Clone, Copy, Debug, Default)]
pub struct DoublingStrategy;

impl PyramidStrategy for DoublingStrategy {
    fn name(&self) -> &'static str { "double" }

    fn build(&self, _series: &Series, pyramid: &mut Pyramid) {
        let Some(mut level) = pyramid.level_range(LevelKey::Original) else { return };
        let mut step: u32 = 1;
        while level.len() > 1 {
            step = step.saturating_mul(2);
            let start = pyramid.len();
            for i in level.clone().step_by(2) {
                let rows = pyramid.buckets();
                // odd tail is carried forward unchanged
                let merged = if i + 1 < level.end { rows[i].merge(&rows[i + 1]) } else { rows[i] };
                pyramid.push_bucket(merged);
            }
            level = start..pyramid.len();
            pyramid.record_level(LevelKey::Double(step), level.clone());
        }
    }
}

/// Calendar-aligned levels built finest-to-coarsest from a unit table.
#[derive(Clone, Debug)]
pub struct CalendarStrategy<C = ChronoCalendar> {
    calendar: C,
    units: Vec<UnitSpec>,
    density: f64,
}

impl Default for CalendarStrategy<ChronoCalendar> {
    fn default() -> Self {
        Self::new(ChronoCalendar)
    }
}

impl<C: Calendar> CalendarStrategy<C> {
    /// Strategy over [`DEFAULT_UNITS`] with the given calendar.
    pub fn new(calendar: C) -> Self {
        Self { calendar, units: DEFAULT_UNITS.to_vec(), density: DEFAULT_DENSITY }
    }

    /// Replace the unit table. Names and steps must be unique, and every parent must be
    /// declared earlier in the table.
    pub fn with_units(mut self, units: impl Into<Vec<UnitSpec>>) -> Result<Self> {
        let units = units.into();
        for (i, spec) in units.iter().enumerate() {
            if units[..i].iter().any(|u| u.name == spec.name || u.step() == spec.step()) {
                return Err(IndexError::DuplicateUnit { unit: spec.name });
            }
            if let Some(parent) = spec.parent {
                if !units[..i].iter().any(|u| u.name == parent) {
                    return Err(IndexError::UnknownParent { unit: spec.name, parent });
                }
            }
        }
        self.units = units;
        Ok(self)
    }

    /// Override the skip factor (see [`DEFAULT_DENSITY`]).
    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn units(&self) -> &[UnitSpec] { &self.units }
    pub fn density(&self) -> f64 { self.density }

    fn parent_range(&self, spec: &UnitSpec, pyramid: &Pyramid) -> Option<Range<usize>> {
        let parent = spec.parent?;
        let parent = self.units.iter().find(|u| u.name == parent)?;
        pyramid.level_range(LevelKey::Time(parent.step()))
    }

    /// Move `current` forward one period at a time until `end_x < current`.
    fn advance_past(&self, mut current: f64, end_x: f64, spec: &UnitSpec) -> f64 {
        while end_x >= current {
            let next = self.calendar.add(current, spec.unit, spec.multiple);
            if next.partial_cmp(&current) != Some(std::cmp::Ordering::Greater) {
                break;
            }
            current = next;
        }
        current
    }
}

impl<C: Calendar> PyramidStrategy for CalendarStrategy<C> {
    fn name(&self) -> &'static str { "time" }

    fn build(&self, series: &Series, pyramid: &mut Pyramid) {
        let Some(original) = pyramid.level_range(LevelKey::Original) else { return };
        let x = series.x();
        let n = series.len() as f64;
        let first_x = x[pyramid.buckets()[original.start].start_idx];
        let last_x = x[pyramid.buckets()[original.end - 1].end_idx];
        let mut latest = original.clone();

        for spec in &self.units {
            if latest.len() <= 1 {
                break;
            }
            let minimum = self.calendar.align(first_x, spec.unit, spec.multiple);
            let span = self.calendar.diff_in_units(minimum, last_x, spec.unit);
            if span as f64 > n * self.density * f64::from(spec.multiple) {
                log::debug!("skipping calendar unit {}: span {span} too wide for {n} samples", spec.name);
                continue;
            }
            let parent = self.parent_range(spec, pyramid).unwrap_or_else(|| original.clone());

            let start = pyramid.len();
            let mut open = pyramid.buckets()[parent.start];
            let mut current = self.calendar.add(minimum, spec.unit, spec.multiple);
            current = self.advance_past(current, x[open.end_idx], spec);
            for i in (parent.start + 1)..parent.end {
                let next = pyramid.buckets()[i];
                let end_x = x[next.end_idx];
                if end_x < current {
                    open.absorb(&next);
                } else {
                    pyramid.push_bucket(open);
                    open = next;
                    current = self.advance_past(current, end_x, spec);
                }
            }
            pyramid.push_bucket(open);

            latest = start..pyramid.len();
            pyramid.record_level(LevelKey::Time(spec.step()), latest.clone());
        }
    }
}
