// File: crates/chart-index/src/options.rs
// Summary: Serializable index configuration (strategy choice and calendar skip factor).

use serde::{Deserialize, Serialize};

use crate::calendar::ChronoCalendar;
use crate::error::{IndexError, Result};
use crate::strategy::{CalendarStrategy, DoublingStrategy, NoAggregation, PyramidStrategy, StrategyKind, DEFAULT_DENSITY};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
    pub strategy: StrategyKind,
    /// Calendar skip factor; only read by the `time` strategy.
    pub density: f64,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self { strategy: StrategyKind::Double, density: DEFAULT_DENSITY }
    }
}

impl IndexOptions {
    pub fn with_strategy(strategy: StrategyKind) -> Self {
        Self { strategy, ..Self::default() }
    }

    /// Parse options from JSON, e.g. `{"strategy": "time", "density": 4.0}`.
    /// Missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let opts: Self = serde_json::from_str(text).map_err(|e| IndexError::InvalidOptions(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Contract: `density` is finite and strictly positive.
    pub fn validate(&self) -> Result<()> {
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(IndexError::InvalidOptions(format!("density must be positive, got {}", self.density)));
        }
        Ok(())
    }

    /// Built-in strategy for these options; the calendar strategy uses UTC chrono arithmetic.
    pub fn build_strategy(&self) -> Box<dyn PyramidStrategy> {
        match self.strategy {
            StrategyKind::Double => Box::new(DoublingStrategy),
            StrategyKind::Time => Box::new(CalendarStrategy::new(ChronoCalendar).with_density(self.density)),
            StrategyKind::None => Box::new(NoAggregation),
        }
    }
}
