// File: crates/chart-index/src/lib.rs
// Summary: Multi-resolution aggregation index over OHLC-style series; exports the public API
// for pyramid construction and viewport queries.

pub mod bucket;
pub mod calendar;
pub mod error;
pub mod index;
pub mod level;
pub mod options;
pub mod pyramid;
pub mod series;
pub mod strategy;

pub use bucket::Bucket;
pub use calendar::{Calendar, CalendarStep, CalendarUnit, ChronoCalendar, UnitSpec, DEFAULT_UNITS};
pub use error::IndexError;
pub use index::{Aggregation, AggregationIndex};
pub use level::{LevelKey, ResolutionMap};
pub use options::IndexOptions;
pub use pyramid::Pyramid;
pub use series::{Candle, Series};
pub use strategy::{CalendarStrategy, DoublingStrategy, NoAggregation, PyramidStrategy, StrategyKind, DEFAULT_DENSITY};
