//! Per-category, per-source streaming aggregation.

mod accumulator;
mod aggregator;
mod category;
mod reservoir;

pub use accumulator::{SourceAggregate, SourceStats};
pub use aggregator::{AggregateSet, Aggregator, IngestCounters};
pub use category::{Category, CategoryStats};
pub use reservoir::{weighted_key, PointReservoir};
