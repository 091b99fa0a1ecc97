//! Multi-source consolidation into final overlay records.

mod engine;
mod record;
pub mod weighting;

pub use engine::ConsolidationEngine;
pub use record::{OverlayRecord, OverlayStatus};
pub use weighting::weight_source;
