//! JSON configuration for the command-line tool.

pub mod pipeline;

pub use pipeline::{load_config, PipelineConfig};
