use crate::params::{
    AggregationParams, CalibrationParams, ConsolidationParams, HullParams, OverlayParams,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// JSON configuration of the `overlay_build` tool.
#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    /// JSON array of `{name, source, coordinate: [h, v, c], weight}` records.
    pub input: PathBuf,
    #[serde(default)]
    pub aggregation: AggregationConfig,
    #[serde(default)]
    pub hull: HullConfig,
    #[serde(default)]
    pub calibration: CalibrationConfig,
    #[serde(default)]
    pub consolidation: ConsolidationConfig,
    pub output: OutputConfig,
}

impl PipelineConfig {
    pub fn resolve_params(&self) -> OverlayParams {
        OverlayParams {
            aggregation: self.aggregation.resolve(),
            hull: self.hull.resolve(),
            calibration: self.calibration.resolve(),
            consolidation: self.consolidation.resolve(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AggregationConfig {
    pub min_weight: Option<f64>,
    pub retention_cap: Option<usize>,
    pub achromatic_chroma: Option<f64>,
    pub seed: Option<u64>,
}

impl AggregationConfig {
    pub fn resolve(&self) -> AggregationParams {
        let mut params = AggregationParams::default();
        if let Some(v) = self.min_weight {
            params.min_weight = v;
        }
        if let Some(v) = self.retention_cap {
            params.retention_cap = v;
        }
        if let Some(v) = self.achromatic_chroma {
            params.achromatic_chroma = v;
        }
        if let Some(v) = self.seed {
            params.seed = v;
        }
        params
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct HullConfig {
    pub peel_layers: Option<usize>,
    pub min_interior_points: Option<usize>,
    pub tolerance: Option<f64>,
}

impl HullConfig {
    pub fn resolve(&self) -> HullParams {
        let mut params = HullParams::default();
        if let Some(v) = self.peel_layers {
            params.peel_layers = v;
        }
        if let Some(v) = self.min_interior_points {
            params.min_interior_points = v;
        }
        if let Some(v) = self.tolerance {
            params.tolerance = v;
        }
        params
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct CalibrationConfig {
    pub significance: Option<f64>,
    pub min_anchor_pairs: Option<usize>,
    pub max_harmonic_order: Option<usize>,
}

impl CalibrationConfig {
    pub fn resolve(&self) -> CalibrationParams {
        let mut params = CalibrationParams::default();
        if let Some(v) = self.significance {
            params.significance = v;
        }
        if let Some(v) = self.min_anchor_pairs {
            params.min_anchor_pairs = v;
        }
        if let Some(v) = self.max_harmonic_order {
            params.max_harmonic_order = v;
        }
        params
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConsolidationConfig {
    pub confidence_decades: Option<f64>,
    pub confidence_floor: Option<f64>,
    pub measured_priority: Option<f64>,
}

impl ConsolidationConfig {
    pub fn resolve(&self) -> ConsolidationParams {
        let mut params = ConsolidationParams::default();
        if let Some(v) = self.confidence_decades {
            params.confidence_decades = v;
        }
        if let Some(v) = self.confidence_floor {
            params.confidence_floor = v;
        }
        if let Some(v) = self.measured_priority {
            params.measured_priority = v;
        }
        params
    }
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
    #[serde(default = "default_report_name")]
    pub report_json: PathBuf,
}

fn default_report_name() -> PathBuf {
    PathBuf::from("overlays.json")
}

impl OutputConfig {
    pub fn report_path(&self) -> PathBuf {
        resolve_path(&self.dir, &self.report_json)
    }
}

pub fn load_config(path: &Path) -> Result<PipelineConfig, String> {
    let data = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
}

fn resolve_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
