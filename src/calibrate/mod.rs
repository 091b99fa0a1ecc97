//! Cross-source calibration: bias detection and model selection on anchor
//! pairs.

mod anchors;
pub mod bias;
mod calibrator;
mod model;
pub mod selection;

pub use anchors::{collect_anchors, AnchorDelta, SkippedAnchor};
pub use bias::{one_sample_t_test, BiasTest};
pub use calibrator::Calibrator;
pub use model::{Axis, AxisCalibration, CalibrationModel, CalibrationStatus, CorrectionModel};
pub use selection::{select_model, ModelClass, RejectedModel};
