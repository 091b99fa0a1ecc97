//! Error types for the overlay engine.
//!
//! Only configuration and I/O failures are fatal. Everything else describes a
//! per-category or per-sample condition that the pipeline records in the
//! category status and then moves on.

use thiserror::Error;

/// Result type alias for overlay operations
pub type Result<T> = std::result::Result<T, OverlayError>;

/// Why a point set cannot span a 3D hull.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Degeneracy {
    /// Fewer than four points were supplied.
    TooFewPoints,
    /// All points coincide.
    Coincident,
    /// All points lie on a single line.
    Collinear,
    /// All points lie on a single plane.
    Coplanar,
}

impl std::fmt::Display for Degeneracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Degeneracy::TooFewPoints => "fewer than four points",
            Degeneracy::Coincident => "coincident points",
            Degeneracy::Collinear => "collinear points",
            Degeneracy::Coplanar => "coplanar points",
        };
        f.write_str(label)
    }
}

/// Error taxonomy of the overlay engine.
#[derive(Error, Debug)]
pub enum OverlayError {
    /// A sample or coordinate violated its construction invariants
    #[error("Invalid sample: {field} = {value}")]
    InvalidSample { field: &'static str, value: String },

    /// Native coordinate could not be converted into hue/value/chroma
    #[error("Sample out of gamut: {reason}")]
    OutOfGamut { reason: String },

    /// Category weight below the configured minimum
    #[error("Insufficient samples for '{name}': weight {weight:.2} (minimum {minimum:.2})")]
    InsufficientSamples {
        name: String,
        weight: f64,
        minimum: f64,
    },

    /// Point set cannot form a solid hull
    #[error("Degenerate geometry: {kind} ({points} points)")]
    DegenerateGeometry { kind: Degeneracy, points: usize },

    /// Not enough anchor pairs to fit a calibration
    #[error("Uncalibrated: {found} anchor pairs (minimum {required})")]
    UncalibratedAnchors { found: usize, required: usize },

    /// Parameter or configuration value out of range
    #[error("Invalid configuration: {parameter} = {value}")]
    InvalidConfig { parameter: &'static str, value: String },

    /// File system failure
    #[error("I/O error on {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failure
    #[error("JSON error on {path}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl OverlayError {
    pub(crate) fn invalid_sample(field: &'static str, value: impl ToString) -> Self {
        Self::InvalidSample {
            field,
            value: value.to_string(),
        }
    }

    pub(crate) fn invalid_config(parameter: &'static str, value: impl ToString) -> Self {
        Self::InvalidConfig {
            parameter,
            value: value.to_string(),
        }
    }

    /// Whether the run can continue after this error (the category or sample
    /// is reported and skipped).
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            OverlayError::InvalidConfig { .. } | OverlayError::Io { .. } | OverlayError::Json { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_taxonomy() {
        let degenerate = OverlayError::DegenerateGeometry {
            kind: Degeneracy::Coplanar,
            points: 4,
        };
        assert!(degenerate.is_recoverable());
        assert!(OverlayError::UncalibratedAnchors {
            found: 3,
            required: 10
        }
        .is_recoverable());
        assert!(!OverlayError::invalid_config("peel_layers", 0).is_recoverable());
    }

    #[test]
    fn messages_name_the_condition() {
        let err = OverlayError::DegenerateGeometry {
            kind: Degeneracy::Collinear,
            points: 5,
        };
        assert_eq!(
            err.to_string(),
            "Degenerate geometry: collinear points (5 points)"
        );
    }
}
