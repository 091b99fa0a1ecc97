use super::timing::TimingBreakdown;
use crate::aggregate::IngestCounters;
use crate::calibrate::{AxisCalibration, CalibrationModel, CalibrationStatus, CorrectionModel};
use crate::consolidate::{OverlayRecord, OverlayStatus};
use serde::Serialize;

/// Result of [`OverlayPipeline::run`](crate::OverlayPipeline::run).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayReport {
    pub overlays: Vec<OverlayRecord>,
    pub calibration: CalibrationModel,
    pub counters: IngestCounters,
    pub summary: RunSummary,
    pub timings: TimingBreakdown,
}

/// Category counts per output status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub categories: usize,
    pub ok: usize,
    pub insufficient_samples: usize,
    pub degenerate_geometry: usize,
    pub unpeeled_insufficient_interior: usize,
}

impl RunSummary {
    pub fn from_records(records: &[OverlayRecord]) -> Self {
        let mut summary = RunSummary {
            categories: records.len(),
            ..Default::default()
        };
        for record in records {
            match record.status {
                OverlayStatus::Ok => summary.ok += 1,
                OverlayStatus::InsufficientSamples => summary.insufficient_samples += 1,
                OverlayStatus::DegenerateGeometry => summary.degenerate_geometry += 1,
                OverlayStatus::UnpeeledInsufficientInterior => {
                    summary.unpeeled_insufficient_interior += 1
                }
            }
        }
        summary
    }
}

impl OverlayReport {
    pub fn overlay(&self, name: &str) -> Option<&OverlayRecord> {
        self.overlays.iter().find(|r| r.name == name)
    }

    pub fn print_text_summary(&self) {
        let c = &self.counters;
        println!("Overlay summary");
        println!(
            "  samples: seen={} accepted={} out_of_gamut={} invalid={}",
            c.seen, c.accepted, c.out_of_gamut, c.invalid
        );
        let s = &self.summary;
        println!(
            "  categories: {} (ok={} unpeeled={} degenerate={} insufficient={})",
            s.categories,
            s.ok,
            s.unpeeled_insufficient_interior,
            s.degenerate_geometry,
            s.insufficient_samples
        );

        let cal = &self.calibration;
        match cal.status {
            CalibrationStatus::Calibrated => println!(
                "\nCalibration: {} anchors ({} skipped)",
                cal.anchors.len(),
                cal.skipped.len()
            ),
            CalibrationStatus::Uncalibrated { found, required } => println!(
                "\nCalibration: uncalibrated ({found} anchors, {required} required)"
            ),
        }
        for axis in cal.axes() {
            println!("  {}", format_axis(axis));
        }

        println!("\nOverlays");
        for record in &self.overlays {
            match &record.polyhedron {
                Some(poly) => println!(
                    "  {:<24} {:<30} H={:6.1} V={:4.2} C={:5.2} vol={:8.3} vertices={} points={}",
                    record.name,
                    record.status.label(),
                    poly.centroid_hvc.hue,
                    poly.centroid_hvc.value,
                    poly.centroid_hvc.chroma,
                    poly.volume,
                    poly.vertex_count,
                    poly.point_count
                ),
                None => println!("  {:<24} {}", record.name, record.status.label()),
            }
        }

        let stages: Vec<String> = self
            .timings
            .stages
            .iter()
            .map(|t| format!("{}={:.3}", t.label, t.elapsed_ms))
            .collect();
        println!(
            "\nTimings (ms): {} total={:.3}",
            stages.join(" "),
            self.timings.total_ms
        );
    }
}

fn format_axis(axis: &AxisCalibration) -> String {
    let test = axis
        .bias_test
        .map(|t| format!("mean={:+.3} p={:.4}", t.mean, t.p_value))
        .unwrap_or_else(|| "untested".to_string());
    let model = match &axis.model {
        CorrectionModel::Identity => "identity".to_string(),
        CorrectionModel::Constant { offset } => format!("constant({offset:+.3})"),
        CorrectionModel::Harmonic { order, .. } => format!("harmonic(order {order})"),
    };
    format!(
        "{:<7} {test} -> {model} (anchors={}, rejected={})",
        axis.axis.label(),
        axis.anchors_used,
        axis.rejected.len()
    )
}
