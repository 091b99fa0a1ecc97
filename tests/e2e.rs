mod common;

use color_overlays::angle::hue_difference;
use color_overlays::calibrate::CorrectionModel;
use color_overlays::convert::{HvcTriple, PassThrough};
use color_overlays::hull::{HullBuilder, Provenance};
use color_overlays::prelude::*;
use common::synthetic::{ellipsoid, mirrored_ellipsoid, records, rng};

const ANCHORS: [(&str, f64); 2] = [("red", 20.0), ("green", 140.0)];
const CROWD_ONLY: [(&str, f64); 8] = [
    ("yellow", 60.0),
    ("chartreuse", 100.0),
    ("teal", 180.0),
    ("azure", 220.0),
    ("blue", 260.0),
    ("violet", 300.0),
    ("magenta", 330.0),
    ("rose", 350.0),
];

fn scenario() -> Vec<SampleRecord<HvcTriple>> {
    let mut rng = rng(2024);
    let mut input = Vec::new();
    // crowd anchor clouds are independent, much wider and shifted by +10 degrees
    for (name, hue) in ANCHORS {
        let center = HueValueChroma::new(hue, 5.0, 7.0).unwrap();
        let measured = mirrored_ellipsoid(&mut rng, center, [0.8, 0.8, 0.6], 40);
        let shifted = HueValueChroma::new(hue + 10.0, 5.0, 7.0).unwrap();
        let crowd = mirrored_ellipsoid(&mut rng, shifted, [2.0, 2.0, 1.5], 200);
        input.extend(records(name, Source::Measured, &measured, 1.0));
        input.extend(records(name, Source::Crowd, &crowd, 1.0));
    }
    for (name, hue) in CROWD_ONLY {
        let center = HueValueChroma::new(hue, 6.0, 6.0).unwrap();
        let crowd = ellipsoid(&mut rng, center, [1.0, 1.0, 0.8], 80);
        input.extend(records(name, Source::Crowd, &crowd, 2.0));
    }
    input
}

fn params() -> OverlayParams {
    let mut params = OverlayParams::default();
    params.calibration.min_anchor_pairs = 2;
    params
}

#[test]
fn crowd_shift_is_learned_from_anchors_and_applied() {
    common::init_logging();
    let pipeline = OverlayPipeline::new(params()).unwrap();
    let input = scenario();
    let set = pipeline.aggregate(&input, &PassThrough);
    let report = pipeline.run_aggregated(&set);

    assert!(report.calibration.is_calibrated());
    match report.calibration.hue.model {
        CorrectionModel::Constant { offset } => {
            assert!(common::approx_eq(offset, 10.0, 0.5), "offset={offset}")
        }
        ref other => panic!("expected a constant hue offset, got {other:?}"),
    }
    assert!(report.calibration.value.model.is_identity());
    assert!(report.calibration.chroma.model.is_identity());
    assert_eq!(report.summary.categories, 10);
    assert_eq!(report.summary.ok, 10);

    let builder = HullBuilder::new(pipeline.params().hull.clone());
    for (name, _) in CROWD_ONLY {
        let record = report.overlay(name).unwrap();
        assert_eq!(record.status, OverlayStatus::Ok);
        assert!(record.provenance.calibration_applied);
        assert_eq!(record.provenance.sources, vec![Source::Crowd]);

        let raw_points = set.get(name).unwrap().points(Source::Crowd);
        let raw = builder
            .build(&raw_points, Provenance::single(Source::Crowd, raw_points.len()))
            .unwrap();
        let shift = hue_difference(
            record.polyhedron.as_ref().unwrap().centroid_hvc.hue,
            raw.polyhedron.centroid_hvc.hue,
        );
        assert!(common::approx_eq(shift, -10.0, 0.5), "{name}: shift={shift}");
    }

    for (name, hue) in ANCHORS {
        let record = report.overlay(name).unwrap();
        assert_eq!(record.status, OverlayStatus::Ok);
        assert_eq!(record.provenance.sources, vec![Source::Measured]);
        assert!(!record.provenance.calibration_applied);

        let category = set.get(name).unwrap();
        let measured_points = category.points(Source::Measured);
        let measured = builder
            .build(&measured_points, Provenance::single(Source::Measured, 80))
            .unwrap();
        let crowd_points = category.points(Source::Crowd);
        let crowd = builder
            .build(&crowd_points, Provenance::single(Source::Crowd, 400))
            .unwrap();

        let overlay = record.polyhedron.as_ref().unwrap();
        assert_eq!(overlay.vertices, measured.polyhedron.vertices);
        assert_eq!(overlay.volume, measured.polyhedron.volume);
        assert_eq!(overlay.centroid, measured.polyhedron.centroid);
        assert!(
            crowd.polyhedron.volume > 8.0 * overlay.volume,
            "{name}: crowd={} overlay={}",
            crowd.polyhedron.volume,
            overlay.volume
        );
        let drift = hue_difference(overlay.centroid_hvc.hue, hue);
        assert!(drift.abs() < 1e-6, "{name}: drift={drift}");
    }
}

#[test]
fn single_source_consolidation_matches_standalone_hull() {
    let mut params = params();
    params.calibration.min_anchor_pairs = 5;
    let pipeline = OverlayPipeline::new(params).unwrap();
    let mut rng = rng(3);
    let center = HueValueChroma::new(75.0, 4.0, 9.0).unwrap();
    let measured = ellipsoid(&mut rng, center, [1.5, 1.0, 1.0], 120);
    let crowd = ellipsoid(&mut rng, center, [1.0, 1.5, 1.0], 120);
    let mut input = records("ochre", Source::Measured, &measured, 1.0);
    input.extend(records("khaki", Source::Crowd, &crowd, 3.0));

    let set = pipeline.aggregate(&input, &PassThrough);
    let report = pipeline.run_aggregated(&set);
    assert!(!report.calibration.is_calibrated());

    let builder = HullBuilder::new(pipeline.params().hull.clone());
    for (name, source) in [("ochre", Source::Measured), ("khaki", Source::Crowd)] {
        let points = set.get(name).unwrap().points(source);
        let standalone = builder
            .build(&points, Provenance::single(source, points.len()))
            .unwrap();
        let record = report.overlay(name).unwrap();
        let poly = record.polyhedron.as_ref().unwrap();
        assert_eq!(record.status, OverlayStatus::from(standalone.status));
        assert!(!record.provenance.calibration_applied);
        assert_eq!(poly.vertices, standalone.polyhedron.vertices);
        assert_eq!(poly.faces, standalone.polyhedron.faces);
        assert_eq!(poly.centroid, standalone.polyhedron.centroid);
        assert_eq!(poly.volume, standalone.polyhedron.volume);
        assert_eq!(poly.point_count, standalone.polyhedron.point_count);
    }
}

#[test]
fn exclusions_are_reported_not_dropped() {
    let pipeline = OverlayPipeline::new(params()).unwrap();
    let mut input = scenario();
    // too little weight for geometry
    input.extend(records(
        "puce",
        Source::Crowd,
        &[HueValueChroma::new(330.0, 4.0, 3.0).unwrap()],
        1.0,
    ));
    // enough weight but all on one plane
    let flat: Vec<HueValueChroma> = (0..12)
        .map(|i| HueValueChroma::new(i as f64 * 30.0, 5.0, 2.0).unwrap())
        .collect();
    input.extend(records("gray", Source::Crowd, &flat, 2.0));
    // conversion failure
    input.push(SampleRecord {
        name: "red".to_string(),
        source: Source::Crowd,
        coordinate: HvcTriple([20.0, 12.0, 5.0]),
        weight: 1.0,
    });

    let report = pipeline.run(&input, &PassThrough);
    assert_eq!(report.counters.out_of_gamut, 1);
    assert_eq!(report.summary.categories, 12);

    let puce = report.overlay("puce").unwrap();
    assert_eq!(puce.status, OverlayStatus::InsufficientSamples);
    assert!(puce.polyhedron.is_none());
    assert_eq!(puce.stats.count, 1);

    let gray = report.overlay("gray").unwrap();
    assert_eq!(gray.status, OverlayStatus::DegenerateGeometry);
    assert!(gray.polyhedron.is_none());
    assert!(gray.degeneracy.is_some());

    let red = report.overlay("red").unwrap();
    assert_eq!(red.stats.dropped, 1);
    assert!(red.polyhedron.is_some());

    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"degenerate_geometry\""));
    assert!(json.contains("\"insufficient_samples\""));
}
