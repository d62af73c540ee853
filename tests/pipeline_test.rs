use anyhow::Result;
use image::{DynamicImage, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;

use aquatherm::confidence::ConfidenceLevel;
use aquatherm::detection_obj::DetectedObject;
use aquatherm::detector::ObjectDetector;
use aquatherm::domain::{Region, UrgencyLevel};
use aquatherm::error::AnalyzeError;
use aquatherm::image_source::{SatelliteMetadata, TileCache};
use aquatherm::interventions::{CLEANUP_TITLE, DRAINAGE_TITLE};
use aquatherm::pipeline::{AnalysisRequest, UrbanHeatPipeline};
use aquatherm::response::v1::{LegacyResponse, PLACEHOLDER_SURFACE_TEMP_C};
use aquatherm::simulation::Simulation;

/// Returns `count` high-confidence bottles for any image.
struct BottleDetector {
    count: usize,
}

impl ObjectDetector for BottleDetector {
    fn detect(&self, _image: &DynamicImage) -> Result<Vec<DetectedObject>> {
        Ok((0..self.count)
            .map(|i| {
                let x = i as f32 * 10.0;
                DetectedObject::new("bottle", 0.9, [x, 0.0, x + 8.0, 8.0])
            })
            .collect())
    }
}

fn upload(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
}

fn empty_cache() -> (tempfile::TempDir, TileCache) {
    let dir = tempfile::tempdir().unwrap();
    let cache = TileCache::new(dir.path());
    (dir, cache)
}

#[test]
fn test_heavily_polluted_upload_recommends_cleanup_first() {
    let (_dir, cache) = empty_cache();
    let pipeline = UrbanHeatPipeline::new(BottleDetector { count: 9 }, cache);
    let mut rng = StdRng::seed_from_u64(11);

    let report = pipeline
        .run(
            AnalysisRequest {
                image: Some(upload(100, 100)),
                region: Some(Region::new(19.07, 72.87).with_population_density(3000.0)),
                simulation: None,
            },
            &mut rng,
        )
        .unwrap();

    assert_eq!(report.plastic.object_count, 9);
    assert_eq!(report.heat_index.plastic_density_index, 9.0);

    let top = report.top_intervention().unwrap();
    assert_eq!(top.title, CLEANUP_TITLE);
    assert_eq!(top.urgency, UrgencyLevel::Critical);
    // Any plausible surface and tropical sensor reading pushes risk over 4
    assert!(report
        .interventions
        .iter()
        .any(|i| i.title == DRAINAGE_TITLE));
    assert!(report.heat_index.urban_risk_index > 4.0);
    assert!(report.heat_index.urban_risk_index <= 10.0);
}

#[test]
fn test_satellite_placeholder_is_a_clean_region() {
    let (_dir, cache) = empty_cache();
    let pipeline = UrbanHeatPipeline::new(BottleDetector { count: 0 }, cache);
    let mut rng = StdRng::seed_from_u64(5);

    let report = pipeline
        .run(
            AnalysisRequest {
                image: None,
                region: Some(Region::new(48.85, 2.35)),
                simulation: None,
            },
            &mut rng,
        )
        .unwrap();

    assert_eq!(report.plastic.object_count, 0);
    assert_eq!(report.plastic.density_score, 0.0);
    assert_eq!(report.confidence.score, 0.9);
    assert_eq!(report.confidence.level, ConfidenceLevel::High);
    assert!(report
        .interventions
        .iter()
        .all(|i| i.title != CLEANUP_TITLE && i.title != DRAINAGE_TITLE));
}

#[test]
fn test_full_cleanup_removes_all_plastic() {
    let (_dir, cache) = empty_cache();
    let pipeline = UrbanHeatPipeline::new(BottleDetector { count: 7 }, cache);
    let mut rng = StdRng::seed_from_u64(1);

    let report = pipeline
        .run(
            AnalysisRequest {
                image: Some(upload(100, 100)),
                region: Some(Region::new(19.07, 72.87)),
                simulation: Some(Simulation::cleanup(0.0)),
            },
            &mut rng,
        )
        .unwrap();

    assert_eq!(report.plastic.object_count, 0);
    assert_eq!(report.plastic.density_score, 0.0);
    assert!(report.plastic.detections.is_empty());
    assert_eq!(report.heat_index.plastic_density_index, 0.0);
    assert!(report
        .interventions
        .iter()
        .all(|i| i.title != CLEANUP_TITLE));
}

#[test]
fn test_partial_cleanup_lowers_density() {
    let (_dir, cache) = empty_cache();
    let pipeline = UrbanHeatPipeline::new(BottleDetector { count: 8 }, cache);
    let request = |simulation| AnalysisRequest {
        image: Some(upload(100, 100)),
        region: Some(Region::new(19.07, 72.87)),
        simulation,
    };

    let baseline = pipeline
        .run(request(None), &mut StdRng::seed_from_u64(2))
        .unwrap();
    let cleaned = pipeline
        .run(request(Some(Simulation::cleanup(0.5))), &mut StdRng::seed_from_u64(2))
        .unwrap();

    assert_eq!(baseline.plastic.object_count, 8);
    assert_eq!(cleaned.plastic.object_count, 4);
    assert_eq!(cleaned.plastic.density_score, 4.0);
    assert!(cleaned.plastic.detections.len() <= 8);
}

#[test]
fn test_same_seed_reproduces_scores() {
    let (_dir, cache) = empty_cache();
    let pipeline = UrbanHeatPipeline::new(BottleDetector { count: 3 }, cache);
    let request = || AnalysisRequest {
        image: Some(upload(200, 200)),
        region: Some(Region::new(30.0, 31.2).with_population_density(1200.0)),
        simulation: None,
    };

    let first = pipeline.run(request(), &mut StdRng::seed_from_u64(99)).unwrap();
    let second = pipeline.run(request(), &mut StdRng::seed_from_u64(99)).unwrap();

    assert_eq!(first.surface, second.surface);
    assert_eq!(first.heat_index, second.heat_index);
    assert_eq!(first.interventions, second.interventions);
    let (a, b) = (
        first.sensor_readings.unwrap(),
        second.sensor_readings.unwrap(),
    );
    assert_eq!(a.ambient_temp_c, b.ambient_temp_c);
    assert_eq!(a.device_count, b.device_count);
}

#[test]
fn test_missing_image_and_region_is_bad_input() {
    let (_dir, cache) = empty_cache();
    let pipeline = UrbanHeatPipeline::new(BottleDetector { count: 1 }, cache);

    let err = pipeline
        .run(AnalysisRequest::default(), &mut StdRng::seed_from_u64(0))
        .unwrap_err();

    assert!(matches!(err, AnalyzeError::BadInput(_)));
    assert_eq!(err.status(), 400);
}

#[test]
fn test_legacy_response_shape() {
    let (_dir, cache) = empty_cache();
    let pipeline = UrbanHeatPipeline::new(BottleDetector { count: 9 }, cache);
    let region = Region::new(19.07, 72.87).with_population_density(2345.6);

    let report = pipeline
        .run(
            AnalysisRequest {
                image: Some(upload(100, 100)),
                region: Some(region.clone()),
                simulation: None,
            },
            &mut StdRng::seed_from_u64(8),
        )
        .unwrap();
    let metadata: SatelliteMetadata = pipeline.satellite_metadata(&region);
    let response = LegacyResponse::from_report(&report, metadata);

    assert_eq!(response.intervention_suggestion, CLEANUP_TITLE);
    assert_eq!(response.heat_score, report.heat_index.urban_risk_index);
    assert_eq!(response.environmental_data.population_density, 2346.0);
    assert_eq!(
        response.environmental_data.surface_temp_c,
        PLACEHOLDER_SURFACE_TEMP_C
    );

    let json = serde_json::to_value(&response).unwrap();
    for key in [
        "location",
        "plastic_analysis",
        "environmental_data",
        "indices",
        "heat_score",
        "intervention_suggestion",
        "confidence",
        "sentinel_metadata",
        "sensor_readings",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert_eq!(json["plastic_analysis"]["count"], 9);
    assert_eq!(json["indices"]["pdi"], 9.0);
    assert_eq!(json["sentinel_metadata"]["provider"], "Copernicus Sentinel-2");
}
