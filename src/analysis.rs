//! `aquatherm analyze`: wires the configured collaborators into the pipeline
//! and renders the response.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::io::Write;
use std::time::Instant;

use crate::color_utils::symbols;
use crate::config::{AnalyzeConfig, OutputFormat};
use crate::detector::{ObjectDetector, YoloDetector};
use crate::domain::Region;
use crate::error::AnalyzeError;
use crate::image_input::load_uploaded_image;
use crate::image_source::{ImageSource, TileCache};
use crate::onnx_session::determine_optimal_device;
use crate::output_manager::OutputManager;
use crate::pipeline::{AnalysisRequest, UrbanHeatPipeline};
use crate::report::AnalysisReport;
use crate::response::v1::LegacyResponse;
use crate::shared_metadata::{
    collect_aquatherm_env_vars, ExecutionContext, RunMetadata, RunSummary, SystemInfo,
};
use crate::stubs;

/// What gets printed for a successful run.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Response {
    Legacy(Box<LegacyResponse>),
    Report(Box<AnalysisReport>),
}

impl Response {
    pub fn render(format: OutputFormat, report: AnalysisReport, source: &impl ImageSource) -> Self {
        match format {
            OutputFormat::Legacy => {
                let metadata = source.metadata(&report.region);
                Response::Legacy(Box::new(LegacyResponse::from_report(&report, metadata)))
            }
            OutputFormat::Report => Response::Report(Box::new(report)),
        }
    }
}

fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => {
            log::debug!("Seeding stub generators with {seed}");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    }
}

/// Build the request for `config`, decoding the upload if one was given.
pub fn build_request<R: rand::Rng + ?Sized>(
    config: &AnalyzeConfig,
    rng: &mut R,
) -> Result<AnalysisRequest, AnalyzeError> {
    let image = match &config.image {
        Some(path) => Some(load_uploaded_image(path)?),
        None if config.use_satellite => None,
        None => {
            return Err(AnalyzeError::bad_input(
                "Must provide file or enable use_satellite",
            ))
        }
    };

    let population_density = config
        .population_density
        .unwrap_or_else(|| stubs::population_density(rng));
    let region = Region::new(config.lat, config.lng).with_population_density(population_density);

    Ok(AnalysisRequest {
        image,
        region: Some(region),
        simulation: config.simulation,
    })
}

/// Run a validated request with already constructed collaborators and write the response.
pub fn analyze_with<D: ObjectDetector, S: ImageSource, R: rand::Rng + ?Sized, W: Write>(
    pipeline: &UrbanHeatPipeline<D, S>,
    request: AnalysisRequest,
    rng: &mut R,
    format: OutputFormat,
    output: &OutputManager,
    stdout: &mut W,
) -> Result<AnalysisReport, AnalyzeError> {
    let report = pipeline.run(request, rng)?;

    let response = Response::render(format, report.clone(), pipeline.image_source());
    output.write_json(&response, stdout)?;
    Ok(report)
}

/// Load the detector, run the analysis described by `config` and print the result.
pub fn run_analysis<W: Write>(config: AnalyzeConfig, stdout: &mut W) -> Result<(), AnalyzeError> {
    let start = Instant::now();
    let start_timestamp = Utc::now();

    log::info!(
        "{}Analyzing {} | lat {} lng {} | device {}",
        symbols::analysis_start(),
        config
            .image
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "satellite tile".to_string()),
        config.lat,
        config.lng,
        config.device
    );

    // The upload is checked before the model is touched
    let mut rng = rng_for(config.seed);
    let request = build_request(&config, &mut rng)?;

    let device = determine_optimal_device(&config.device);
    log::debug!("Device: {} ({})", device.device, device.reason);

    let load_start = Instant::now();
    let detector = YoloDetector::load(&config.model_path, &device.device, config.detector)?;
    let model_load_time_ms = load_start.elapsed().as_secs_f64() * 1000.0;

    let tiles = match &config.tile_cache_dir {
        Some(dir) => TileCache::new(dir),
        None => TileCache::from_env(),
    };
    let pipeline = UrbanHeatPipeline::new(detector, tiles);

    let output = OutputManager::new(
        config.output.as_deref(),
        config.image.as_deref(),
        config.lat,
        config.lng,
    );
    let report = analyze_with(&pipeline, request, &mut rng, config.format, &output, stdout)?;

    log::info!(
        "{}Analysis finished in {:.1}ms",
        symbols::completed_successfully(),
        start.elapsed().as_secs_f64() * 1000.0
    );

    if config.include_metadata {
        let model_info = pipeline.detector().model_info();
        let metadata = RunMetadata {
            execution: Some(ExecutionContext {
                timestamp: Some(start_timestamp),
                aquatherm_version: Some(env!("CARGO_PKG_VERSION").to_string()),
                command_line: Some(std::env::args().collect()),
                exit_code: Some(0),
                total_processing_time_ms: Some(start.elapsed().as_secs_f64() * 1000.0),
                aquatherm_env_vars: collect_aquatherm_env_vars(),
            }),
            system: Some(SystemInfo {
                device_requested: Some(config.device.clone()),
                device_selected: Some(device.device.clone()),
                device_selection_reason: Some(device.reason.clone()),
                model_path: Some(model_info.model_path.clone()),
                model_size_bytes: Some(model_info.model_size_bytes),
                model_checksum: Some(model_info.model_checksum.clone()),
                model_load_time_ms: Some(model_load_time_ms),
            }),
            config: Some(toml::Value::try_from(&config).map_err(anyhow::Error::from)?),
            summary: Some(summarize(&report, config.image.is_some())),
        };
        output.save_metadata(&metadata)?;
    }

    Ok(())
}

pub fn summarize(report: &AnalysisReport, uploaded: bool) -> RunSummary {
    RunSummary {
        object_count: report.plastic.object_count,
        urban_risk_index: report.heat_index.urban_risk_index,
        intervention_count: report.interventions.len(),
        confidence_score: report.confidence.score,
        image_source: if uploaded { "upload" } else { "satellite" }.to_string(),
    }
}
