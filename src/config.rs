//! Configuration layer separating CLI arguments from the internal analysis configuration.
//!
//! - `GlobalArgs`: flags shared by every command
//! - `AnalyzeCommand`: arguments of `aquatherm analyze`
//! - `AnalyzeConfig`: validated internal configuration built with `from_args`

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::Verbosity;
use serde::Serialize;
use std::path::PathBuf;

use crate::cache_common;
use crate::detector::DetectorParams;
use crate::error::AnalyzeError;
use crate::simulation::{Simulation, SimulationMode};

pub const MODEL_PATH_ENV_VAR: &str = "AQUATHERM_MODEL_PATH";
/// Nano model, small enough for a demo deployment
pub const DEFAULT_MODEL_PATH: &str = "yolov8n.onnx";

/// Check that a probability-like flag lies in [0.0, 1.0].
pub fn validate_probability<T>(flag: &str, value: T) -> Result<T, AnalyzeError>
where
    T: Into<f64> + Copy + std::fmt::Display,
{
    if !(0.0..=1.0).contains(&value.into()) {
        return Err(AnalyzeError::bad_input(format!(
            "{flag} must be between 0.0 and 1.0, got {value}"
        )));
    }
    Ok(value)
}

/// Global CLI arguments that apply to all commands
#[derive(Parser, Debug, Clone)]
pub struct GlobalArgs {
    /// Verbosity level (-q/--quiet, -v/-vv/-vvv for info/debug/trace)
    #[command(flatten)]
    pub verbosity: Verbosity,

    /// Device to use for inference (auto, cpu)
    #[arg(long, default_value = "auto", global = true)]
    pub device: String,

    /// Disable colored output (also respects NO_COLOR and AQUATHERM_NO_COLOR env vars)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Attach execution and system metadata to the output
    #[arg(long, global = true)]
    pub metadata: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Flat v1 response consumed by the dashboard
    Legacy,
    /// Structured analysis report
    Report,
}

/// CLI command for a single analysis
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeCommand {
    /// Drone or satellite image to analyze. Omit together with --use-satellite
    /// to analyze the cached tile for --lat/--lng.
    #[arg(value_name = "IMAGE")]
    pub image: Option<PathBuf>,

    /// Latitude of the analyzed region
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the analyzed region
    #[arg(long, default_value = "0.0", allow_negative_numbers = true)]
    pub lng: f64,

    /// Population density (people/km²); randomized when omitted
    #[arg(long)]
    pub population_density: Option<f64>,

    /// Fetch the satellite tile for the region when no image is given
    #[arg(long)]
    pub use_satellite: bool,

    /// Scenario to simulate after detection ("cleanup")
    #[arg(long)]
    pub simulation_mode: Option<String>,

    /// Fraction of plastic remaining in the simulated scenario (1.0 = all, 0.0 = none)
    #[arg(long, default_value = "1.0")]
    pub simulation_factor: f64,

    /// Confidence threshold for detections (0.0-1.0)
    #[arg(short, long, default_value = "0.25")]
    pub confidence: f32,

    /// IoU threshold for non-maximum suppression (0.0-1.0)
    #[arg(long, default_value = "0.45")]
    pub iou_threshold: f32,

    /// Path to the ONNX detector model (overrides AQUATHERM_MODEL_PATH)
    #[arg(long)]
    pub model_path: Option<PathBuf>,

    /// Directory holding cached satellite tiles (overrides AQUATHERM_TILE_CACHE_DIR)
    #[arg(long)]
    pub tile_cache_dir: Option<PathBuf>,

    /// Response shape to print
    #[arg(long, value_enum, default_value = "legacy")]
    pub format: OutputFormat,

    /// Write the response to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seed for the stub generators and the simulation, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,
}

/// Internal configuration for one analysis run
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeConfig {
    pub device: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<PathBuf>,
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub population_density: Option<f64>,
    pub use_satellite: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulation: Option<Simulation>,
    pub detector: DetectorParams,
    pub model_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tile_cache_dir: Option<PathBuf>,
    pub format: OutputFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip)]
    pub include_metadata: bool,
}

impl AnalyzeConfig {
    /// Create configuration from global args and command-specific args.
    /// Every rejection here is bad input.
    pub fn from_args(global: GlobalArgs, cmd: AnalyzeCommand) -> Result<Self, AnalyzeError> {
        if cmd.image.is_none() && !cmd.use_satellite {
            return Err(AnalyzeError::bad_input(
                "Must provide file or enable use_satellite",
            ));
        }
        if !(-90.0..=90.0).contains(&cmd.lat) || !(-180.0..=180.0).contains(&cmd.lng) {
            return Err(AnalyzeError::bad_input(format!(
                "Coordinates out of range: lat {}, lng {}",
                cmd.lat, cmd.lng
            )));
        }
        if let Some(density) = cmd.population_density {
            if !density.is_finite() || density < 0.0 {
                return Err(AnalyzeError::bad_input(format!(
                    "Population density must be non-negative, got {density}"
                )));
            }
        }

        let confidence = validate_probability("--confidence", cmd.confidence)?;
        let iou_threshold = validate_probability("--iou-threshold", cmd.iou_threshold)?;
        let retention = validate_probability("--simulation-factor", cmd.simulation_factor)?;

        let simulation = match cmd.simulation_mode.as_deref() {
            None => None,
            Some(mode) => {
                let mode: SimulationMode = mode.parse().map_err(AnalyzeError::BadInput)?;
                Some(Simulation { mode, retention })
            }
        };

        let model_path = cmd.model_path.unwrap_or_else(|| {
            cache_common::path_with_env_override(MODEL_PATH_ENV_VAR, DEFAULT_MODEL_PATH)
        });

        Ok(Self {
            device: global.device,
            image: cmd.image,
            lat: cmd.lat,
            lng: cmd.lng,
            population_density: cmd.population_density,
            use_satellite: cmd.use_satellite,
            simulation,
            detector: DetectorParams {
                confidence_threshold: confidence,
                iou_threshold,
            },
            model_path,
            tile_cache_dir: cmd.tile_cache_dir,
            format: cmd.format,
            output: cmd.output,
            seed: cmd.seed,
            include_metadata: global.metadata,
        })
    }
}
