//! Value types flowing through the analysis pipeline.
//!
//! Everything here is created per request and never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detection_obj::DetectedObject;

/// Upper bound of every 0-10 index.
pub const INDEX_MAX: f64 = 10.0;

/// Round to `decimals` places, exact halves to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

pub fn round2(value: f64) -> f64 {
    round_to(value, 2)
}

pub fn clamp_index(value: f64) -> f64 {
    value.clamp(0.0, INDEX_MAX)
}

/// Geographic context of a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub lat: f64,
    pub lng: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    /// Tile footprint in km²
    pub area_km2: f64,
    /// People per km²
    pub population_density: f64,
}

impl Region {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            name: None,
            area_km2: 1.0,
            population_density: 0.0,
        }
    }

    pub fn with_population_density(mut self, population_density: f64) -> Self {
        self.population_density = population_density;
        self
    }
}

/// Detector output for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlasticAnalysis {
    pub object_count: usize,
    /// Per-area heuristic in [0, 10]
    pub density_score: f64,
    #[serde(default)]
    pub detections: Vec<DetectedObject>,
}

impl PlasticAnalysis {
    /// Build an analysis from raw detections over an image of the given size.
    pub fn from_detections(detections: Vec<DetectedObject>, width: u32, height: u32) -> Self {
        let object_count = detections.len();
        Self {
            object_count,
            density_score: density_score(object_count, width, height),
            detections,
        }
    }
}

/// `min(count * 10000 / (w*h), 10)`, rounded to 2 decimals. Uncalibrated.
pub fn density_score(object_count: usize, width: u32, height: u32) -> f64 {
    let pixels = width as f64 * height as f64;
    if pixels <= 0.0 {
        return 0.0;
    }
    let density = (object_count as f64 * 10_000.0 / pixels).min(INDEX_MAX);
    round2(density)
}

/// Remote-sensing proxies for a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceData {
    pub surface_temp_c: f64,
    /// NDVI proxy in [0, 1]
    pub green_cover_index: f64,
    /// Concrete/asphalt coverage in [0, 1]
    pub impervious_surface_index: f64,
}

/// Aggregated ground-sensor readings for a region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub device_count: u32,
    pub ambient_temp_c: f64,
    pub humidity_percent: f64,
    pub pm25_level: f64,
    pub is_calibrated: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatIndex {
    pub plastic_density_index: f64,
    pub surface_absorption_index: f64,
    pub water_deficit_index: f64,
    pub urban_risk_index: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Low,
    Moderate,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Cleanup,
    Cooling,
    Drainage,
    Policy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    pub title: String,
    pub description: String,
    pub urgency: UrgencyLevel,
    pub action_type: ActionType,
    /// e.g. "Reduces local temp by 2C"
    pub estimated_impact: String,
}
