//! Response shapes served to clients, kept apart from the core report.

/// The original flat response consumed by the dashboard frontend.
pub mod v1 {
    use serde::{Deserialize, Serialize};

    use crate::confidence::ConfidenceResult;
    use crate::domain::SensorReading;
    use crate::image_source::SatelliteMetadata;
    use crate::report::AnalysisReport;

    pub const NO_ACTION: &str = "No immediate action required";

    /// Reported in place of a measured surface temperature.
    pub const PLACEHOLDER_SURFACE_TEMP_C: f64 = 35.0;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Location {
        pub lat: f64,
        pub lng: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PlasticSummary {
        pub count: usize,
        pub density_score: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct EnvironmentalData {
        pub surface_temp_c: f64,
        pub population_density: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Indices {
        pub pdi: f64,
        pub sai: f64,
        pub wdi: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct LegacyResponse {
        pub location: Location,
        pub plastic_analysis: PlasticSummary,
        pub environmental_data: EnvironmentalData,
        pub indices: Indices,
        pub heat_score: f64,
        pub intervention_suggestion: String,
        pub confidence: ConfidenceResult,
        pub sentinel_metadata: SatelliteMetadata,
        /// Serialized as `null` when absent
        pub sensor_readings: Option<SensorReading>,
    }

    impl LegacyResponse {
        pub fn from_report(report: &AnalysisReport, metadata: SatelliteMetadata) -> Self {
            Self {
                location: Location {
                    lat: report.region.lat,
                    lng: report.region.lng,
                },
                plastic_analysis: PlasticSummary {
                    count: report.plastic.object_count,
                    density_score: report.plastic.density_score,
                },
                environmental_data: EnvironmentalData {
                    surface_temp_c: PLACEHOLDER_SURFACE_TEMP_C,
                    population_density: report.region.population_density.round_ties_even(),
                },
                indices: Indices {
                    pdi: report.heat_index.plastic_density_index,
                    sai: report.heat_index.surface_absorption_index,
                    wdi: report.heat_index.water_deficit_index,
                },
                heat_score: report.heat_index.urban_risk_index,
                intervention_suggestion: report
                    .top_intervention()
                    .map(|i| i.title.clone())
                    .unwrap_or_else(|| NO_ACTION.to_string()),
                confidence: report.confidence.clone(),
                sentinel_metadata: metadata,
                sensor_readings: report.sensor_readings.clone(),
            }
        }
    }
}
