use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceResult;
use crate::domain::{HeatIndex, Intervention, PlasticAnalysis, Region, SensorReading, SurfaceData};

/// Everything computed for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub region: Region,
    pub plastic: PlasticAnalysis,
    pub surface: SurfaceData,
    pub heat_index: HeatIndex,
    pub interventions: Vec<Intervention>,
    pub confidence: ConfidenceResult,
    pub sensor_readings: Option<SensorReading>,
}

impl AnalysisReport {
    /// Highest-priority recommendation, i.e. the first rule that fired.
    pub fn top_intervention(&self) -> Option<&Intervention> {
        self.interventions.first()
    }
}
