//! Hypothetical cleanup scenario applied to a detection result.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::PlasticAnalysis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    Cleanup,
}

impl std::str::FromStr for SimulationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cleanup" => Ok(SimulationMode::Cleanup),
            _ => Err(format!("Unknown simulation mode: {s}")),
        }
    }
}

/// A requested scenario: the mode plus the retention factor, i.e. the
/// fraction of plastic left after the cleanup (1.0 = all, 0.0 = none).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Simulation {
    pub mode: SimulationMode,
    pub retention: f64,
}

impl Simulation {
    pub fn cleanup(retention: f64) -> Self {
        Self {
            mode: SimulationMode::Cleanup,
            retention,
        }
    }

    pub fn apply<R: Rng + ?Sized>(&self, analysis: PlasticAnalysis, rng: &mut R) -> PlasticAnalysis {
        match self.mode {
            SimulationMode::Cleanup => apply_cleanup(analysis, self.retention, rng),
        }
    }
}

/// Scale counts by `retention` and drop each detection with probability
/// `1 - retention`. `retention` is clamped to [0, 1].
pub fn apply_cleanup<R: Rng + ?Sized>(
    mut analysis: PlasticAnalysis,
    retention: f64,
    rng: &mut R,
) -> PlasticAnalysis {
    let retention = retention.clamp(0.0, 1.0);

    analysis.object_count = (analysis.object_count as f64 * retention) as usize;
    analysis.density_score *= retention;

    if retention < 1.0 {
        let before = analysis.detections.len();
        analysis
            .detections
            .retain(|_| rng.gen_bool(retention));
        log::debug!(
            "Cleanup simulation kept {}/{} detections (retention {retention:.2})",
            analysis.detections.len(),
            before
        );
    }

    analysis
}
