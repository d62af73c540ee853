//! Trust score for a detection result, with human-readable reasons.

use serde::{Deserialize, Serialize};

use crate::domain::{round2, PlasticAnalysis};

/// Baseline confidence for a Sentinel-2 sourced tile.
pub const BASE_SCORE: f64 = 0.85;

const CLEAN_REGION_BONUS: f64 = 0.05;
const SPARSE_PENALTY: f64 = 0.1;
const SPARSE_DETECTION_LIMIT: usize = 3;

pub const SOURCE_REASON: &str = "Source: Sentinel-2 L2A (Verified)";
pub const CLEAN_REGION_REASON: &str = "Clean region: High certainty of no pollution";
pub const SPARSE_REASON: &str = "Sparse detections: Potential false positives";
pub const WEATHER_REASON: &str = "Weather: Clear (< 10% Cloud Cover)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    /// `High` above 0.8, `Medium` above 0.5, otherwise `Low`.
    pub fn from_score(score: f64) -> Self {
        if score > 0.8 {
            ConfidenceLevel::High
        } else if score > 0.5 {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceResult {
    pub score: f64,
    pub reasons: Vec<String>,
    pub level: ConfidenceLevel,
}

pub fn evaluate(plastic: &PlasticAnalysis) -> ConfidenceResult {
    let mut reasons = vec![SOURCE_REASON.to_string()];

    let score = if plastic.detections.is_empty() {
        reasons.push(CLEAN_REGION_REASON.to_string());
        BASE_SCORE + CLEAN_REGION_BONUS
    } else {
        let total: f64 = plastic
            .detections
            .iter()
            .map(|d| d.confidence as f64)
            .sum();
        let avg_conf = total / plastic.detections.len() as f64;
        reasons.push(format!(
            "Object Detection Confidence: {}%",
            (avg_conf * 100.0) as i64
        ));

        let mut score = (BASE_SCORE + avg_conf) / 2.0;
        if plastic.detections.len() < SPARSE_DETECTION_LIMIT {
            reasons.push(SPARSE_REASON.to_string());
            score -= SPARSE_PENALTY;
        }
        score
    };

    reasons.push(WEATHER_REASON.to_string());

    // Level follows the reported (rounded) score, so a raw 0.803 is Medium
    let score = round2(score.clamp(0.0, 1.0));
    ConfidenceResult {
        score,
        level: ConfidenceLevel::from_score(score),
        reasons,
    }
}
