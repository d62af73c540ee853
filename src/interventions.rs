//! Rule-based intervention recommendations.
//!
//! Rules fire in declaration order and are not mutually exclusive.

use crate::domain::{ActionType, HeatIndex, Intervention, UrgencyLevel};

pub const CLEANUP_TITLE: &str = "Targeted Plastic Cleanup";
pub const MIST_COOLING_TITLE: &str = "Mist Cooling Deployment";
pub const DRAINAGE_TITLE: &str = "Drainage Inspection";

const CLEANUP_PDI_THRESHOLD: f64 = 6.0;
const CLEANUP_CRITICAL_PDI: f64 = 8.0;
const COOLING_SAI_THRESHOLD: f64 = 7.0;
const COOLING_WDI_THRESHOLD: f64 = 5.0;
const DRAINAGE_RISK_THRESHOLD: f64 = 4.0;
const DRAINAGE_PDI_THRESHOLD: f64 = 3.0;

pub fn recommend_interventions(index: &HeatIndex) -> Vec<Intervention> {
    let mut interventions = Vec::new();
    let pdi = index.plastic_density_index;

    if pdi > CLEANUP_PDI_THRESHOLD {
        interventions.push(Intervention {
            title: CLEANUP_TITLE.to_string(),
            description: "High accumulation of plastic detected causing heat retention."
                .to_string(),
            urgency: if pdi > CLEANUP_CRITICAL_PDI {
                UrgencyLevel::Critical
            } else {
                UrgencyLevel::High
            },
            action_type: ActionType::Cleanup,
            estimated_impact: "Reduces local surface temp by ~0.5-1.0°C".to_string(),
        });
    }

    if index.surface_absorption_index > COOLING_SAI_THRESHOLD
        && index.water_deficit_index > COOLING_WDI_THRESHOLD
    {
        interventions.push(Intervention {
            title: MIST_COOLING_TITLE.to_string(),
            description: "Area has high surface absorption and heat stress.".to_string(),
            urgency: UrgencyLevel::High,
            action_type: ActionType::Cooling,
            estimated_impact: "Instant ambient temp drop of 3-5°C".to_string(),
        });
    }

    if index.urban_risk_index > DRAINAGE_RISK_THRESHOLD && pdi > DRAINAGE_PDI_THRESHOLD {
        interventions.push(Intervention {
            title: DRAINAGE_TITLE.to_string(),
            description: "Plastic waste may be clogging nearby drainage.".to_string(),
            urgency: UrgencyLevel::Moderate,
            action_type: ActionType::Drainage,
            estimated_impact: "Prevents waterlogging and vector-borne diseases".to_string(),
        });
    }

    log::debug!("{} intervention(s) recommended", interventions.len());
    interventions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(pdi: f64, sai: f64, wdi: f64, risk: f64) -> HeatIndex {
        HeatIndex {
            plastic_density_index: pdi,
            surface_absorption_index: sai,
            water_deficit_index: wdi,
            urban_risk_index: risk,
        }
    }

    #[test]
    fn test_cleanup_critical_above_eight() {
        let result = recommend_interventions(&index(8.5, 0.0, 0.0, 0.0));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, CLEANUP_TITLE);
        assert_eq!(result[0].urgency, UrgencyLevel::Critical);
        assert_eq!(result[0].action_type, ActionType::Cleanup);
    }

    #[test]
    fn test_cleanup_high_between_six_and_eight() {
        let result = recommend_interventions(&index(6.5, 0.0, 0.0, 0.0));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].urgency, UrgencyLevel::High);
    }

    #[test]
    fn test_cleanup_threshold_is_strict() {
        let result = recommend_interventions(&index(6.0, 0.0, 0.0, 0.0));
        assert!(result.iter().all(|i| i.title != CLEANUP_TITLE));
        assert!(result.is_empty());

        // exactly 8.0 stays high
        let result = recommend_interventions(&index(8.0, 0.0, 0.0, 0.0));
        assert_eq!(result[0].urgency, UrgencyLevel::High);
    }

    #[test]
    fn test_mist_cooling_requires_both_conditions() {
        assert!(recommend_interventions(&index(0.0, 7.5, 4.0, 0.0)).is_empty());
        assert!(recommend_interventions(&index(0.0, 7.0, 6.0, 0.0)).is_empty());

        let result = recommend_interventions(&index(0.0, 7.5, 5.5, 0.0));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, MIST_COOLING_TITLE);
        assert_eq!(result[0].urgency, UrgencyLevel::High);
    }

    #[test]
    fn test_drainage_rule() {
        let result = recommend_interventions(&index(3.5, 0.0, 0.0, 4.5));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, DRAINAGE_TITLE);
        assert_eq!(result[0].urgency, UrgencyLevel::Moderate);
        assert_eq!(result[0].action_type, ActionType::Drainage);

        assert!(recommend_interventions(&index(3.0, 0.0, 0.0, 4.5)).is_empty());
        assert!(recommend_interventions(&index(3.5, 0.0, 0.0, 4.0)).is_empty());
    }

    #[test]
    fn test_all_rules_fire_in_declaration_order() {
        let result = recommend_interventions(&index(9.0, 8.0, 6.0, 7.0));
        let titles: Vec<&str> = result.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec![CLEANUP_TITLE, MIST_COOLING_TITLE, DRAINAGE_TITLE]);
    }
}
