//! Index scoring: three sub-indices and the aggregate urban-risk index.
//!
//! All weights are fixed heuristics, not a calibrated model.

use crate::domain::{clamp_index, round2, HeatIndex, PlasticAnalysis, SensorReading, SurfaceData};

const PDI_WEIGHT: f64 = 0.4;
const SAI_WEIGHT: f64 = 0.3;
const WDI_WEIGHT: f64 = 0.3;

/// Share of the fused risk taken from satellite-derived indices.
const SATELLITE_SHARE: f64 = 0.7;
const SENSOR_SHARE: f64 = 0.3;

/// Plastic Density Index. The detector already normalizes to 0-10.
pub fn plastic_density_index(analysis: &PlasticAnalysis) -> f64 {
    round2(analysis.density_score)
}

/// Surface Absorption Index: impervious cover raises it, green cover lowers it.
pub fn surface_absorption_index(surface: &SurfaceData) -> f64 {
    let raw = surface.impervious_surface_index * 7.0 + (1.0 - surface.green_cover_index) * 3.0;
    round2(clamp_index(raw))
}

/// Water Deficit Index from surface temperature over [20, 50] °C and
/// population density over [0, 10000] people/km².
pub fn water_deficit_index(surface: &SurfaceData, population_density: f64) -> f64 {
    let temp_factor = ((surface.surface_temp_c - 20.0) / 30.0).clamp(0.0, 1.0);
    let pop_factor = (population_density / 10_000.0).clamp(0.0, 1.0);
    round2(temp_factor * 6.0 + pop_factor * 4.0)
}

/// Ground-sensor heat component on the 0-10 scale.
pub fn sensor_temperature_score(reading: &SensorReading) -> f64 {
    clamp_index((reading.ambient_temp_c - 25.0) * 0.8)
}

/// Weighted blend of the sub-indices before any sensor fusion.
pub fn satellite_risk(pdi: f64, sai: f64, wdi: f64) -> f64 {
    pdi * PDI_WEIGHT + sai * SAI_WEIGHT + wdi * WDI_WEIGHT
}

/// Fuse the satellite risk with a sensor temperature score.
pub fn fuse_with_sensor(satellite_risk: f64, temp_score: f64) -> f64 {
    satellite_risk * SATELLITE_SHARE + temp_score * SENSOR_SHARE
}

/// Score a region. If `sensor` is supplied its temperature is fused in.
pub fn assess_risk(
    plastic: &PlasticAnalysis,
    surface: &SurfaceData,
    population_density: f64,
    sensor: Option<&SensorReading>,
) -> HeatIndex {
    let pdi = plastic_density_index(plastic);
    let sai = surface_absorption_index(surface);
    let wdi = water_deficit_index(surface, population_density);

    let base = satellite_risk(pdi, sai, wdi);
    let risk = match sensor {
        Some(reading) => {
            let temp_score = sensor_temperature_score(reading);
            log::debug!("Sensor fusion: base {base:.2}, temperature score {temp_score:.2}");
            fuse_with_sensor(base, temp_score)
        }
        None => base,
    };

    HeatIndex {
        plastic_density_index: pdi,
        surface_absorption_index: sai,
        water_deficit_index: wdi,
        urban_risk_index: round2(clamp_index(risk)),
    }
}
