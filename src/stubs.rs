//! Randomized stand-ins for surface data, ground sensors and census figures.
//!
//! Callers pass the random source so runs can be made reproducible.

use chrono::Utc;
use rand::Rng;

use crate::domain::{round_to, Region, SensorReading, SurfaceData};

/// Regions south of this latitude get a hotter sensor baseline.
const TROPICAL_LATITUDE: f64 = 25.0;
const TROPICAL_BASE_TEMP_C: f64 = 32.0;
const TEMPERATE_BASE_TEMP_C: f64 = 25.0;

pub fn surface_data<R: Rng + ?Sized>(_region: &Region, rng: &mut R) -> SurfaceData {
    SurfaceData {
        surface_temp_c: rng.gen_range(25.0..=45.0),
        green_cover_index: rng.gen_range(0.1..=0.6),
        impervious_surface_index: rng.gen_range(0.4..=0.9),
    }
}

/// Simulated aggregate over a network of ground sensors in `region`.
pub fn sensor_readings<R: Rng + ?Sized>(region: &Region, rng: &mut R) -> SensorReading {
    let base_temp = if region.lat < TROPICAL_LATITUDE {
        TROPICAL_BASE_TEMP_C
    } else {
        TEMPERATE_BASE_TEMP_C
    };

    let variance: f64 = rng.gen_range(-2.0..=4.0);
    let humidity: f64 = rng.gen_range(60.0..=85.0);
    let pm25: f64 = rng.gen_range(45.0..=150.0);

    SensorReading {
        device_count: rng.gen_range(5..=20),
        ambient_temp_c: round_to(base_temp + variance, 1),
        humidity_percent: round_to(humidity, 1),
        pm25_level: round_to(pm25, 1),
        is_calibrated: true,
        timestamp: Utc::now(),
    }
}

/// People per km² for a region without census data.
pub fn population_density<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(500.0..=5000.0)
}
