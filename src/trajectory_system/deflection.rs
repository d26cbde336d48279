use tracing::debug;

use crate::constants::{FIN_DEFLECTION_CEILING_MM, FIN_DRAG_COEFFICIENT};
use crate::control::environment::Environment;
use crate::control::rocket::RocketGeometry;
use crate::errors::{ensure_finite, SimulationError};

const MIN_SECOND_MOMENT: f64 = 1e-12; // m⁴

pub fn try_fin_deflection_mm(
    geometry: &RocketGeometry,
    speed: f64,
    environment: &Environment,
) -> Result<f64, SimulationError> {
    let span = geometry.fin_height;
    if span <= 0.0 || geometry.fin_root_chord <= 0.0 {
        return Err(SimulationError::PhysicsError(
            "fin has no span or root chord".to_string(),
        ));
    }

    let single_fin_area = (geometry.fin_root_chord + geometry.fin_tip_chord) / 2.0 * span;
    let dynamic_pressure = environment.dynamic_pressure(speed.powi(2));
    let load = dynamic_pressure * FIN_DRAG_COEFFICIENT * single_fin_area;
    let load_per_length = load / span;

    let second_moment = (geometry.fin_root_chord * geometry.fin_thickness.powi(3) / 12.0)
        .max(MIN_SECOND_MOMENT);
    let youngs_modulus = geometry.fin_material.youngs_modulus();

    // (1 - t³) / (3(1 - t)) expanded, so t = 1 and t > 1 stay regular
    let taper = geometry.taper_ratio();
    let taper_factor = (1.0 + taper + taper.powi(2)) / 3.0;

    let deflection = load_per_length * span.powi(4) * geometry.sweep_angle().cos()
        / (8.0 * youngs_modulus * second_moment)
        * taper_factor;

    ensure_finite("fin deflection", deflection * 1000.0)
}

// mm, capped at the display ceiling; any failure reports the ceiling
pub fn fin_deflection_mm(geometry: &RocketGeometry, speed: f64, environment: &Environment) -> f64 {
    match try_fin_deflection_mm(geometry, speed, environment) {
        Ok(deflection) => deflection.abs().min(FIN_DEFLECTION_CEILING_MM),
        Err(err) => {
            debug!("fin deflection fallback: {}", err);
            FIN_DEFLECTION_CEILING_MM
        }
    }
}
