use crate::constants::MIN_MOMENT_MAGNITUDE;
use crate::control::environment::Environment;
use crate::control::guidance::{fold_to_line, normalize_angle};
use crate::errors::{ensure_finite, SimulationError};

const LIFT_MOMENT_SLOPE: f64 = 0.02; // per rad
const HIGH_ANGLE_OF_ATTACK: f64 = 0.5; // rad
const HIGH_ANGLE_LIFT_GAIN: f64 = 1.2;
const DRAG_MOMENT_QUADRATIC: f64 = 0.05; // per rad²
const WIND_FIN_COEFFICIENT: f64 = 0.3;
const WIND_BODY_COEFFICIENT: f64 = 0.1;
const FIN_LEAN_DRAG_SLOPE: f64 = 0.2; // per rad

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowState {
    pub dynamic_pressure: f64, // Pa, from the capped v²
    pub omega: f64,
    pub flight_angle: f64,
}

impl FlowState {
    // angle between body axis and velocity line, in [-π/2, π/2]
    pub fn angle_of_attack(&self) -> f64 {
        fold_to_line(normalize_angle(self.omega - self.flight_angle))
    }
}

// Aft of the CG a negative driving angle gives a negative moment; forward of
// it a non-negative one does.
pub fn signed_moment(
    magnitude: f64,
    application_point: f64,
    center_of_gravity: f64,
    driving_angle: f64,
) -> f64 {
    let magnitude = magnitude.abs().max(MIN_MOMENT_MAGNITUDE);
    let aft = application_point >= center_of_gravity;
    if (aft && driving_angle < 0.0) || (!aft && driving_angle >= 0.0) {
        -magnitude
    } else {
        magnitude
    }
}

pub fn lift_moment(
    flow: &FlowState,
    side_area: f64,
    aerodynamic_center: f64,
    center_of_gravity: f64,
) -> Result<f64, SimulationError> {
    let alpha = flow.angle_of_attack();
    let mut coefficient = LIFT_MOMENT_SLOPE * alpha.abs();
    if alpha.abs() > HIGH_ANGLE_OF_ATTACK {
        coefficient *= HIGH_ANGLE_LIFT_GAIN;
    }
    let lever = (aerodynamic_center - center_of_gravity).abs();
    let magnitude = ensure_finite(
        "lift moment",
        coefficient * flow.dynamic_pressure * side_area * lever,
    )?;
    Ok(signed_moment(magnitude, aerodynamic_center, center_of_gravity, -alpha))
}

pub fn drag_moment(
    flow: &FlowState,
    side_area: f64,
    center_of_pressure: f64,
    center_of_gravity: f64,
) -> Result<f64, SimulationError> {
    let alpha = flow.angle_of_attack();
    let coefficient = DRAG_MOMENT_QUADRATIC * alpha.powi(2);
    let lever = (center_of_pressure - center_of_gravity).abs();
    let magnitude = ensure_finite(
        "drag moment",
        coefficient * flow.dynamic_pressure * side_area * lever,
    )?;
    Ok(signed_moment(magnitude, center_of_pressure, center_of_gravity, -alpha))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindLoading {
    pub fin_area: f64,
    pub fin_center_of_pressure: f64,
    pub body_area: f64,
    pub body_center_of_pressure: f64,
    pub center_of_pressure: f64,
}

// fins and body take the crosswind separately, projected by cos(omega)
pub fn wind_moment(
    wind: f64,
    omega: f64,
    environment: &Environment,
    loading: &WindLoading,
    center_of_gravity: f64,
) -> Result<f64, SimulationError> {
    let wind_pressure = environment.dynamic_pressure(wind.powi(2));
    let fin_part = WIND_FIN_COEFFICIENT
        * wind_pressure
        * loading.fin_area
        * (loading.fin_center_of_pressure - center_of_gravity).abs();
    let body_part = WIND_BODY_COEFFICIENT
        * wind_pressure
        * loading.body_area
        * (loading.body_center_of_pressure - center_of_gravity).abs();
    let magnitude = ensure_finite("wind moment", (fin_part + body_part) * omega.cos().abs())?;
    Ok(signed_moment(
        magnitude,
        loading.center_of_pressure,
        center_of_gravity,
        -wind,
    ))
}

pub fn fin_moment(
    flow: &FlowState,
    fin_lean_area: f64,
    fin_center_of_pressure: f64,
    center_of_gravity: f64,
) -> Result<f64, SimulationError> {
    let alpha = flow.angle_of_attack();
    let projected_area = fin_lean_area * alpha.sin().abs();
    let coefficient = FIN_LEAN_DRAG_SLOPE * alpha.abs();
    let lever = (fin_center_of_pressure - center_of_gravity).abs();
    let magnitude = ensure_finite(
        "fin moment",
        flow.dynamic_pressure * projected_area * coefficient * lever,
    )?;
    Ok(signed_moment(
        magnitude,
        fin_center_of_pressure,
        center_of_gravity,
        -alpha,
    ))
}

pub fn thrust_moment(
    thrust: f64,
    cant_angle: f64,
    thrust_point: f64,
    center_of_gravity: f64,
) -> Result<f64, SimulationError> {
    let perpendicular = thrust * cant_angle.sin();
    let lever = (thrust_point - center_of_gravity).abs();
    let magnitude = ensure_finite("thrust moment", perpendicular * lever)?;
    Ok(signed_moment(magnitude, thrust_point, center_of_gravity, cant_angle))
}
