use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::constants::{
    ANGLE_WINDOW_CAPACITY, DEFAULT_ANGULAR_RESPONSE_INTERVAL, DEFAULT_ENHANCED_ATTITUDE_CONTROL,
    DEFAULT_FIN_LEAN_MOMENT, DEFAULT_RAIL_LENGTH, DEFAULT_WIND_ANGLE_LIMITATION,
    GROUND_GRACE_TIME, MAX_SIMULATION_TIME, MAX_WINDOW_ANGLE_CHANGE_DEG, MIN_STABLE_STATIC_MARGIN,
    TIME_STEP,
};
use crate::control::environment::{Environment, WindProfile};
use crate::control::flight_phase::{FlightPhase, PhaseSchedule};
use crate::control::guidance::AttitudeGuidance;
use crate::control::rocket::{RocketGeometry, RocketParameters};
use crate::errors::SimulationError;
use crate::telemetry_system::telemetry::{FlightResult, FlightSample, Telemetry};

use super::aerodynamics::AerodynamicProfile;
use super::kinematics::{FlightModel, SimulationState};

const MIN_DEGRADED_MASS: f64 = 0.001; // kg

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub enhanced_attitude_control: bool,
    pub wind_angle_limitation: bool,
    pub fin_lean_moment: bool,
    pub rail_length: f64, // m
    pub angular_response_interval: f64, // s between coarse attitude updates
    pub thrust_cant: f64, // degrees
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            enhanced_attitude_control: DEFAULT_ENHANCED_ATTITUDE_CONTROL,
            wind_angle_limitation: DEFAULT_WIND_ANGLE_LIMITATION,
            fin_lean_moment: DEFAULT_FIN_LEAN_MOMENT,
            rail_length: DEFAULT_RAIL_LENGTH,
            angular_response_interval: DEFAULT_ANGULAR_RESPONSE_INTERVAL,
            thrust_cant: 0.0,
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config: SimulationConfig = serde_json::from_str(json)
            .map_err(|err| SimulationError::invalid("config", err.to_string()))?;
        config.validate()
    }

    pub fn validate(self) -> Result<Self, SimulationError> {
        if !(self.rail_length.is_finite() && self.rail_length >= 0.0) {
            return Err(SimulationError::invalid(
                "railLength",
                format!("must be a non-negative number, got {}", self.rail_length),
            ));
        }
        if !(self.angular_response_interval.is_finite() && self.angular_response_interval > 0.0) {
            return Err(SimulationError::invalid(
                "angularResponseInterval",
                format!("must be positive, got {}", self.angular_response_interval),
            ));
        }
        if !self.thrust_cant.is_finite() {
            return Err(SimulationError::invalid("thrustCant", "must be finite"));
        }
        Ok(self)
    }

    pub fn steps_per_update(&self) -> u32 {
        let steps = (self.angular_response_interval / TIME_STEP).round();
        if steps.is_finite() {
            steps.clamp(1.0, ANGLE_WINDOW_CAPACITY as f64) as u32
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LaunchConditions {
    pub launch_angle: f64, // degrees from vertical
    pub wind_speed: f64, // m/s at the reference height
    pub wind_profile: WindProfile,
}

impl LaunchConditions {
    pub fn new(launch_angle: f64, wind_speed: f64, wind_profile: WindProfile) -> Self {
        LaunchConditions {
            launch_angle,
            wind_speed,
            wind_profile,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightSimulator {
    model: FlightModel,
}

impl FlightSimulator {
    pub fn new(
        params: &RocketParameters,
        conditions: LaunchConditions,
        config: SimulationConfig,
    ) -> Self {
        let config = config.validate().unwrap_or_else(|err| {
            warn!("falling back to default simulation config: {}", err);
            SimulationConfig::default()
        });
        let geometry = RocketGeometry::from_parameters(params).unwrap_or_else(|err| {
            warn!("simulating with degraded geometry: {}", err);
            degraded_geometry(params)
        });
        let profile = AerodynamicProfile::from_parameters(params);

        FlightSimulator {
            model: FlightModel {
                geometry,
                profile,
                motor: params.motor,
                parachute_area: params.parachute.area(),
                environment: Environment::new(
                    finite_or_zero(conditions.wind_speed),
                    conditions.wind_profile,
                ),
                schedule: PhaseSchedule::new(&params.motor, config.rail_length),
                guidance: AttitudeGuidance::new(
                    config.enhanced_attitude_control,
                    config.wind_angle_limitation,
                ),
                launch_angle: finite_or_zero(conditions.launch_angle).to_radians(),
                thrust_cant: config.thrust_cant.to_radians(),
                fin_lean_moment: config.fin_lean_moment,
                steps_per_update: config.steps_per_update(),
            },
        }
    }

    pub fn model(&self) -> &FlightModel {
        &self.model
    }

    pub fn run(&self) -> FlightResult {
        let model = &self.model;
        info!(
            "simulating {} launch at {:.1}° with {:.1} m/s wind ({})",
            model.motor,
            model.launch_angle.to_degrees(),
            model.environment.base_wind,
            model.environment.wind_profile
        );

        let mut state =
            SimulationState::at_launch(model.launch_angle, model.steps_per_update as usize);
        let mut telemetry = Telemetry::new();
        let mut last_phase: Option<FlightPhase> = None;
        let max_window_change = MAX_WINDOW_ANGLE_CHANGE_DEG.to_radians();

        while (state.position.y >= 0.0 || state.time < GROUND_GRACE_TIME)
            && state.time < MAX_SIMULATION_TIME
        {
            let step_time = state.time;
            let report = model.step(&mut state);

            if report.torque_fault {
                telemetry.record_torque_fault();
            }
            if last_phase != Some(report.phase) {
                debug!("t = {:.2}s: entering {:?}", step_time, report.phase);
                last_phase = Some(report.phase);
            }

            if state.left_rail {
                state.angle_window.push(report.omega_delta);
                if model.schedule.in_stability_window(step_time)
                    && state.angle_window.sum().abs() > max_window_change
                    && telemetry.summary().is_angle_stable_ok
                {
                    debug!(
                        "t = {:.2}s: attitude moved {:.1}° within one response interval",
                        step_time,
                        state.angle_window.sum().to_degrees()
                    );
                    telemetry.mark_unstable();
                }
            }

            telemetry.record(FlightSample::from_state(&state, &report, model.launch_angle));
        }

        let result = telemetry.finish(model.profile, MIN_STABLE_STATIC_MARGIN);
        info!(
            "flight ended at {:.2}s: apogee {:.2} m, max speed {:.2} m/s, stable: {}",
            result.summary.flight_time,
            result.summary.max_height,
            result.summary.max_speed,
            result.summary.is_angle_stable_ok
        );
        result
    }
}

pub fn simulate(
    params: &RocketParameters,
    conditions: LaunchConditions,
    config: SimulationConfig,
) -> FlightResult {
    FlightSimulator::new(params, conditions, config).run()
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn finite_non_negative(value: f64) -> f64 {
    finite_or_zero(value).max(0.0)
}

fn degraded_geometry(params: &RocketParameters) -> RocketGeometry {
    RocketGeometry {
        nose_shape: params.nose_shape,
        nose_height: finite_non_negative(params.nose_height.to_meters()),
        body_height: finite_non_negative(params.body_height.to_meters()),
        body_diameter: finite_non_negative(params.body_width.to_meters()),
        fin_height: finite_non_negative(params.fin_height.to_meters()),
        fin_root_chord: finite_non_negative(params.fin_base_width.to_meters()),
        fin_tip_chord: finite_non_negative(params.fin_tip_width.to_meters()),
        fin_sweep: finite_non_negative(params.fin_sweep_length.to_meters()),
        fin_thickness: finite_non_negative(params.fin_thickness.to_meters()),
        fin_material: params.fin_material,
        fins: params.fin_count,
        mass: finite_non_negative(params.weight.to_kilograms()).max(MIN_DEGRADED_MASS),
        center_of_gravity: finite_non_negative(params.center_of_gravity.to_meters()),
    }
}
