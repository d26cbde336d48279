use tracing::warn;

use crate::constants::{
    AMPLIFIED_LAUNCH_ANGLES_DEG, ANGLE_WINDOW_CAPACITY, ANGULAR_DAMPING, BODY_DRAG_COEFFICIENT,
    CROSSWIND_DRAG_COEFFICIENT, DEPLOYING_LINEAR_DRAG, DEPLOYING_LINEAR_DRAG_GAIN,
    LAUNCH_ANGLE_TORQUE_GAIN, MAX_ANGULAR_VELOCITY, MAX_ANGULAR_VELOCITY_AT_UPDATE, MAX_SPEED,
    MAX_TORQUE, MAX_VELOCITY_SQUARED, MIN_ATTITUDE_NUDGE, MIN_TORQUE_MAGNITUDE,
    PARACHUTE_DRAG_COEFFICIENT, PARACHUTE_RESTORING_GAIN, PARACHUTE_VELOCITY_RETENTION, TIME_STEP,
};
use crate::control::environment::Environment;
use crate::control::flight_phase::{FlightPhase, ParachuteState, PhaseSchedule};
use crate::control::guidance::AttitudeGuidance;
use crate::control::propulsion::Motor;
use crate::control::rocket::RocketGeometry;
use crate::errors::SimulationError;
use crate::utils::vector2d::Vector2D;

use super::aerodynamics::AerodynamicProfile;
use super::deflection::fin_deflection_mm;
use super::moments::{
    drag_moment, fin_moment, lift_moment, thrust_moment, wind_moment, FlowState, WindLoading,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleWindow {
    samples: [f64; ANGLE_WINDOW_CAPACITY],
    capacity: usize,
    len: usize,
    next: usize,
}

impl AngleWindow {
    pub fn new(capacity: usize) -> Self {
        AngleWindow {
            samples: [0.0; ANGLE_WINDOW_CAPACITY],
            capacity: capacity.clamp(1, ANGLE_WINDOW_CAPACITY),
            len: 0,
            next: 0,
        }
    }

    pub fn push(&mut self, delta: f64) {
        self.samples[self.next] = delta;
        self.next = (self.next + 1) % self.capacity;
        self.len = (self.len + 1).min(self.capacity);
    }

    pub fn sum(&self) -> f64 {
        self.samples[..self.len].iter().sum()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationState {
    pub time: f64,
    pub position: Vector2D,
    pub velocity: Vector2D,
    pub previous_velocity: Vector2D,
    pub acceleration: Vector2D,
    pub omega: f64, // from vertical, positive toward +x
    pub angular_velocity: f64,
    pub angular_acceleration: f64,
    pub torque: f64,
    pub accumulated_torque: f64,
    pub steps_since_update: u32,
    pub last_angle_change: f64,
    pub left_rail: bool,
    pub parachute_state: ParachuteState,
    pub parachute_progress: f64,
    pub fin_deflection: f64,
    pub angle_window: AngleWindow,
}

impl SimulationState {
    pub fn at_launch(launch_angle: f64, window_capacity: usize) -> Self {
        SimulationState {
            time: 0.0,
            position: Vector2D::ZERO,
            velocity: Vector2D::ZERO,
            previous_velocity: Vector2D::ZERO,
            acceleration: Vector2D::ZERO,
            omega: launch_angle,
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            torque: 0.0,
            accumulated_torque: 0.0,
            steps_since_update: 0,
            last_angle_change: 0.0,
            left_rail: false,
            parachute_state: ParachuteState::NotDeployed,
            parachute_progress: 0.0,
            fin_deflection: 0.0,
            angle_window: AngleWindow::new(window_capacity),
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    pub fn flight_angle(&self) -> f64 {
        if self.velocity.magnitude() > 1e-9 {
            self.velocity.vertical_angle()
        } else {
            self.omega
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub phase: FlightPhase,
    pub thrust: f64,
    pub wind: f64,
    pub effective_wind: f64,
    pub omega_delta: f64,
    pub torque_fault: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlightModel {
    pub geometry: RocketGeometry,
    pub profile: AerodynamicProfile,
    pub motor: Motor,
    pub parachute_area: f64,
    pub environment: Environment,
    pub schedule: PhaseSchedule,
    pub guidance: AttitudeGuidance,
    pub launch_angle: f64,
    pub thrust_cant: f64,
    pub fin_lean_moment: bool,
    pub steps_per_update: u32,
}

impl FlightModel {
    pub fn update_interval(&self) -> f64 {
        f64::from(self.steps_per_update) * TIME_STEP
    }

    pub fn amplifies_launch_torque(&self) -> bool {
        let degrees = self.launch_angle.to_degrees().abs();
        AMPLIFIED_LAUNCH_ANGLES_DEG
            .iter()
            .any(|&angle| (degrees - angle).abs() < 1e-6)
    }

    pub fn step(&self, state: &mut SimulationState) -> StepReport {
        let on_rail = self
            .schedule
            .is_on_rail(state.position.magnitude(), state.left_rail);
        if !on_rail {
            state.left_rail = true;
        }
        let phase = self.schedule.phase_at(state.time, on_rail);
        let thrust = if phase == FlightPhase::Powered || phase == FlightPhase::OnRail {
            self.motor.thrust_at(state.time)
        } else {
            0.0
        };
        let wind = self.environment.wind_at(state.position.y);
        let effective_wind = wind - state.velocity.x;

        let (torque, torque_fault) = match self.net_torque(state, phase, thrust, effective_wind) {
            Ok(torque) => (torque, false),
            Err(err) => {
                warn!("t = {:.2}s: dropping torque for this step: {}", state.time, err);
                (0.0, true)
            }
        };
        state.torque = torque;

        let omega_before = state.omega;
        if phase != FlightPhase::OnRail {
            self.update_attitude(state, phase, wind);
        }

        self.integrate(state, phase, thrust, wind);

        state.parachute_state = phase.parachute_state();
        state.parachute_progress = self.schedule.deployment_progress(state.time);
        state.fin_deflection =
            fin_deflection_mm(&self.geometry, state.speed(), &self.environment);
        state.time += TIME_STEP;

        StepReport {
            phase,
            thrust,
            wind,
            effective_wind,
            omega_delta: state.omega - omega_before,
            torque_fault,
        }
    }

    pub fn net_torque(
        &self,
        state: &SimulationState,
        phase: FlightPhase,
        thrust: f64,
        effective_wind: f64,
    ) -> Result<f64, SimulationError> {
        if phase == FlightPhase::OnRail {
            return Ok(0.0);
        }
        let raw = if phase.is_under_parachute() {
            -PARACHUTE_RESTORING_GAIN * (state.omega - self.launch_angle)
        } else {
            let mut torque = self.aerodynamic_torque(state, phase, thrust, effective_wind)?;
            if phase == FlightPhase::Powered && self.amplifies_launch_torque() {
                torque *= LAUNCH_ANGLE_TORQUE_GAIN;
            }
            torque
        };

        let floored = if raw.abs() < MIN_TORQUE_MAGNITUDE {
            if raw >= 0.0 {
                MIN_TORQUE_MAGNITUDE
            } else {
                -MIN_TORQUE_MAGNITUDE
            }
        } else {
            raw
        };
        Ok(floored.clamp(-MAX_TORQUE, MAX_TORQUE))
    }

    fn aerodynamic_torque(
        &self,
        state: &SimulationState,
        phase: FlightPhase,
        thrust: f64,
        effective_wind: f64,
    ) -> Result<f64, SimulationError> {
        let profile = &self.profile;
        let cg = self.geometry.center_of_gravity;
        let flow = FlowState {
            dynamic_pressure: self
                .environment
                .dynamic_pressure(state.velocity.magnitude_squared().min(MAX_VELOCITY_SQUARED)),
            omega: state.omega,
            flight_angle: state.flight_angle(),
        };
        let loading = WindLoading {
            fin_area: profile.areas.total_fin,
            fin_center_of_pressure: profile.centers.fin,
            body_area: profile.areas.body_side,
            body_center_of_pressure: profile.centers.body,
            center_of_pressure: profile.centers.overall,
        };

        let mut torque = lift_moment(&flow, profile.areas.side, profile.aerodynamic_center, cg)?
            + drag_moment(&flow, profile.areas.side, profile.centers.overall, cg)?
            + wind_moment(effective_wind, state.omega, &self.environment, &loading, cg)?;
        if self.fin_lean_moment {
            let lean_area = self.geometry.fins.lean_area(profile.areas.single_fin);
            torque += fin_moment(&flow, lean_area, profile.centers.fin, cg)?;
        }
        if phase == FlightPhase::Powered {
            torque += thrust_moment(thrust, self.thrust_cant, self.geometry.total_length(), cg)?;
        }
        Ok(torque)
    }

    // torque averaged over one interval becomes a damped rate; the resulting
    // attitude change is fed in evenly over the next interval
    fn update_attitude(&self, state: &mut SimulationState, phase: FlightPhase, wind: f64) {
        state.accumulated_torque += state.torque;
        state.steps_since_update += 1;

        if state.steps_since_update >= self.steps_per_update {
            let interval = self.update_interval();
            let average_torque = state.accumulated_torque / f64::from(state.steps_since_update);
            let moment_of_inertia = self.geometry.moment_of_inertia().max(f64::MIN_POSITIVE);
            state.angular_acceleration = average_torque / moment_of_inertia;
            state.angular_velocity = ((state.angular_velocity
                + state.angular_acceleration * interval)
                * ANGULAR_DAMPING)
                .clamp(-MAX_ANGULAR_VELOCITY_AT_UPDATE, MAX_ANGULAR_VELOCITY_AT_UPDATE);
            state.last_angle_change = state.angular_velocity * interval;
            state.accumulated_torque = 0.0;
            state.steps_since_update = 0;
        }

        let mut nudge = state.last_angle_change / f64::from(self.steps_per_update);
        if nudge != 0.0 && nudge.abs() < MIN_ATTITUDE_NUDGE {
            nudge = MIN_ATTITUDE_NUDGE.copysign(nudge);
        }
        state.omega += nudge;

        if phase.is_aerodynamic() {
            state.omega += self.guidance.attitude_change(
                state.omega,
                state.velocity,
                wind,
                phase == FlightPhase::Powered,
            );
        }

        state.angular_velocity = state
            .angular_velocity
            .clamp(-MAX_ANGULAR_VELOCITY, MAX_ANGULAR_VELOCITY);
    }

    fn integrate(&self, state: &mut SimulationState, phase: FlightPhase, thrust: f64, wind: f64) {
        if phase == FlightPhase::ParachuteDeployed
            && state.parachute_state != ParachuteState::FullyDeployed
        {
            state.velocity = state.velocity * PARACHUTE_VELOCITY_RETENTION;
        }
        state.previous_velocity = state.velocity;

        let mass = self.geometry.mass;
        let force = self.force(state, phase, thrust, wind);
        let acceleration = force / mass;

        if phase == FlightPhase::OnRail {
            let axis = Vector2D::from_vertical_angle(state.omega);
            let along = acceleration.dot(&axis);
            let speed_along = (state.velocity.dot(&axis) + along * TIME_STEP).max(0.0);
            state.velocity = axis * speed_along;
        } else {
            state.velocity += acceleration * TIME_STEP;
        }

        state.velocity = state.velocity.clamp_magnitude(MAX_SPEED);
        state.acceleration = (state.velocity - state.previous_velocity) / TIME_STEP;
        state.position += state.velocity * TIME_STEP;
    }

    pub fn force(
        &self,
        state: &SimulationState,
        phase: FlightPhase,
        thrust: f64,
        wind: f64,
    ) -> Vector2D {
        let environment = &self.environment;
        let gravity = Vector2D::new(0.0, -self.geometry.mass * self.environment.gravity);
        let velocity = state.velocity;
        let speed = velocity.magnitude();
        let crosswind = |area: f64| {
            let relative = wind - velocity.x;
            let pressure = environment.dynamic_pressure(relative.powi(2)).copysign(relative);
            Vector2D::new(pressure * area * CROSSWIND_DRAG_COEFFICIENT, 0.0)
        };

        match phase {
            FlightPhase::OnRail | FlightPhase::Powered | FlightPhase::Coast => {
                // body drag acts along the axis, against the axial motion
                let axis = Vector2D::from_vertical_angle(state.omega);
                let axial_sign = if velocity.dot(&axis) >= 0.0 { 1.0 } else { -1.0 };
                let drag = -axis
                    * (axial_sign
                        * environment.dynamic_pressure(speed.powi(2))
                        * BODY_DRAG_COEFFICIENT
                        * self.profile.areas.frontal);
                axis * thrust + drag + crosswind(self.profile.areas.side) + gravity
            }
            FlightPhase::ParachuteDeploying => {
                let progress = self.schedule.deployment_progress(state.time);
                let damping = DEPLOYING_LINEAR_DRAG + DEPLOYING_LINEAR_DRAG_GAIN * progress;
                -velocity * damping + crosswind(self.profile.areas.side) * 0.5 + gravity
            }
            FlightPhase::ParachuteDeployed => {
                let drag = -velocity.normalize()
                    * (environment.dynamic_pressure(speed.powi(2))
                        * PARACHUTE_DRAG_COEFFICIENT
                        * self.parachute_area);
                drag + crosswind(self.parachute_area) + gravity
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_RAIL_LENGTH;
    use crate::control::environment::WindProfile;
    use crate::control::rocket::RocketParameters;
    use approx::assert_relative_eq;

    fn model(launch_angle_deg: f64, wind: f64) -> FlightModel {
        let params = RocketParameters::sport_model();
        let geometry = RocketGeometry::from_parameters(&params).unwrap();
        FlightModel {
            geometry,
            profile: AerodynamicProfile::compute(&geometry),
            motor: params.motor,
            parachute_area: params.parachute.area(),
            environment: Environment::new(wind, WindProfile::OpenTerrain),
            schedule: PhaseSchedule::new(&params.motor, DEFAULT_RAIL_LENGTH),
            guidance: AttitudeGuidance::new(true, false),
            launch_angle: launch_angle_deg.to_radians(),
            thrust_cant: 0.0,
            fin_lean_moment: true,
            steps_per_update: 5,
        }
    }

    fn state_at(model: &FlightModel) -> SimulationState {
        SimulationState::at_launch(model.launch_angle, model.steps_per_update as usize)
    }

    #[test]
    fn test_angle_window_keeps_last_samples() {
        let mut window = AngleWindow::new(3);
        assert!(window.is_empty());
        for delta in [1.0, 2.0, 3.0, 4.0] {
            window.push(delta);
        }
        assert!(window.is_full());
        assert_eq!(window.len(), 3);
        assert_relative_eq!(window.sum(), 9.0);
    }

    #[test]
    fn test_angle_window_capacity_is_bounded() {
        let window = AngleWindow::new(1000);
        assert_eq!(window.capacity, ANGLE_WINDOW_CAPACITY);
        assert_eq!(AngleWindow::new(0).capacity, 1);
    }

    #[test]
    fn test_rocket_stays_on_rail_axis() {
        let model = model(10.0, 3.0);
        let mut state = state_at(&model);
        for _ in 0..10 {
            let report = model.step(&mut state);
            if report.phase != FlightPhase::OnRail {
                break;
            }
            assert_relative_eq!(state.omega, model.launch_angle);
            let direction = state.velocity.vertical_angle();
            if state.velocity.magnitude() > 1e-9 {
                assert_relative_eq!(direction, model.launch_angle, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_rail_never_pushes_backwards() {
        let model = model(0.0, 0.0);
        let mut state = state_at(&model);
        model.step(&mut state);
        assert!(state.velocity.y >= 0.0);
        assert!(state.position.y >= 0.0);
    }

    #[test]
    fn test_on_rail_has_no_torque() {
        let model = model(5.0, 5.0);
        let state = state_at(&model);
        let torque = model.net_torque(&state, FlightPhase::OnRail, 10.0, 5.0).unwrap();
        assert_eq!(torque, 0.0);
    }

    #[test]
    fn test_torque_floor_and_clamp() {
        let model = model(0.0, 0.0);
        let mut state = state_at(&model);
        let tiny = model.net_torque(&state, FlightPhase::ParachuteDeployed, 0.0, 0.0).unwrap();
        assert_eq!(tiny, MIN_TORQUE_MAGNITUDE);

        state.omega = -0.001;
        let small_offset =
            model.net_torque(&state, FlightPhase::ParachuteDeployed, 0.0, 0.0).unwrap();
        assert_eq!(small_offset, MIN_TORQUE_MAGNITUDE);

        state.omega = 0.5;
        let restoring = model.net_torque(&state, FlightPhase::ParachuteDeployed, 0.0, 0.0).unwrap();
        assert_relative_eq!(restoring, -0.005);

        state.omega = 0.0;
        state.velocity = Vector2D::new(60.0, 60.0);
        let gusty = model.net_torque(&state, FlightPhase::Coast, 0.0, 200.0).unwrap();
        assert!(gusty.abs() <= MAX_TORQUE);
    }

    #[test]
    fn test_launch_angle_amplification() {
        assert!(model(4.0, 0.0).amplifies_launch_torque());
        assert!(model(-18.0, 0.0).amplifies_launch_torque());
        assert!(!model(5.0, 0.0).amplifies_launch_torque());
    }

    #[test]
    fn test_attitude_update_runs_on_the_coarse_rate() {
        let mut model = model(0.0, 0.0);
        model.guidance = AttitudeGuidance::new(false, false);
        let mut state = state_at(&model);
        state.left_rail = true;
        state.time = 3.0;
        state.velocity = Vector2D::new(0.0, 20.0);
        state.position = Vector2D::new(0.0, 40.0);

        for _ in 0..4 {
            model.step(&mut state);
            assert_eq!(state.last_angle_change, 0.0);
        }
        model.step(&mut state);
        assert_eq!(state.steps_since_update, 0);
        assert!(state.last_angle_change != 0.0);
        assert!(state.angular_velocity.abs() <= MAX_ANGULAR_VELOCITY_AT_UPDATE);
    }

    #[test]
    fn test_parachute_cuts_velocity_once() {
        let model = model(0.0, 0.0);
        let mut state = state_at(&model);
        state.left_rail = true;
        state.position = Vector2D::new(0.0, 40.0);
        state.velocity = Vector2D::new(0.0, -20.0);
        state.parachute_state = ParachuteState::Deploying;
        state.time = model.schedule.full_deployment_time;

        model.step(&mut state);
        assert_eq!(state.parachute_state, ParachuteState::FullyDeployed);
        assert!(state.speed() < 2.5, "speed after cut: {}", state.speed());

        let before = state.speed();
        model.step(&mut state);
        assert!(state.speed() > before * 0.5);
    }

    #[test]
    fn test_speed_is_capped() {
        let model = model(0.0, 0.0);
        let mut state = state_at(&model);
        state.left_rail = true;
        state.time = 3.0;
        state.position = Vector2D::new(0.0, 50.0);
        state.velocity = Vector2D::new(0.0, 150.0);
        model.step(&mut state);
        assert!(state.speed() <= MAX_SPEED + 1e-9);
    }

    #[test]
    fn test_crosswind_pushes_downwind() {
        let model = model(0.0, 5.0);
        let state = SimulationState {
            left_rail: true,
            position: Vector2D::new(0.0, 30.0),
            velocity: Vector2D::new(0.0, 20.0),
            ..state_at(&model)
        };
        let wind = model.environment.wind_at(state.position.y);
        let force = model.force(&state, FlightPhase::Coast, 0.0, wind);
        assert!(force.x > 0.0);
    }

    #[test]
    fn test_acceleration_sample_follows_velocity_change() {
        let model = model(0.0, 0.0);
        let mut state = state_at(&model);
        state.left_rail = true;
        state.time = 3.0;
        state.position = Vector2D::new(0.0, 50.0);
        state.velocity = Vector2D::new(0.0, 20.0);

        model.step(&mut state);
        assert_eq!(state.previous_velocity, Vector2D::new(0.0, 20.0));
        let expected = (state.velocity - state.previous_velocity) / TIME_STEP;
        assert_relative_eq!(state.acceleration.y, expected.y, epsilon = 1e-9);
        // coasting upward: gravity plus drag
        assert!(state.acceleration.y < -model.environment.gravity);
    }

    #[test]
    fn test_parachute_phases_use_restoring_torque() {
        let model = model(0.0, 0.0);
        let mut state = state_at(&model);
        state.omega = 0.4;
        state.velocity = Vector2D::new(10.0, -10.0);
        for phase in [FlightPhase::ParachuteDeploying, FlightPhase::ParachuteDeployed] {
            assert!(phase.is_under_parachute());
            let torque = model.net_torque(&state, phase, 0.0, 50.0).unwrap();
            assert_relative_eq!(torque, -PARACHUTE_RESTORING_GAIN * 0.4);
        }
    }

    #[test]
    fn test_canopy_drag_uses_dynamic_pressure() {
        let model = model(0.0, 0.0);
        let state = SimulationState {
            left_rail: true,
            position: Vector2D::new(0.0, 30.0),
            velocity: Vector2D::new(0.0, -4.0),
            ..state_at(&model)
        };
        let force = model.force(&state, FlightPhase::ParachuteDeployed, 0.0, 0.0);
        let drag = model.environment.dynamic_pressure(16.0)
            * PARACHUTE_DRAG_COEFFICIENT
            * model.parachute_area;
        let weight = model.geometry.mass * model.environment.gravity;
        assert_relative_eq!(force.y, drag - weight, epsilon = 1e-9);
        assert_relative_eq!(force.x, 0.0);
    }

    #[test]
    fn test_time_advances_by_fixed_step() {
        let model = model(0.0, 0.0);
        let mut state = state_at(&model);
        for _ in 0..50 {
            model.step(&mut state);
        }
        assert_relative_eq!(state.time, 50.0 * TIME_STEP, epsilon = 1e-9);
    }
}
