use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::constants::FIN_DEFLECTION_CEILING_MM;
use crate::control::flight_phase::{FlightPhase, ParachuteState};
use crate::trajectory_system::aerodynamics::AerodynamicProfile;
use crate::trajectory_system::kinematics::{SimulationState, StepReport};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSample {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub ax: f64,
    pub ay: f64,
    pub speed: f64,
    pub acceleration: f64,
    pub angular_velocity: f64,
    pub angular_acceleration: f64,
    pub is_parachute_ejected: bool,
    pub is_parachute_active: bool,
    pub parachute_progress: f64,
    pub omega: f64,
    pub omega_deg: f64,
    pub torque: f64,
    pub angle_change_per_interval: f64, // degrees
    pub horizontal_distance: f64,
    pub fin_deflection: f64, // mm
    pub angle_deviation: f64,
    pub effective_wind_speed: f64,
    pub is_thrust_active: bool,
    pub phase: FlightPhase,
}

impl FlightSample {
    pub fn from_state(state: &SimulationState, report: &StepReport, launch_angle: f64) -> Self {
        FlightSample {
            time: state.time,
            x: state.position.x,
            y: state.position.y,
            vx: state.velocity.x,
            vy: state.velocity.y,
            ax: state.acceleration.x,
            ay: state.acceleration.y,
            speed: state.velocity.magnitude(),
            acceleration: state.acceleration.magnitude(),
            angular_velocity: state.angular_velocity,
            angular_acceleration: state.angular_acceleration,
            is_parachute_ejected: state.parachute_state != ParachuteState::NotDeployed,
            is_parachute_active: state.parachute_state == ParachuteState::FullyDeployed,
            parachute_progress: state.parachute_progress,
            omega: state.omega,
            omega_deg: state.omega.to_degrees(),
            torque: state.torque,
            angle_change_per_interval: state.angle_window.sum().to_degrees(),
            horizontal_distance: state.position.x.abs(),
            fin_deflection: state.fin_deflection,
            angle_deviation: (state.omega - launch_angle).to_degrees(),
            effective_wind_speed: report.effective_wind,
            is_thrust_active: report.thrust > 0.0,
            phase: report.phase,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPoint {
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
}

impl From<&FlightSample> for KeyPoint {
    fn from(sample: &FlightSample) -> Self {
        KeyPoint {
            time: sample.time,
            x: sample.x,
            y: sample.y,
            speed: sample.speed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightSummary {
    pub max_height: f64,
    pub max_speed: f64,
    pub max_distance: f64,
    pub max_fin_deflection: f64,
    pub thrust_end: Option<KeyPoint>,
    pub max_height_point: Option<KeyPoint>,
    pub parachute_ejection: Option<KeyPoint>,
    pub parachute_active: Option<KeyPoint>,
    #[serde(rename = "isAngleStableOK")]
    pub is_angle_stable_ok: bool,
    #[serde(rename = "isStaticMarginOK")]
    pub is_static_margin_ok: bool,
    #[serde(rename = "isFinSpeedOK")]
    pub is_fin_speed_ok: bool,
    pub torque_faults: u32,
    pub flight_time: f64,
}

impl Default for FlightSummary {
    fn default() -> Self {
        FlightSummary {
            max_height: 0.0,
            max_speed: 0.0,
            max_distance: 0.0,
            max_fin_deflection: 0.0,
            thrust_end: None,
            max_height_point: None,
            parachute_ejection: None,
            parachute_active: None,
            is_angle_stable_ok: true,
            is_static_margin_ok: false,
            is_fin_speed_ok: false,
            torque_faults: 0,
            flight_time: 0.0,
        }
    }
}

impl FlightSummary {
    fn format_time(elapsed_time: f64) -> String {
        if elapsed_time >= 60.0 {
            let minutes = (elapsed_time / 60.0).floor();
            let seconds = elapsed_time % 60.0;
            format!("{:.0}m {:.2}s", minutes, seconds)
        } else {
            format!("{:.2}s", elapsed_time)
        }
    }

    fn format_altitude(altitude: f64) -> String {
        if altitude >= 1000.0 {
            format!("{:.2} km", altitude / 1000.0)
        } else {
            format!("{:.2} m", altitude)
        }
    }

    fn format_key_point(name: &str, point: &Option<KeyPoint>) -> String {
        match point {
            Some(point) => format!(
                "{}: {} at {} (x = {:.2} m, {:.2} m/s)\n",
                name,
                Self::format_time(point.time),
                Self::format_altitude(point.y),
                point.x,
                point.speed
            ),
            None => format!("{}: not reached\n", name),
        }
    }

    fn verdict(ok: bool) -> &'static str {
        if ok {
            "OK"
        } else {
            "NG"
        }
    }

    pub fn report(&self) -> String {
        let mut out = String::new();
        out.push_str("--- Flight Summary ---\n");
        let _ = writeln!(out, "Flight Time: {}", Self::format_time(self.flight_time));
        let _ = writeln!(out, "Max Height: {}", Self::format_altitude(self.max_height));
        let _ = writeln!(out, "Max Speed: {:.2} m/s", self.max_speed);
        let _ = writeln!(out, "Max Distance: {:.2} m", self.max_distance);
        let _ = writeln!(out, "Max Fin Deflection: {}", self.fin_deflection_label());

        out.push_str("\n--- Key Points ---\n");
        out.push_str(&Self::format_key_point("Thrust End", &self.thrust_end));
        out.push_str(&Self::format_key_point("Apogee", &self.max_height_point));
        out.push_str(&Self::format_key_point("Parachute Ejection", &self.parachute_ejection));
        out.push_str(&Self::format_key_point("Parachute Active", &self.parachute_active));

        out.push_str("\n--- Verdicts ---\n");
        let _ = writeln!(out, "Attitude Stability: {}", Self::verdict(self.is_angle_stable_ok));
        let _ = writeln!(out, "Static Margin: {}", Self::verdict(self.is_static_margin_ok));
        let _ = writeln!(out, "Fin Speed: {}", Self::verdict(self.is_fin_speed_ok));
        if self.torque_faults > 0 {
            let _ = writeln!(out, "Torque faults: {}", self.torque_faults);
        }
        out
    }

    fn fin_deflection_label(&self) -> String {
        if self.max_fin_deflection >= FIN_DEFLECTION_CEILING_MM {
            format!("{:.0} mm or more", FIN_DEFLECTION_CEILING_MM)
        } else {
            format!("{:.2} mm", self.max_fin_deflection)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightResult {
    #[serde(rename = "data")]
    pub samples: Vec<FlightSample>,
    pub summary: FlightSummary,
    pub profile: AerodynamicProfile,
    pub is_profile_valid: bool,
}

impl FlightResult {
    pub fn last_sample(&self) -> Option<&FlightSample> {
        self.samples.last()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    samples: Vec<FlightSample>,
    summary: FlightSummary,
    thrust_seen: bool,
}

impl Telemetry {
    pub fn new() -> Self {
        Telemetry::default()
    }

    pub fn record(&mut self, sample: FlightSample) {
        let summary = &mut self.summary;

        if sample.y > summary.max_height {
            summary.max_height = sample.y;
            summary.max_height_point = Some(KeyPoint::from(&sample));
        }
        summary.max_speed = summary.max_speed.max(sample.speed);
        summary.max_distance = summary.max_distance.max(sample.horizontal_distance);
        summary.max_fin_deflection = summary.max_fin_deflection.max(sample.fin_deflection);
        summary.flight_time = sample.time;

        if sample.is_thrust_active {
            self.thrust_seen = true;
        } else if self.thrust_seen && summary.thrust_end.is_none() {
            summary.thrust_end = Some(KeyPoint::from(&sample));
        }
        if summary.parachute_ejection.is_none() && sample.is_parachute_ejected {
            summary.parachute_ejection = Some(KeyPoint::from(&sample));
        }
        if summary.parachute_active.is_none() && sample.is_parachute_active {
            summary.parachute_active = Some(KeyPoint::from(&sample));
        }

        self.samples.push(sample);
    }

    pub fn record_torque_fault(&mut self) {
        self.summary.torque_faults += 1;
    }

    pub fn mark_unstable(&mut self) {
        self.summary.is_angle_stable_ok = false;
    }

    pub fn samples(&self) -> &[FlightSample] {
        &self.samples
    }

    pub fn summary(&self) -> &FlightSummary {
        &self.summary
    }

    pub fn finish(self, profile: AerodynamicProfile, min_static_margin: f64) -> FlightResult {
        let mut summary = self.summary;
        summary.is_static_margin_ok = profile.is_valid && profile.static_margin >= min_static_margin;
        let fin_limit = profile.fin_speeds.divergence.min(profile.fin_speeds.flutter);
        summary.is_fin_speed_ok = profile.is_valid && summary.max_speed < fin_limit;

        FlightResult {
            samples: self.samples,
            summary,
            profile,
            is_profile_valid: profile.is_valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64, y: f64, thrust: bool, parachute: ParachuteState) -> FlightSample {
        FlightSample {
            time,
            x: 0.5 * time,
            y,
            vx: 0.0,
            vy: 0.0,
            ax: 0.0,
            ay: 0.0,
            speed: 10.0 + time,
            acceleration: 0.0,
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            is_parachute_ejected: parachute != ParachuteState::NotDeployed,
            is_parachute_active: parachute == ParachuteState::FullyDeployed,
            parachute_progress: 0.0,
            omega: 0.0,
            omega_deg: 0.0,
            torque: 0.0,
            angle_change_per_interval: 0.0,
            horizontal_distance: 0.5 * time,
            fin_deflection: 0.1,
            angle_deviation: 0.0,
            effective_wind_speed: 0.0,
            is_thrust_active: thrust,
            phase: FlightPhase::Coast,
        }
    }

    #[test]
    fn test_format_time() {
        assert_eq!(FlightSummary::format_time(7.456), "7.46s");
        assert_eq!(FlightSummary::format_time(75.0), "1m 15.00s");
    }

    #[test]
    fn test_format_altitude() {
        assert_eq!(FlightSummary::format_altitude(70.125), "70.13 m");
        assert_eq!(FlightSummary::format_altitude(1500.0), "1.50 km");
    }

    #[test]
    fn test_key_points_are_recorded_once() {
        let mut telemetry = Telemetry::new();
        telemetry.record(sample(1.0, 10.0, true, ParachuteState::NotDeployed));
        telemetry.record(sample(2.0, 40.0, false, ParachuteState::NotDeployed));
        telemetry.record(sample(3.0, 60.0, false, ParachuteState::NotDeployed));
        telemetry.record(sample(4.0, 50.0, false, ParachuteState::Deploying));
        telemetry.record(sample(5.0, 30.0, false, ParachuteState::FullyDeployed));
        telemetry.record(sample(6.0, 20.0, false, ParachuteState::FullyDeployed));

        let summary = telemetry.summary();
        assert_eq!(summary.thrust_end.map(|p| p.time), Some(2.0));
        assert_eq!(summary.max_height_point.map(|p| p.time), Some(3.0));
        assert_eq!(summary.parachute_ejection.map(|p| p.time), Some(4.0));
        assert_eq!(summary.parachute_active.map(|p| p.time), Some(5.0));
        assert_eq!(summary.max_height, 60.0);
        assert_eq!(summary.max_speed, 16.0);
        assert_eq!(summary.max_distance, 3.0);
        assert_eq!(summary.flight_time, 6.0);
        assert_eq!(telemetry.samples().len(), 6);
    }

    #[test]
    fn test_finish_applies_verdicts() {
        let mut telemetry = Telemetry::new();
        telemetry.record(sample(1.0, 10.0, true, ParachuteState::NotDeployed));
        let mut profile = AerodynamicProfile {
            is_valid: true,
            static_margin: 1.5,
            ..AerodynamicProfile::default()
        };
        profile.fin_speeds.divergence = 80.0;
        profile.fin_speeds.flutter = 120.0;

        let result = telemetry.clone().finish(profile, 1.0);
        assert!(result.is_profile_valid);
        assert!(result.summary.is_static_margin_ok);
        assert!(result.summary.is_fin_speed_ok);

        profile.fin_speeds.divergence = 5.0;
        profile.static_margin = 0.5;
        let result = telemetry.finish(profile, 1.0);
        assert!(!result.summary.is_static_margin_ok);
        assert!(!result.summary.is_fin_speed_ok);
    }

    #[test]
    fn test_invalid_profile_fails_profile_verdicts() {
        let mut telemetry = Telemetry::new();
        telemetry.record(sample(1.0, 10.0, false, ParachuteState::NotDeployed));
        let result = telemetry.finish(AerodynamicProfile::invalid(), 1.0);
        assert!(!result.is_profile_valid);
        assert!(!result.summary.is_static_margin_ok);
        assert!(!result.summary.is_fin_speed_ok);
    }

    #[test]
    fn test_report_mentions_verdicts() {
        let mut telemetry = Telemetry::new();
        telemetry.mark_unstable();
        telemetry.record_torque_fault();
        telemetry.record(sample(1.0, 10.0, false, ParachuteState::NotDeployed));
        let report = telemetry.summary().report();
        assert!(report.contains("Max Height: 10.00 m"));
        assert!(report.contains("Attitude Stability: NG"));
        assert!(report.contains("Apogee: 1.00s"));
        assert!(report.contains("Parachute Active: not reached"));
        assert!(report.contains("Torque faults: 1"));
    }

    #[test]
    fn test_samples_serialize_with_camel_case_names() {
        let json = serde_json::to_value(sample(1.0, 2.0, true, ParachuteState::NotDeployed)).unwrap();
        assert_eq!(json["isThrustActive"], true);
        assert_eq!(json["omegaDeg"], 0.0);
        assert_eq!(json["phase"], "coast");
    }
}
