use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::control::rocket::RocketParameters;
use crate::telemetry_system::telemetry::FlightResult;

use super::simulator::{simulate, LaunchConditions, SimulationConfig};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispersionRun {
    pub launch_angle: f64,
    pub wind_speed: f64,
    pub max_height: f64,
    pub landing_x: f64, // signed x of the last sample
    pub max_distance: f64,
    pub flight_time: f64,
    pub is_angle_stable_ok: bool,
}

impl DispersionRun {
    fn from_result(conditions: &LaunchConditions, result: &FlightResult) -> Self {
        DispersionRun {
            launch_angle: conditions.launch_angle,
            wind_speed: conditions.wind_speed,
            max_height: result.summary.max_height,
            landing_x: result.last_sample().map_or(0.0, |s| s.x),
            max_distance: result.summary.max_distance,
            flight_time: result.summary.flight_time,
            is_angle_stable_ok: result.summary.is_angle_stable_ok,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispersionReport {
    pub runs: Vec<DispersionRun>,
    pub mean_max_height: f64,
    pub mean_landing_x: f64,
    pub landing_spread: f64,
    pub stable_fraction: f64,
}

impl DispersionReport {
    pub fn from_runs(runs: Vec<DispersionRun>) -> Self {
        if runs.is_empty() {
            return DispersionReport {
                runs,
                mean_max_height: 0.0,
                mean_landing_x: 0.0,
                landing_spread: 0.0,
                stable_fraction: 0.0,
            };
        }

        let count = runs.len() as f64;
        let mean_max_height = runs.iter().map(|r| r.max_height).sum::<f64>() / count;
        let mean_landing_x = runs.iter().map(|r| r.landing_x).sum::<f64>() / count;
        let (min_x, max_x) = runs.iter().fold((f64::MAX, f64::MIN), |(lo, hi), r| {
            (lo.min(r.landing_x), hi.max(r.landing_x))
        });
        let stable = runs.iter().filter(|r| r.is_angle_stable_ok).count() as f64;

        DispersionReport {
            runs,
            mean_max_height,
            mean_landing_x,
            landing_spread: max_x - min_x,
            stable_fraction: stable / count,
        }
    }
}

pub fn launch_angle_sweep(
    params: &RocketParameters,
    base: LaunchConditions,
    config: SimulationConfig,
    angles: &[f64],
) -> Vec<DispersionRun> {
    angles
        .iter()
        .map(|&launch_angle| {
            let conditions = LaunchConditions {
                launch_angle,
                ..base
            };
            let result = simulate(params, conditions, config);
            DispersionRun::from_result(&conditions, &result)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispersionSweep {
    pub runs: usize,
    pub seed: u64,
    pub angle_jitter: f64,
    pub wind_jitter: f64,
}

impl DispersionSweep {
    pub fn new(runs: usize, seed: u64) -> Self {
        DispersionSweep {
            runs,
            seed,
            angle_jitter: 2.0,
            wind_jitter: 1.0,
        }
    }

    pub fn with_angle_jitter(mut self, degrees: f64) -> Self {
        self.angle_jitter = degrees.abs();
        self
    }

    pub fn with_wind_jitter(mut self, speed: f64) -> Self {
        self.wind_jitter = speed.abs();
        self
    }

    pub fn sample_conditions(&self, nominal: LaunchConditions) -> Vec<LaunchConditions> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.runs)
            .map(|_| LaunchConditions {
                launch_angle: nominal.launch_angle + jitter(&mut rng, self.angle_jitter),
                wind_speed: nominal.wind_speed + jitter(&mut rng, self.wind_jitter),
                ..nominal
            })
            .collect()
    }

    pub fn run(
        &self,
        params: &RocketParameters,
        nominal: LaunchConditions,
        config: SimulationConfig,
    ) -> DispersionReport {
        let runs = self
            .sample_conditions(nominal)
            .iter()
            .map(|conditions| {
                let result = simulate(params, *conditions, config);
                DispersionRun::from_result(conditions, &result)
            })
            .collect();
        let report = DispersionReport::from_runs(runs);
        info!(
            "dispersion over {} runs: mean apogee {:.2} m, landing spread {:.2} m",
            report.runs.len(),
            report.mean_max_height,
            report.landing_spread
        );
        report
    }
}

fn jitter(rng: &mut StdRng, half_width: f64) -> f64 {
    if half_width > 0.0 && half_width.is_finite() {
        rng.gen_range(-half_width..=half_width)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::environment::WindProfile;
    use approx::assert_relative_eq;

    fn run(landing_x: f64, max_height: f64, stable: bool) -> DispersionRun {
        DispersionRun {
            launch_angle: 0.0,
            wind_speed: 0.0,
            max_height,
            landing_x,
            max_distance: landing_x.abs(),
            flight_time: 10.0,
            is_angle_stable_ok: stable,
        }
    }

    #[test]
    fn test_report_statistics() {
        let report = DispersionReport::from_runs(vec![
            run(-2.0, 60.0, true),
            run(4.0, 70.0, true),
            run(1.0, 80.0, false),
            run(5.0, 70.0, true),
        ]);
        assert_relative_eq!(report.mean_max_height, 70.0);
        assert_relative_eq!(report.mean_landing_x, 2.0);
        assert_relative_eq!(report.landing_spread, 7.0);
        assert_relative_eq!(report.stable_fraction, 0.75);
    }

    #[test]
    fn test_empty_report() {
        let report = DispersionReport::from_runs(Vec::new());
        assert_eq!(report.stable_fraction, 0.0);
        assert!(report.runs.is_empty());
    }

    #[test]
    fn test_same_seed_same_conditions() {
        let nominal = LaunchConditions::new(0.0, 3.0, WindProfile::Suburban);
        let sweep = DispersionSweep::new(8, 42);
        assert_eq!(sweep.sample_conditions(nominal), sweep.sample_conditions(nominal));
        assert_ne!(
            sweep.sample_conditions(nominal),
            DispersionSweep::new(8, 43).sample_conditions(nominal)
        );
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let nominal = LaunchConditions::new(10.0, -2.0, WindProfile::OpenWater);
        let sweep = DispersionSweep::new(200, 7)
            .with_angle_jitter(3.0)
            .with_wind_jitter(0.5);
        for conditions in sweep.sample_conditions(nominal) {
            assert!((conditions.launch_angle - 10.0).abs() <= 3.0);
            assert!((conditions.wind_speed + 2.0).abs() <= 0.5);
            assert_eq!(conditions.wind_profile, WindProfile::OpenWater);
        }
    }

    #[test]
    fn test_zero_jitter_reproduces_nominal() {
        let nominal = LaunchConditions::new(4.0, 1.0, WindProfile::Rural);
        let sweep = DispersionSweep::new(3, 1)
            .with_angle_jitter(0.0)
            .with_wind_jitter(0.0);
        assert!(sweep
            .sample_conditions(nominal)
            .iter()
            .all(|c| *c == nominal));
    }
}
