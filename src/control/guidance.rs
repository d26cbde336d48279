use std::f64::consts::{FRAC_PI_2, PI};

use crate::utils::vector2d::Vector2D;

const BLEND_BASE_RATE: f64 = 0.05; // fraction of the gap closed per step at reference speed
const BLEND_REFERENCE_SPEED: f64 = 30.0; // m/s
const BLEND_WIND_GAIN: f64 = 0.05; // per m/s of crosswind, powered flight only
const MAX_BLEND_STEP: f64 = 0.2; // rad per step

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeGuidance {
    pub enabled: bool,
    pub wind_angle_limitation: bool,
}

impl AttitudeGuidance {
    pub fn new(enabled: bool, wind_angle_limitation: bool) -> Self {
        AttitudeGuidance {
            enabled,
            wind_angle_limitation,
        }
    }

    // nose or tail first, whichever is closer to the current attitude
    pub fn target_angle(&self, omega: f64, velocity: Vector2D, wind: f64, powered: bool) -> f64 {
        let flow = if powered {
            Vector2D::new(velocity.x - wind, velocity.y)
        } else {
            velocity
        };
        if flow.magnitude() < 1e-9 {
            return omega;
        }

        let heading = flow.vertical_angle();
        let mut target = omega + fold_to_line(normalize_angle(heading - omega));

        let moving_upwind = velocity.x * wind < 0.0;
        if self.wind_angle_limitation && moving_upwind {
            target = target.clamp(-FRAC_PI_2, FRAC_PI_2);
        }
        target
    }

    pub fn blend_rate(&self, speed: f64, wind: f64, powered: bool) -> f64 {
        let speed_factor = (speed / BLEND_REFERENCE_SPEED).min(1.0);
        let wind_factor = if powered {
            1.0 + BLEND_WIND_GAIN * wind.abs()
        } else {
            1.0
        };
        BLEND_BASE_RATE * speed_factor * wind_factor
    }

    pub fn attitude_change(&self, omega: f64, velocity: Vector2D, wind: f64, powered: bool) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        let target = self.target_angle(omega, velocity, wind, powered);
        let rate = self.blend_rate(velocity.magnitude(), wind, powered);
        ((target - omega) * rate).clamp(-MAX_BLEND_STEP, MAX_BLEND_STEP)
    }
}

pub fn normalize_angle(angle: f64) -> f64 {
    let two_pi = 2.0 * PI;
    let wrapped = ((angle % two_pi) + two_pi) % two_pi;
    if wrapped > PI {
        wrapped - two_pi
    } else {
        wrapped
    }
}

pub fn fold_to_line(angle: f64) -> f64 {
    if angle > FRAC_PI_2 {
        angle - PI
    } else if angle < -FRAC_PI_2 {
        angle + PI
    } else {
        angle
    }
}
