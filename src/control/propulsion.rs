use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::SimulationError;

// (time s, thrust N) samples of the certified curves
const A8_THRUST_CURVE: &[(f64, f64)] = &[
    (0.000, 0.000),
    (0.041, 0.512),
    (0.084, 2.115),
    (0.127, 4.358),
    (0.166, 6.794),
    (0.192, 9.294),
    (0.206, 10.743),
    (0.226, 9.294),
    (0.239, 6.794),
    (0.249, 4.998),
    (0.263, 3.716),
    (0.276, 3.172),
    (0.301, 2.884),
    (0.350, 2.820),
    (0.466, 2.820),
    (0.582, 2.820),
    (0.614, 2.884),
    (0.640, 2.852),
    (0.663, 2.211),
    (0.687, 0.961),
    (0.730, 0.000),
];

const B6_THRUST_CURVE: &[(f64, f64)] = &[
    (0.000, 0.000),
    (0.023, 0.688),
    (0.057, 2.457),
    (0.089, 4.816),
    (0.116, 7.274),
    (0.148, 9.929),
    (0.171, 12.140),
    (0.191, 11.695),
    (0.200, 10.719),
    (0.209, 9.240),
    (0.230, 7.667),
    (0.255, 6.488),
    (0.305, 5.505),
    (0.375, 4.816),
    (0.477, 4.620),
    (0.580, 4.620),
    (0.671, 4.521),
    (0.746, 4.521),
    (0.786, 4.226),
    (0.802, 4.325),
    (0.825, 3.145),
    (0.839, 1.572),
    (0.860, 0.000),
];

const C6_THRUST_CURVE: &[(f64, f64)] = &[
    (0.000, 0.000),
    (0.031, 0.946),
    (0.092, 4.826),
    (0.139, 9.936),
    (0.192, 14.090),
    (0.209, 11.446),
    (0.231, 7.381),
    (0.248, 6.151),
    (0.292, 5.489),
    (0.370, 4.921),
    (0.475, 4.448),
    (0.671, 4.258),
    (0.702, 4.542),
    (0.723, 4.164),
    (0.850, 4.448),
    (1.063, 4.353),
    (1.211, 4.353),
    (1.242, 4.069),
    (1.303, 4.258),
    (1.468, 4.353),
    (1.656, 4.448),
    (1.821, 4.448),
    (1.834, 2.933),
    (1.847, 1.325),
    (1.860, 0.000),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MotorClass {
    A8,
    B6,
    C6,
}

impl MotorClass {
    fn thrust_curve(self) -> &'static [(f64, f64)] {
        match self {
            MotorClass::A8 => A8_THRUST_CURVE,
            MotorClass::B6 => B6_THRUST_CURVE,
            MotorClass::C6 => C6_THRUST_CURVE,
        }
    }

    fn code(self) -> &'static str {
        match self {
            MotorClass::A8 => "A8",
            MotorClass::B6 => "B6",
            MotorClass::C6 => "C6",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Motor {
    pub class: MotorClass,
    pub ejection_delay: u32,
}

impl Motor {
    pub fn new(class: MotorClass, ejection_delay: u32) -> Self {
        Motor {
            class,
            ejection_delay,
        }
    }

    pub fn thrust_samples(&self) -> &'static [(f64, f64)] {
        self.class.thrust_curve()
    }

    pub fn burn_time(&self) -> f64 {
        self.thrust_samples().last().map_or(0.0, |&(time, _)| time)
    }

    pub fn ejection_time(&self) -> f64 {
        self.burn_time() + f64::from(self.ejection_delay)
    }

    pub fn is_burning(&self, time: f64) -> bool {
        time >= 0.0 && time < self.burn_time()
    }

    pub fn thrust_at(&self, time: f64) -> f64 {
        if !self.is_burning(time) {
            return 0.0;
        }

        self.thrust_samples()
            .windows(2)
            .find(|pair| time >= pair[0].0 && time < pair[1].0)
            .map_or(0.0, |pair| {
                let (t0, f0) = pair[0];
                let (t1, f1) = pair[1];
                f0 + (f1 - f0) * (time - t0) / (t1 - t0)
            })
    }

    pub fn total_impulse(&self) -> f64 {
        self.thrust_samples()
            .windows(2)
            .map(|pair| 0.5 * (pair[0].1 + pair[1].1) * (pair[1].0 - pair[0].0))
            .sum()
    }
}

impl FromStr for Motor {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || SimulationError::UnknownMotor(s.to_string());
        let (class_code, delay) = s.trim().split_once('-').ok_or_else(unknown)?;

        let class = match class_code.to_ascii_uppercase().as_str() {
            "A8" => MotorClass::A8,
            "B6" => MotorClass::B6,
            "C6" => MotorClass::C6,
            _ => return Err(unknown()),
        };
        let ejection_delay = delay.parse::<u32>().map_err(|_| unknown())?;

        Ok(Motor::new(class, ejection_delay))
    }
}

impl TryFrom<String> for Motor {
    type Error = SimulationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Motor> for String {
    fn from(motor: Motor) -> Self {
        motor.to_string()
    }
}

impl fmt::Display for Motor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.class.code(), self.ejection_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_motor_identifier() {
        let motor: Motor = "C6-5".parse().unwrap();
        assert_eq!(motor.class, MotorClass::C6);
        assert_eq!(motor.ejection_delay, 5);
        assert_eq!(motor.to_string(), "C6-5");

        assert_eq!("b6-0".parse::<Motor>().unwrap().ejection_delay, 0);
        assert!(matches!("C6".parse::<Motor>(), Err(SimulationError::UnknownMotor(_))));
        assert!("D12-5".parse::<Motor>().is_err());
        assert!("C6-x".parse::<Motor>().is_err());
    }

    #[test]
    fn test_burn_and_ejection_times() {
        let motor: Motor = "C6-5".parse().unwrap();
        assert_relative_eq!(motor.burn_time(), 1.86);
        assert_relative_eq!(motor.ejection_time(), 6.86, epsilon = 1e-12);
    }

    #[test]
    fn test_thrust_interpolation() {
        let motor = Motor::new(MotorClass::C6, 3);
        assert_relative_eq!(motor.thrust_at(0.192), 14.090, epsilon = 1e-9);
        // halfway between 0.139 s and 0.192 s
        let mid = (0.139 + 0.192) / 2.0;
        assert_relative_eq!(motor.thrust_at(mid), (9.936 + 14.090) / 2.0, epsilon = 1e-9);
        assert_eq!(motor.thrust_at(-0.1), 0.0);
        assert_eq!(motor.thrust_at(1.86), 0.0);
        assert_eq!(motor.thrust_at(5.0), 0.0);
    }

    #[test]
    fn test_total_impulse_matches_class() {
        // NAR impulse classes: A ≤ 2.5, B ≤ 5, C ≤ 10 N·s
        let a8 = Motor::new(MotorClass::A8, 3).total_impulse();
        let b6 = Motor::new(MotorClass::B6, 4).total_impulse();
        let c6 = Motor::new(MotorClass::C6, 5).total_impulse();
        assert!(a8 > 1.25 && a8 <= 2.5, "A8 impulse {}", a8);
        assert!(b6 > 2.5 && b6 <= 5.0, "B6 impulse {}", b6);
        assert!(c6 > 5.0 && c6 <= 10.0, "C6 impulse {}", c6);
    }
}
