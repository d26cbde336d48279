use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::errors::SimulationError;
use crate::utils::units::Millimeters;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Parachute {
    pub diameter: Millimeters,
}

impl Parachute {
    pub fn new(diameter: Millimeters) -> Self {
        Parachute { diameter }
    }

    pub fn area(&self) -> f64 {
        let radius = self.diameter.to_meters() / 2.0;
        PI * radius.powi(2)
    }
}

impl FromStr for Parachute {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .trim_start_matches(|c: char| !c.is_ascii_digit())
            .trim_end_matches("mm");

        match digits.parse::<f64>() {
            Ok(diameter) if diameter.is_finite() && diameter > 0.0 => {
                Ok(Parachute::new(Millimeters(diameter)))
            }
            _ => Err(SimulationError::UnknownParachute(s.to_string())),
        }
    }
}

impl TryFrom<String> for Parachute {
    type Error = SimulationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Parachute> for String {
    fn from(parachute: Parachute) -> Self {
        parachute.to_string()
    }
}

impl fmt::Display for Parachute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "φ{}", self.diameter.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_parachute_identifier() {
        assert_eq!(
            "φ300".parse::<Parachute>().unwrap().diameter,
            Millimeters(300.0)
        );
        assert_eq!(
            "180mm".parse::<Parachute>().unwrap().diameter,
            Millimeters(180.0)
        );
        assert_eq!("φ450".parse::<Parachute>().unwrap().to_string(), "φ450");
        assert!(matches!(
            "φ".parse::<Parachute>(),
            Err(SimulationError::UnknownParachute(_))
        ));
        assert!("φ0".parse::<Parachute>().is_err());
    }

    #[test]
    fn test_canopy_area() {
        let chute = Parachute::new(Millimeters(300.0));
        assert_relative_eq!(chute.area(), PI * 0.15 * 0.15, epsilon = 1e-12);
    }
}
