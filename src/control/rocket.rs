use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::control::materials::FinMaterial;
use crate::control::parachute::Parachute;
use crate::control::propulsion::Motor;
use crate::errors::SimulationError;
use crate::utils::units::{Grams, Millimeters};

pub const SQRT_3_OVER_2: f64 = 0.866_025_403_784_438_6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NoseShape {
    Cone,
    Parabola,
    Ogive,
}

impl NoseShape {
    pub fn name(self) -> &'static str {
        match self {
            NoseShape::Cone => "cone",
            NoseShape::Parabola => "parabola",
            NoseShape::Ogive => "ogive",
        }
    }
}

impl FromStr for NoseShape {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cone" | "conical" => Ok(NoseShape::Cone),
            "parabola" | "parabolic" => Ok(NoseShape::Parabola),
            "ogive" => Ok(NoseShape::Ogive),
            _ => Err(SimulationError::UnknownNoseShape(s.to_string())),
        }
    }
}

impl TryFrom<String> for NoseShape {
    type Error = SimulationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NoseShape> for String {
    fn from(shape: NoseShape) -> Self {
        shape.name().to_string()
    }
}

impl fmt::Display for NoseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// three fins at 120° show two foreshortened fins partly hidden by the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FinCount {
    Three,
    Four,
}

impl FinCount {
    pub fn count(self) -> u32 {
        match self {
            FinCount::Three => 3,
            FinCount::Four => 4,
        }
    }

    pub fn side_projection_factor(self) -> f64 {
        match self {
            FinCount::Three => SQRT_3_OVER_2,
            FinCount::Four => 1.0,
        }
    }

    pub fn side_overlap_area(self, root_chord: f64, body_radius: f64) -> f64 {
        match self {
            FinCount::Three => 2.0 * root_chord * body_radius * (1.0 - SQRT_3_OVER_2),
            FinCount::Four => 0.0,
        }
    }

    pub fn exposed_side_area(self, single_fin_area: f64, root_chord: f64, body_radius: f64) -> f64 {
        let projected = 2.0 * single_fin_area * self.side_projection_factor();
        (projected - self.side_overlap_area(root_chord, body_radius)).max(0.0)
    }

    pub fn lean_area(self, single_fin_area: f64) -> f64 {
        f64::from(self.count()) / 2.0 * single_fin_area * self.side_projection_factor()
    }
}

impl TryFrom<u32> for FinCount {
    type Error = SimulationError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(FinCount::Three),
            4 => Ok(FinCount::Four),
            other => Err(SimulationError::UnsupportedFinCount(other)),
        }
    }
}

impl From<FinCount> for u32 {
    fn from(fins: FinCount) -> Self {
        fins.count()
    }
}

// lengths in mm, mass in g
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RocketParameters {
    pub nose_shape: NoseShape,
    pub nose_height: Millimeters,
    pub body_height: Millimeters,
    pub body_width: Millimeters,
    pub fin_height: Millimeters,
    pub fin_base_width: Millimeters,
    pub fin_tip_width: Millimeters,
    pub fin_sweep_length: Millimeters,
    pub fin_thickness: Millimeters,
    pub fin_material: FinMaterial,
    pub fin_count: FinCount,
    pub motor: Motor,
    pub parachute: Parachute,
    pub weight: Grams,
    pub center_of_gravity: Millimeters,
}

impl RocketParameters {
    pub fn sport_model() -> Self {
        RocketParameters {
            nose_shape: NoseShape::Cone,
            nose_height: Millimeters(100.0),
            body_height: Millimeters(400.0),
            body_width: Millimeters(40.0),
            fin_height: Millimeters(60.0),
            fin_base_width: Millimeters(80.0),
            fin_tip_width: Millimeters(40.0),
            fin_sweep_length: Millimeters(20.0),
            fin_thickness: Millimeters(2.0),
            fin_material: FinMaterial::Balsa,
            fin_count: FinCount::Four,
            motor: Motor::new(crate::control::propulsion::MotorClass::C6, 5),
            parachute: Parachute::new(Millimeters(300.0)),
            weight: Grams(200.0),
            center_of_gravity: Millimeters(250.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocketGeometry {
    pub nose_shape: NoseShape,
    pub nose_height: f64,
    pub body_height: f64,
    pub body_diameter: f64,
    pub fin_height: f64,
    pub fin_root_chord: f64,
    pub fin_tip_chord: f64,
    pub fin_sweep: f64,
    pub fin_thickness: f64,
    pub fin_material: FinMaterial,
    pub fins: FinCount,
    pub mass: f64,
    pub center_of_gravity: f64,
}

impl RocketGeometry {
    pub fn from_parameters(params: &RocketParameters) -> Result<Self, SimulationError> {
        let positive = |field: &'static str, value: f64| -> Result<f64, SimulationError> {
            if value.is_finite() && value > 0.0 {
                Ok(value)
            } else {
                Err(SimulationError::invalid(
                    field,
                    format!("must be a positive number, got {}", value),
                ))
            }
        };
        let non_negative = |field: &'static str, value: f64| -> Result<f64, SimulationError> {
            if value.is_finite() && value >= 0.0 {
                Ok(value)
            } else {
                Err(SimulationError::invalid(
                    field,
                    format!("must be a non-negative number, got {}", value),
                ))
            }
        };

        Ok(RocketGeometry {
            nose_shape: params.nose_shape,
            nose_height: non_negative("noseHeight", params.nose_height.to_meters())?,
            body_height: positive("bodyHeight", params.body_height.to_meters())?,
            body_diameter: positive("bodyWidth", params.body_width.to_meters())?,
            fin_height: non_negative("finHeight", params.fin_height.to_meters())?,
            fin_root_chord: non_negative("finBaseWidth", params.fin_base_width.to_meters())?,
            fin_tip_chord: non_negative("finTipWidth", params.fin_tip_width.to_meters())?,
            fin_sweep: non_negative("finSweepLength", params.fin_sweep_length.to_meters())?,
            fin_thickness: non_negative("finThickness", params.fin_thickness.to_meters())?,
            fin_material: params.fin_material,
            fins: params.fin_count,
            mass: positive("weight", params.weight.to_kilograms())?,
            center_of_gravity: non_negative(
                "centerOfGravity",
                params.center_of_gravity.to_meters(),
            )?,
        })
    }

    pub fn body_radius(&self) -> f64 {
        self.body_diameter / 2.0
    }

    pub fn total_length(&self) -> f64 {
        self.nose_height + self.body_height
    }

    pub fn fin_root_leading_edge(&self) -> f64 {
        self.total_length() - self.fin_root_chord
    }

    pub fn taper_ratio(&self) -> f64 {
        if self.fin_root_chord > 0.0 {
            self.fin_tip_chord / self.fin_root_chord
        } else {
            0.0
        }
    }

    pub fn sweep_angle(&self) -> f64 {
        self.fin_sweep.atan2(self.fin_height)
    }

    pub fn moment_of_inertia(&self) -> f64 {
        self.mass * (0.0833 * self.total_length().powi(2) + 0.25 * self.body_radius().powi(2))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_geometry_converts_millimeters_to_meters() {
        let geometry = RocketGeometry::from_parameters(&RocketParameters::sport_model()).unwrap();
        assert_relative_eq!(geometry.nose_height, 0.1);
        assert_relative_eq!(geometry.body_diameter, 0.04);
        assert_relative_eq!(geometry.fin_thickness, 0.002);
        assert_relative_eq!(geometry.mass, 0.2);
        assert_relative_eq!(geometry.center_of_gravity, 0.25);
        assert_relative_eq!(geometry.total_length(), 0.5);
        assert_relative_eq!(geometry.fin_root_leading_edge(), 0.42, epsilon = 1e-12);
        assert_relative_eq!(geometry.taper_ratio(), 0.5);
    }

    #[test]
    fn test_invalid_geometry_is_rejected() {
        let mut params = RocketParameters::sport_model();
        params.body_width = Millimeters(0.0);
        assert!(matches!(
            RocketGeometry::from_parameters(&params),
            Err(SimulationError::InvalidParameter { field: "bodyWidth", .. })
        ));

        let mut params = RocketParameters::sport_model();
        params.fin_height = Millimeters(f64::NAN);
        assert!(RocketGeometry::from_parameters(&params).is_err());
    }

    #[test]
    fn test_moment_of_inertia_uses_slender_rod_coefficient() {
        let geometry = RocketGeometry::from_parameters(&RocketParameters::sport_model()).unwrap();
        let rod = 0.2 * 0.0833 * 0.5 * 0.5;
        let disk = 0.2 * 0.25 * 0.02 * 0.02;
        assert_relative_eq!(geometry.moment_of_inertia(), rod + disk, epsilon = 1e-12);
        // a 0.833 body-length coefficient would be ten times the uniform-rod value m·L²/12
        assert!(geometry.moment_of_inertia() < 0.2 * 0.5 * 0.5 / 12.0 * 1.1);
    }

    #[test]
    fn test_fin_count_projection() {
        assert_eq!(FinCount::Four.side_projection_factor(), 1.0);
        assert_relative_eq!(FinCount::Three.side_projection_factor(), 3.0_f64.sqrt() / 2.0);
        assert_eq!(FinCount::Four.side_overlap_area(0.08, 0.02), 0.0);
        assert!(FinCount::Three.side_overlap_area(0.08, 0.02) > 0.0);

        let four = FinCount::Four.exposed_side_area(0.0036, 0.08, 0.02);
        let three = FinCount::Three.exposed_side_area(0.0036, 0.08, 0.02);
        assert_relative_eq!(four, 0.0072);
        assert!(three < four);
    }

    #[test]
    fn test_fin_count_conversion() {
        assert_eq!(FinCount::try_from(3), Ok(FinCount::Three));
        assert_eq!(u32::from(FinCount::Four), 4);
        assert_eq!(FinCount::try_from(5), Err(SimulationError::UnsupportedFinCount(5)));
    }

    #[test]
    fn test_parameters_deserialize_from_interface_json() {
        let json = r#"{
            "noseShape": "ogive",
            "noseHeight": 90, "bodyHeight": 350, "bodyWidth": 30,
            "finHeight": 50, "finBaseWidth": 70, "finTipWidth": 30,
            "finSweepLength": 25, "finThickness": 3,
            "finMaterial": "plywood", "finCount": 3,
            "motor": "B6-4", "parachute": "φ180",
            "weight": 120, "centerOfGravity": 220
        }"#;
        let params: RocketParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.nose_shape, NoseShape::Ogive);
        assert_eq!(params.fin_count, FinCount::Three);
        assert_eq!(params.motor.ejection_delay, 4);
        assert_eq!(params.parachute.diameter, Millimeters(180.0));

        let bad = json.replace("\"finCount\": 3", "\"finCount\": 6");
        assert!(serde_json::from_str::<RocketParameters>(&bad).is_err());
    }
}
