use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    AIR_DENSITY_SEA_LEVEL, GRAVITY, MAX_WIND_MULTIPLIER, WIND_REFERENCE_HEIGHT,
};
use crate::errors::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum WindProfile {
    OpenWater,
    #[default]
    OpenTerrain,
    Rural,
    Suburban,
    Urban,
    DenseUrban,
}

impl WindProfile {
    pub const ALL: [WindProfile; 6] = [
        WindProfile::OpenWater,
        WindProfile::OpenTerrain,
        WindProfile::Rural,
        WindProfile::Suburban,
        WindProfile::Urban,
        WindProfile::DenseUrban,
    ];

    pub fn alpha(self) -> f64 {
        match self {
            WindProfile::OpenWater => 0.10,
            WindProfile::OpenTerrain => 0.143,
            WindProfile::Rural => 0.16,
            WindProfile::Suburban => 0.22,
            WindProfile::Urban => 0.30,
            WindProfile::DenseUrban => 0.40,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            WindProfile::OpenWater => "open_water",
            WindProfile::OpenTerrain => "open_terrain",
            WindProfile::Rural => "rural",
            WindProfile::Suburban => "suburban",
            WindProfile::Urban => "urban",
            WindProfile::DenseUrban => "dense_urban",
        }
    }

    // power law above anemometer height, base wind at or below the ground
    pub fn wind_at(self, base_wind: f64, height: f64) -> f64 {
        if height <= 0.0 {
            return base_wind;
        }
        let multiplier = (height / WIND_REFERENCE_HEIGHT)
            .powf(self.alpha())
            .min(MAX_WIND_MULTIPLIER);
        base_wind * multiplier
    }
}

impl FromStr for WindProfile {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        WindProfile::ALL
            .into_iter()
            .find(|profile| profile.name() == normalized)
            .ok_or_else(|| SimulationError::UnknownWindProfile(s.to_string()))
    }
}

impl TryFrom<String> for WindProfile {
    type Error = SimulationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<WindProfile> for String {
    fn from(profile: WindProfile) -> Self {
        profile.name().to_string()
    }
}

impl fmt::Display for WindProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub air_density: f64,
    pub gravity: f64,
    pub base_wind: f64,
    pub wind_profile: WindProfile,
}

impl Environment {
    pub fn new(base_wind: f64, wind_profile: WindProfile) -> Self {
        Environment {
            air_density: AIR_DENSITY_SEA_LEVEL,
            gravity: GRAVITY,
            base_wind,
            wind_profile,
        }
    }

    pub fn wind_at(&self, height: f64) -> f64 {
        self.wind_profile.wind_at(self.base_wind, height)
    }

    pub fn dynamic_pressure(&self, speed_squared: f64) -> f64 {
        0.5 * self.air_density * speed_squared
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_ground_level_wind_is_base_wind() {
        for profile in WindProfile::ALL {
            assert_eq!(profile.wind_at(4.0, 0.0), 4.0);
            assert_eq!(profile.wind_at(-3.5, -2.0), -3.5);
        }
    }

    #[test]
    fn test_reference_height_is_unity() {
        for profile in WindProfile::ALL {
            assert_relative_eq!(profile.wind_at(5.0, WIND_REFERENCE_HEIGHT), 5.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_power_law_scaling() {
        let expected = 5.0 * (30.0_f64 / 1.5).powf(0.143);
        assert_relative_eq!(
            WindProfile::OpenTerrain.wind_at(5.0, 30.0),
            expected,
            epsilon = 1e-12
        );
        // rougher terrain grows faster with height
        assert!(WindProfile::DenseUrban.wind_at(5.0, 30.0) > WindProfile::OpenWater.wind_at(5.0, 30.0));
    }

    #[test]
    fn test_multiplier_is_capped() {
        let high = WindProfile::DenseUrban.wind_at(2.0, 10_000.0);
        assert_relative_eq!(high, 2.0 * MAX_WIND_MULTIPLIER);
        let negative = WindProfile::DenseUrban.wind_at(-2.0, 10_000.0);
        assert_relative_eq!(negative, -2.0 * MAX_WIND_MULTIPLIER);
    }

    #[test]
    fn test_profile_names() {
        assert_eq!("Dense Urban".parse::<WindProfile>(), Ok(WindProfile::DenseUrban));
        assert_eq!("open-water".parse::<WindProfile>(), Ok(WindProfile::OpenWater));
        assert!("tundra".parse::<WindProfile>().is_err());
    }

    #[test]
    fn test_environment_dynamic_pressure() {
        let environment = Environment::new(0.0, WindProfile::default());
        assert_relative_eq!(environment.dynamic_pressure(100.0), 61.25);
        assert_relative_eq!(environment.gravity, GRAVITY);
    }
}
