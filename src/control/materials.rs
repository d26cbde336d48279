use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::SimulationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FinMaterial {
    Balsa,
    Plywood,
    Cardboard,
    Plastic,
    Fiberglass,
    CarbonFiber,
    Aluminum,
}

impl FinMaterial {
    pub const ALL: [FinMaterial; 7] = [
        FinMaterial::Balsa,
        FinMaterial::Plywood,
        FinMaterial::Cardboard,
        FinMaterial::Plastic,
        FinMaterial::Fiberglass,
        FinMaterial::CarbonFiber,
        FinMaterial::Aluminum,
    ];

    // Pa
    pub fn shear_modulus(self) -> f64 {
        match self {
            FinMaterial::Balsa => 0.2e9,
            FinMaterial::Plywood => 0.6e9,
            FinMaterial::Cardboard => 0.7e9,
            FinMaterial::Plastic => 0.85e9,
            FinMaterial::Fiberglass => 3.8e9,
            FinMaterial::CarbonFiber => 5.0e9,
            FinMaterial::Aluminum => 26.0e9,
        }
    }

    // Pa
    pub fn youngs_modulus(self) -> f64 {
        match self {
            FinMaterial::Balsa => 3.0e9,
            FinMaterial::Plywood => 8.0e9,
            FinMaterial::Cardboard => 2.0e9,
            FinMaterial::Plastic => 2.3e9,
            FinMaterial::Fiberglass => 20.0e9,
            FinMaterial::CarbonFiber => 70.0e9,
            FinMaterial::Aluminum => 69.0e9,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FinMaterial::Balsa => "balsa",
            FinMaterial::Plywood => "plywood",
            FinMaterial::Cardboard => "cardboard",
            FinMaterial::Plastic => "plastic",
            FinMaterial::Fiberglass => "fiberglass",
            FinMaterial::CarbonFiber => "carbon",
            FinMaterial::Aluminum => "aluminum",
        }
    }
}

impl FromStr for FinMaterial {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balsa" => Ok(FinMaterial::Balsa),
            "plywood" => Ok(FinMaterial::Plywood),
            "cardboard" | "paper" => Ok(FinMaterial::Cardboard),
            "plastic" | "abs" | "pla" => Ok(FinMaterial::Plastic),
            "fiberglass" | "gfrp" => Ok(FinMaterial::Fiberglass),
            "carbon" | "carbon_fiber" | "cfrp" => Ok(FinMaterial::CarbonFiber),
            "aluminum" | "aluminium" => Ok(FinMaterial::Aluminum),
            _ => Err(SimulationError::UnknownMaterial(s.to_string())),
        }
    }
}

impl TryFrom<String> for FinMaterial {
    type Error = SimulationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FinMaterial> for String {
    fn from(material: FinMaterial) -> Self {
        material.name().to_string()
    }
}

impl fmt::Display for FinMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
