use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

impl Millimeters {
    pub fn to_meters(self) -> f64 {
        self.0 / 1000.0
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grams(pub f64);

impl Grams {
    pub fn to_kilograms(self) -> f64 {
        self.0 / 1000.0
    }

    pub fn value(self) -> f64 {
        self.0
    }
}
