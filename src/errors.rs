use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Invalid parameter `{field}`: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("Unknown motor: {0}")]
    UnknownMotor(String),

    #[error("Unknown parachute: {0}")]
    UnknownParachute(String),

    #[error("Unknown fin material: {0}")]
    UnknownMaterial(String),

    #[error("Unknown nose shape: {0}")]
    UnknownNoseShape(String),

    #[error("Unsupported fin count: {0} (expected 3 or 4)")]
    UnsupportedFinCount(u32),

    #[error("Unknown wind profile: {0}")]
    UnknownWindProfile(String),

    #[error("Physics error: {0}")]
    PhysicsError(String),
}

impl SimulationError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            field,
            reason: reason.into(),
        }
    }
}

pub fn ensure_finite(quantity: &str, value: f64) -> Result<f64, SimulationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SimulationError::PhysicsError(format!(
            "{} is not finite ({})",
            quantity, value
        )))
    }
}
