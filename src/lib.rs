pub mod constants;
pub mod control;
pub mod errors;
pub mod telemetry_system;
pub mod trajectory_system;
pub mod utils;

pub use constants::*;
pub use control::environment::{Environment, WindProfile};
pub use control::flight_phase::{FlightPhase, ParachuteState};
pub use control::materials::FinMaterial;
pub use control::parachute::Parachute;
pub use control::propulsion::{Motor, MotorClass};
pub use control::rocket::{FinCount, NoseShape, RocketGeometry, RocketParameters};
pub use errors::SimulationError;

// Re-export commonly used items from trajectory_system
pub use trajectory_system::aerodynamics::AerodynamicProfile;
pub use trajectory_system::deflection::fin_deflection_mm;
pub use trajectory_system::dispersion::{launch_angle_sweep, DispersionReport, DispersionSweep};
pub use trajectory_system::simulator::{simulate, FlightSimulator, LaunchConditions, SimulationConfig};

// Re-export commonly used items from telemetry_system
pub use telemetry_system::telemetry::{FlightResult, FlightSample, FlightSummary, KeyPoint};

// Re-export commonly used utilities
pub use utils::units::{Grams, Millimeters};
pub use utils::vector2d::Vector2D;
