pub mod environment;
pub mod flight_phase;
pub mod guidance;
pub mod materials;
pub mod parachute;
pub mod propulsion;
pub mod rocket;
