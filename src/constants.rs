// Physical Constants
pub const GRAVITY: f64 = 9.81; // m/s²
pub const AIR_DENSITY_SEA_LEVEL: f64 = 1.225; // kg/m³

// Simulation Parameters
pub const TIME_STEP: f64 = 0.02; // s
pub const MAX_SIMULATION_TIME: f64 = 20.0; // s
pub const GROUND_GRACE_TIME: f64 = 0.1; // s, negative altitude tolerated before this

// Launch
pub const DEFAULT_RAIL_LENGTH: f64 = 1.0; // m
pub const DEFAULT_ANGULAR_RESPONSE_INTERVAL: f64 = 0.1; // s
pub const DEFAULT_ENHANCED_ATTITUDE_CONTROL: bool = true;
pub const DEFAULT_WIND_ANGLE_LIMITATION: bool = false;
pub const DEFAULT_FIN_LEAN_MOMENT: bool = true;

// Safety clamps
pub const MAX_VELOCITY_SQUARED: f64 = 10_000.0; // m²/s², used by moment formulas
pub const MAX_SPEED: f64 = 100.0; // m/s
pub const MAX_ANGULAR_VELOCITY: f64 = 5.0; // rad/s, every step
pub const MAX_ANGULAR_VELOCITY_AT_UPDATE: f64 = 3.0; // rad/s, right after the coarse update
pub const MAX_TORQUE: f64 = 1.0; // N·m
pub const MIN_TORQUE_MAGNITUDE: f64 = 1e-4; // N·m
pub const MIN_MOMENT_MAGNITUDE: f64 = 1e-5; // N·m
pub const MIN_ATTITUDE_NUDGE: f64 = 1e-5; // rad
pub const ANGULAR_DAMPING: f64 = 0.85; // per coarse update
pub const ANGLE_WINDOW_CAPACITY: usize = 64;

// Stability
pub const MAX_WINDOW_ANGLE_CHANGE_DEG: f64 = 10.0;
pub const MIN_STABLE_STATIC_MARGIN: f64 = 1.0; // calibers
pub const AMPLIFIED_LAUNCH_ANGLES_DEG: [f64; 2] = [4.0, 18.0];
pub const LAUNCH_ANGLE_TORQUE_GAIN: f64 = 1.2;

// Parachute
pub const PARACHUTE_DEPLOY_DURATION: f64 = 1.0; // s
pub const PARACHUTE_VELOCITY_RETENTION: f64 = 0.1; // velocity kept at full deployment
pub const PARACHUTE_DRAG_COEFFICIENT: f64 = 1.5;
pub const DEPLOYING_LINEAR_DRAG: f64 = 0.05; // N·s/m
pub const DEPLOYING_LINEAR_DRAG_GAIN: f64 = 0.3; // N·s/m at full progress
pub const PARACHUTE_RESTORING_GAIN: f64 = 0.01; // N·m/rad

// Aerodynamic Constants
pub const BODY_DRAG_COEFFICIENT: f64 = 0.5;
pub const CROSSWIND_DRAG_COEFFICIENT: f64 = 0.8;
pub const FIN_DRAG_COEFFICIENT: f64 = 1.2;
pub const FIN_DEFLECTION_CEILING_MM: f64 = 15.0;
pub const SPEED_OF_SOUND: f64 = 343.0; // m/s
pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0; // Pa

// Wind
pub const WIND_REFERENCE_HEIGHT: f64 = 1.5; // m, anemometer height
pub const MAX_WIND_MULTIPLIER: f64 = 3.0;

// Fin structural display ranges
pub const FIN_DIVERGENCE_SPEED_RANGE: (f64, f64) = (20.0, 300.0); // m/s
pub const FIN_FLUTTER_SPEED_RANGE: (f64, f64) = (30.0, 400.0); // m/s
