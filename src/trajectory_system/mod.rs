pub mod aerodynamics;
pub mod deflection;
pub mod dispersion;
pub mod kinematics;
pub mod moments;
pub mod simulator;
