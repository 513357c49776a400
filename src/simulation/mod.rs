pub mod states;
pub mod params;
pub mod rules;
pub mod homing;
pub mod engine;
pub mod integrator;
pub mod scenario;
