pub mod ascii;
#[cfg(feature = "viewer")]
pub mod boids_vis3d;
