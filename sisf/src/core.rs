mod periodic_box;
mod trajectory;
mod wave_vectors;
mod correlation;

pub use {
    periodic_box::*,
    trajectory::*,
    wave_vectors::*,
    correlation::*,
};

// Aliases for vectors and points
pub type Vector3d = nalgebra::Vector3<f64>;
pub type Pos = nalgebra::Point3<f64>; // Particle position
