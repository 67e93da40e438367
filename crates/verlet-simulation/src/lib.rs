//! # Verlet Particle Simulation
//!
//! Substep driver for the particle solver: uniform-grid broad phase,
//! multithreaded collision resolution and the per-frame phase ordering.

pub mod collision;
pub mod error;
pub mod grid;
pub mod params;
pub mod simulation;

pub use collision::*;
pub use error::*;
pub use grid::*;
pub use params::*;
pub use simulation::*;
