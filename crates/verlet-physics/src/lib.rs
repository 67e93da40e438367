//! # Verlet Particle Physics
//!
//! Particle model and the per-particle passes of the solver: forces,
//! container constraint and position Verlet integration.

pub mod constants;
pub mod constraint;
pub mod forces;
pub mod integrator;
pub mod particle;
pub mod store;

pub use constants::*;
pub use constraint::*;
pub use forces::*;
pub use integrator::*;
pub use particle::*;
pub use store::*;
