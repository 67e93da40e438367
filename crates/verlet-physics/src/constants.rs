//! Physical constants for the particle solver
//!
//! Values are tuned for a real-time scene of a few thousand small spheres
//! inside a container a few metres across.

/// Vertical gravitational acceleration, scaled by particle mass when applied
pub const GRAVITY: f32 = -9.8;

/// Default particle radius
pub const PARTICLE_RADIUS: f32 = 0.15;

/// Default container sphere radius
pub const CONTAINER_RADIUS: f32 = 6.0;

/// Maximum number of particles a store holds by default
pub const MAX_PARTICLES: usize = 10_000;

/// Distance below which two particles are treated as coincident
pub const EPSILON: f32 = 1e-6;

/// Cells per axis of the collision grid (container radius / particle radius + margin)
pub const GRID_DIMENSION: usize = 58;

/// Substeps per rendered frame
pub const SUBSTEPS: u32 = 8;

/// Collision worker threads
pub const WORKER_COUNT: usize = 8;

/// Multiplier turning per-step displacement into the speed value handed to the renderer
pub const SPEED_SCALE: f32 = 10.0;

/// Radius of the circle used by the seeded initial layout
pub const SEED_RING_RADIUS: f32 = 7.0;

/// Previous-position shrink factor of the seeded layout (gives a slight outward drift)
pub const SEED_PREVIOUS_SCALE: f32 = 0.999;

/// Red-red coupling coefficient of the default interaction table
pub const RED_COUPLING: f32 = 0.5;
