//! Error types for building a simulation

use thiserror::Error;

/// Invalid simulation parameters
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamsError {
    #[error("capacity must be at least 1")]
    ZeroCapacity,
    #[error("substep count must be at least 1")]
    ZeroSubsteps,
    #[error("worker count must be at least 1")]
    ZeroWorkers,
    #[error("particle radius must be positive, got {0}")]
    InvalidRadius(f32),
    #[error("grid needs at least 3 cells per axis, got {0}")]
    GridTooSmall(usize),
    #[error("container radius {container_radius} does not fit in a grid of half-extent {half_extent}")]
    ContainerOutsideGrid {
        container_radius: f32,
        half_extent: f32,
    },
}

#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamsError),
    #[error("failed to start collision workers: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),
}
