//! Simulation parameters

use verlet_physics::{
    CouplingTable, CONTAINER_RADIUS, GRAVITY, GRID_DIMENSION, MAX_PARTICLES, PARTICLE_RADIUS,
    SUBSTEPS, WORKER_COUNT,
};

use crate::ParamsError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParams {
    /// Hard particle limit
    pub capacity: usize,
    /// Radius of seeded particles; also sets the grid cell size (2 × radius)
    pub particle_radius: f32,
    /// Vertical acceleration per unit mass
    pub gravity: f32,
    /// Substeps per frame
    pub substeps: u32,
    /// Collision worker threads
    pub worker_count: usize,
    /// Grid cells per axis
    pub grid_dimension: usize,
    /// Radius of the container the grid must enclose
    pub container_radius: f32,
    /// Colour-pair interaction coefficients
    pub coupling: CouplingTable,
}

impl SimulationParams {
    /// Edge length of one grid cell
    pub fn cell_size(&self) -> f32 {
        self.particle_radius * 2.0
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.capacity == 0 {
            return Err(ParamsError::ZeroCapacity);
        }
        if self.substeps == 0 {
            return Err(ParamsError::ZeroSubsteps);
        }
        if self.worker_count == 0 {
            return Err(ParamsError::ZeroWorkers);
        }
        if self.particle_radius.is_nan() || self.particle_radius <= 0.0 {
            return Err(ParamsError::InvalidRadius(self.particle_radius));
        }
        if self.grid_dimension < 3 {
            return Err(ParamsError::GridTooSmall(self.grid_dimension));
        }

        // The outermost cells are a halo that is never visited as a centre cell
        let half_extent = (self.grid_dimension / 2 - 1) as f32 * self.cell_size();
        if self.container_radius > half_extent {
            return Err(ParamsError::ContainerOutsideGrid {
                container_radius: self.container_radius,
                half_extent,
            });
        }
        Ok(())
    }
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            capacity: MAX_PARTICLES,
            particle_radius: PARTICLE_RADIUS,
            gravity: GRAVITY,
            substeps: SUBSTEPS,
            worker_count: WORKER_COUNT,
            grid_dimension: GRID_DIMENSION,
            container_radius: CONTAINER_RADIUS,
            coupling: CouplingTable::default(),
        }
    }
}
