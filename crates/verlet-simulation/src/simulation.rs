//! Simulation context and substep driver
//!
//! Owns every piece of solver state (particles, grid, collision workers) so
//! the driving loop only deals with one value.

use glam::Vec3;
use verlet_physics::{
    apply_container, apply_forces, apply_impulse, clear_accelerations, halt, integrate,
    ColorCategory, Container, Particle, ParticleInstance, ParticleStore,
};

use crate::{CollisionResolver, SimulationError, SimulationParams, SpatialGrid};

pub struct Simulation {
    params: SimulationParams,
    store: ParticleStore,
    grid: SpatialGrid,
    resolver: CollisionResolver,
}

impl Simulation {
    pub fn new(params: SimulationParams) -> Result<Self, SimulationError> {
        params.validate()?;

        let store = ParticleStore::new(params.capacity, params.particle_radius);
        let grid = SpatialGrid::new(params.grid_dimension, params.cell_size());
        let resolver = CollisionResolver::new(params.worker_count, params.grid_dimension)?;

        log::info!(
            "Simulation ready: capacity {}, {}³ grid of {:.2} cells, {} collision workers in {} slabs",
            params.capacity,
            params.grid_dimension,
            params.cell_size(),
            resolver.worker_count(),
            resolver.slabs().len()
        );

        Ok(Self {
            params,
            store,
            grid,
            resolver,
        })
    }

    /// Append a particle. Returns false (and changes nothing) once capacity is reached.
    pub fn spawn(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        category: ColorCategory,
        radius: f32,
    ) -> bool {
        match self.store.spawn(position, velocity, category, radius) {
            Ok(_) => true,
            Err(err) => {
                log::debug!("Spawn discarded: {err}");
                false
            }
        }
    }

    /// Fill the first `count` slots with the seeded ring layout
    pub fn bulk_initialize(&mut self, count: usize) {
        self.store.bulk_initialize(count);
        log::info!("Seeded {} particles", self.store.len());
    }

    /// Activate up to `count` more particles from the seeded layout
    pub fn activate_seeded(&mut self, count: usize) -> usize {
        self.store.activate_seeded(count)
    }

    /// Push every particle away from `center` (towards it for negative `strength`)
    pub fn apply_impulse(&mut self, center: Vec3, strength: f32) {
        log::debug!("Impulse of {strength} at {center}");
        apply_impulse(self.store.as_mut_slice(), center, strength);
    }

    /// Advance one substep of length `sub_dt`.
    ///
    /// Phases run strictly in order: forces, optional acceleration clear,
    /// grid rebuild and collisions, container, optional velocity clear,
    /// integration.
    pub fn run_substep(&mut self, sub_dt: f32, clear_accels: bool, container: &Container) {
        let particles = self.store.as_mut_slice();

        apply_forces(particles, self.params.gravity, &self.params.coupling);
        if clear_accels {
            clear_accelerations(particles);
        }

        self.grid.rebuild(particles);
        self.resolver.resolve(particles, &self.grid);

        apply_container(particles, container);
        if clear_accels {
            halt(particles);
        }

        integrate(particles, sub_dt);
    }

    /// Advance one rendered frame of `frame_dt` seconds in equal substeps
    pub fn step_frame(&mut self, frame_dt: f32, clear_accels: bool, container: &Container) {
        let sub_dt = frame_dt / self.params.substeps as f32;
        for _ in 0..self.params.substeps {
            self.run_substep(sub_dt, clear_accels, container);
        }
        log::trace!(
            "Frame of {frame_dt:.4}s: {} particles, {} occupied cells",
            self.store.len(),
            self.grid.occupied_cells()
        );
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn active_count(&self) -> usize {
        self.store.len()
    }

    pub fn visible_count(&self) -> usize {
        self.store.visible_count()
    }

    pub fn capacity(&self) -> usize {
        self.store.capacity()
    }

    pub fn particles(&self) -> &[Particle] {
        self.store.as_slice()
    }

    pub fn set_visible(&mut self, index: usize, visible: bool) -> bool {
        self.store.set_visible(index, visible)
    }

    /// Grid as of the last substep
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Visible particles as render records
    pub fn instances(&self) -> impl Iterator<Item = ParticleInstance> + '_ {
        self.store.instances()
    }

    /// Replace the contents of `out` with the current render records
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.extend(self.store.instances());
    }
}
