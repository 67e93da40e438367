//! Fixed-capacity particle storage

use glam::Vec3;
use thiserror::Error;

use crate::constants::{SEED_PREVIOUS_SCALE, SEED_RING_RADIUS};
use crate::particle::{ColorCategory, Particle, ParticleInstance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SpawnError {
    #[error("particle store is full ({capacity} particles)")]
    CapacityReached { capacity: usize },
}

/// Densely packed particle collection with a hard capacity.
///
/// Only live particles are stored, so every index below [`len`](Self::len)
/// is fully initialised and nothing past it can be read. Particles are
/// appended at the cursor and never removed.
#[derive(Debug, Clone)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    capacity: usize,
    seed_radius: f32,
}

impl ParticleStore {
    /// Create an empty store. `seed_radius` is the radius given to particles
    /// created by the seeded layout.
    pub fn new(capacity: usize, seed_radius: f32) -> Self {
        Self {
            particles: Vec::with_capacity(capacity),
            capacity,
            seed_radius,
        }
    }

    /// Append a particle at the cursor, returning its index.
    ///
    /// At capacity nothing is mutated and [`SpawnError::CapacityReached`] is returned.
    pub fn spawn(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        category: ColorCategory,
        radius: f32,
    ) -> Result<usize, SpawnError> {
        if self.is_full() {
            return Err(SpawnError::CapacityReached {
                capacity: self.capacity,
            });
        }

        self.particles
            .push(Particle::new(position, velocity, category, radius));
        Ok(self.particles.len() - 1)
    }

    /// Fill the first `count` slots with the seeded ring layout.
    ///
    /// Live particles beyond `count` are kept. Not a collision-free arrangement.
    pub fn bulk_initialize(&mut self, count: usize) {
        let count = count.min(self.capacity);

        for (i, particle) in self.particles.iter_mut().take(count).enumerate() {
            *particle = seeded_particle(i, self.seed_radius);
        }
        while self.particles.len() < count {
            let i = self.particles.len();
            self.particles.push(seeded_particle(i, self.seed_radius));
        }
    }

    /// Append up to `count` particles from the seeded layout at the cursor.
    /// Returns how many were added.
    pub fn activate_seeded(&mut self, count: usize) -> usize {
        let count = count.min(self.capacity - self.particles.len());
        for _ in 0..count {
            let i = self.particles.len();
            self.particles.push(seeded_particle(i, self.seed_radius));
        }
        count
    }

    /// Toggle render visibility of a live particle. Returns false if `index` is not live.
    pub fn set_visible(&mut self, index: usize, visible: bool) -> bool {
        match self.particles.get_mut(index) {
            Some(particle) => {
                particle.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Active particle count
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.particles.len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of live particles the renderer will draw
    pub fn visible_count(&self) -> usize {
        self.particles.iter().filter(|p| p.visible).count()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Render records for every visible particle, in index order
    pub fn instances(&self) -> impl Iterator<Item = ParticleInstance> + '_ {
        self.particles
            .iter()
            .filter(|p| p.visible)
            .map(Particle::instance)
    }
}

/// Particle `index` of the seeded layout: a ring in the XZ plane, colours
/// cycling red, green, blue.
fn seeded_particle(index: usize, radius: f32) -> Particle {
    const CYCLE: [ColorCategory; 3] = [ColorCategory::Red, ColorCategory::Green, ColorCategory::Blue];

    let angle = index as f32;
    let current = Vec3::new(angle.sin(), 0.0, angle.cos()) * SEED_RING_RADIUS;
    let previous = current * SEED_PREVIOUS_SCALE;

    Particle::new(
        current,
        current - previous,
        CYCLE[index % CYCLE.len()],
        radius,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_at_capacity() {
        let mut store = ParticleStore::new(2, 0.15);
        assert_eq!(store.spawn(Vec3::ZERO, Vec3::ZERO, ColorCategory::Red, 0.15), Ok(0));
        assert_eq!(store.spawn(Vec3::X, Vec3::ZERO, ColorCategory::Blue, 0.15), Ok(1));

        let before = store.as_slice().to_vec();
        assert_eq!(
            store.spawn(Vec3::Y, Vec3::ZERO, ColorCategory::Green, 0.15),
            Err(SpawnError::CapacityReached { capacity: 2 })
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.as_slice(), before.as_slice());
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        let mut store = ParticleStore::new(5, 0.15);
        for i in 0..20 {
            let _ = store.spawn(Vec3::splat(i as f32), Vec3::ZERO, ColorCategory::White, 0.15);
            assert!(store.len() <= store.capacity());
        }
        assert!(store.is_full());
        assert_eq!(store.activate_seeded(3), 0);
    }

    #[test]
    fn test_spawn_sets_previous_from_velocity() {
        let mut store = ParticleStore::new(4, 0.15);
        let index = store
            .spawn(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.5, 0.0, -0.5), ColorCategory::Green, 0.2)
            .unwrap();
        let p = store.as_slice()[index];
        assert_eq!(p.previous, Vec3::new(0.5, 2.0, 3.5));
        assert_eq!(p.mass, ColorCategory::Green.mass());
        assert_eq!(p.radius, 0.2);
    }

    #[test]
    fn test_bulk_initialize_layout() {
        let mut store = ParticleStore::new(10, 0.15);
        store.bulk_initialize(6);
        assert_eq!(store.len(), 6);

        let categories: Vec<_> = store.as_slice().iter().map(|p| p.category).collect();
        assert_eq!(
            categories,
            [
                ColorCategory::Red,
                ColorCategory::Green,
                ColorCategory::Blue,
                ColorCategory::Red,
                ColorCategory::Green,
                ColorCategory::Blue,
            ]
        );
        for p in store.as_slice() {
            assert!((p.current.length() - SEED_RING_RADIUS).abs() < 1e-4);
            assert_eq!(p.current.y, 0.0);
            assert_eq!(p.radius, 0.15);
        }

        // Deterministic
        let mut other = ParticleStore::new(10, 0.15);
        other.bulk_initialize(6);
        assert_eq!(store.as_slice(), other.as_slice());
    }

    #[test]
    fn test_bulk_initialize_clamps_to_capacity() {
        let mut store = ParticleStore::new(3, 0.15);
        store.bulk_initialize(100);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_activate_seeded_continues_layout() {
        let mut store = ParticleStore::new(8, 0.15);
        store.bulk_initialize(5);

        let mut incremental = ParticleStore::new(8, 0.15);
        assert_eq!(incremental.activate_seeded(2), 2);
        assert_eq!(incremental.activate_seeded(3), 3);
        assert_eq!(store.as_slice(), incremental.as_slice());

        assert_eq!(incremental.activate_seeded(10), 3);
        assert!(incremental.is_full());
    }

    #[test]
    fn test_visibility() {
        let mut store = ParticleStore::new(4, 0.15);
        store.bulk_initialize(3);
        assert_eq!(store.visible_count(), 3);

        assert!(store.set_visible(1, false));
        assert!(!store.set_visible(3, false));
        assert_eq!(store.visible_count(), 2);
        assert_eq!(store.len(), 3);

        let instances: Vec<_> = store.instances().collect();
        assert_eq!(instances.len(), 2);
        assert_eq!(instances[1].color, ColorCategory::Blue.color_vector());
    }
}
