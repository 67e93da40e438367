//! Spherical container constraint

use glam::Vec3;

use crate::constants::CONTAINER_RADIUS;
use crate::particle::Particle;

/// Movable sphere that particles are kept inside.
///
/// Owned by the driving loop and passed to the solver every substep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Container {
    pub center: Vec3,
    pub radius: f32,
}

impl Container {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Move the container by `delta`
    pub fn translate(&mut self, delta: Vec3) {
        self.center += delta;
    }

    /// Topmost point a particle of `radius` can rest at
    pub fn north_pole(&self, radius: f32) -> Vec3 {
        self.center + Vec3::Y * (self.radius - radius)
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(Vec3::ZERO, CONTAINER_RADIUS)
    }
}

/// Project every particle that pokes out of `container` back onto its inner surface.
///
/// Hard positional clamp: previous positions are untouched, so the next
/// integration step damps the radial velocity.
pub fn apply_container(particles: &mut [Particle], container: &Container) {
    for particle in particles.iter_mut() {
        let offset = particle.current - container.center;
        let distance = offset.length();
        let limit = container.radius - particle.radius;
        if distance > limit {
            particle.current = container.center + offset / distance * limit;
        }
    }
}
