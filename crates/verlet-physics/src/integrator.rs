//! Position Verlet integration

use glam::Vec3;

use crate::particle::Particle;

/// Advance every particle by one step of length `dt`.
///
/// The last displacement is carried forward and the accumulated acceleration
/// is applied as `acceleration * dt²`, then cleared.
pub fn integrate(particles: &mut [Particle], dt: f32) {
    let dt2 = dt * dt;
    for particle in particles.iter_mut() {
        let displacement = particle.current - particle.previous;
        particle.previous = particle.current;
        particle.current += displacement + particle.acceleration * dt2;
        particle.acceleration = Vec3::ZERO;
    }
}

/// Drop all pending acceleration
pub fn clear_accelerations(particles: &mut [Particle]) {
    for particle in particles.iter_mut() {
        particle.acceleration = Vec3::ZERO;
    }
}

/// Zero the implied velocity of every particle
pub fn halt(particles: &mut [Particle]) {
    for particle in particles.iter_mut() {
        particle.previous = particle.current;
    }
}
