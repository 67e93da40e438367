//! Force model: mass-scaled gravity, colour-coupled pair forces and impulses
//!
//! Forces are written into each particle's acceleration accumulator and
//! consumed by the next integration step.

use glam::Vec3;

use crate::constants::{EPSILON, RED_COUPLING};
use crate::particle::{ColorCategory, Particle};

/// Symmetric coupling coefficients between colour categories.
///
/// The force between a pair is `K * m_a * m_b`. Positive values attract,
/// negative values repel. Pairs not set are zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CouplingTable {
    coefficients: [[f32; ColorCategory::COUNT]; ColorCategory::COUNT],
}

impl CouplingTable {
    /// Table with every pair uncoupled
    pub const fn empty() -> Self {
        Self {
            coefficients: [[0.0; ColorCategory::COUNT]; ColorCategory::COUNT],
        }
    }

    /// Set the coefficient for a pair (both orders)
    pub fn with(mut self, a: ColorCategory, b: ColorCategory, k: f32) -> Self {
        self.set(a, b, k);
        self
    }

    pub fn set(&mut self, a: ColorCategory, b: ColorCategory, k: f32) {
        self.coefficients[a.index()][b.index()] = k;
        self.coefficients[b.index()][a.index()] = k;
    }

    pub fn coefficient(&self, a: ColorCategory, b: ColorCategory) -> f32 {
        self.coefficients[a.index()][b.index()]
    }

    /// Signed force magnitude between two particles
    pub fn force(&self, a: &Particle, b: &Particle) -> f32 {
        self.coefficient(a.category, b.category) * a.mass * b.mass
    }

    fn is_empty(&self) -> bool {
        self.coefficients.iter().flatten().all(|&k| k == 0.0)
    }
}

impl Default for CouplingTable {
    /// Red particles weakly attract each other; everything else is uncoupled
    fn default() -> Self {
        Self::empty().with(ColorCategory::Red, ColorCategory::Red, RED_COUPLING)
    }
}

/// Add gravity and pairwise coupling forces to every particle.
///
/// Gravity is `gravity * mass` on the y axis, so heavier categories fall
/// faster. The pair pass is O(n²) and skips overlapping or coincident pairs;
/// those are left to collision resolution.
pub fn apply_forces(particles: &mut [Particle], gravity: f32, table: &CouplingTable) {
    for particle in particles.iter_mut() {
        particle.acceleration.y += gravity * particle.mass;
    }

    if table.is_empty() {
        return;
    }

    for j in 1..particles.len() {
        let (head, tail) = particles.split_at_mut(j);
        let b = &mut tail[0];
        for a in head.iter_mut() {
            apply_pair_force(a, b, table);
        }
    }
}

fn apply_pair_force(a: &mut Particle, b: &mut Particle, table: &CouplingTable) {
    let force = table.force(a, b);
    if force == 0.0 {
        return;
    }

    let delta = b.current - a.current;
    let distance = delta.length();
    if distance < EPSILON || distance < a.radius + b.radius {
        return;
    }

    let direction = delta / distance;
    let magnitude = force / (distance * distance);
    a.acceleration += direction * (magnitude / a.mass);
    b.acceleration -= direction * (magnitude / b.mass);
}

/// Push every particle directly away from `center` by `strength`.
///
/// Only the direction depends on position; negative strength pulls inward.
/// Particles exactly at `center` are left alone.
pub fn apply_impulse(particles: &mut [Particle], center: Vec3, strength: f32) {
    for particle in particles.iter_mut() {
        let offset = particle.current - center;
        let distance = offset.length();
        if distance > 0.0 {
            particle.acceleration += offset / distance * strength;
        }
    }
}
