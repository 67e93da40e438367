//! Particle records and colour categories

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::constants::SPEED_SCALE;

/// Closed set of particle classes. Drives mass, display colour and force coupling.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorCategory {
    Red = 0,
    Green = 1,
    Blue = 2,
    White = 3,
}

impl ColorCategory {
    /// Number of categories, used to size lookup tables
    pub const COUNT: usize = 4;

    /// All categories in table order
    pub const ALL: [ColorCategory; Self::COUNT] = [
        ColorCategory::Red,
        ColorCategory::Green,
        ColorCategory::Blue,
        ColorCategory::White,
    ];

    /// Mass of every particle in this category. Heavier categories sink faster.
    pub const fn mass(self) -> f32 {
        match self {
            ColorCategory::Red => 20.0,
            ColorCategory::Green => 2.0,
            ColorCategory::Blue => 1.0,
            ColorCategory::White => 0.8,
        }
    }

    /// RGB colour handed to the renderer
    pub const fn color_vector(self) -> [f32; 3] {
        match self {
            ColorCategory::Red => [1.0, 0.0, 0.0],
            ColorCategory::Green => [0.0, 1.0, 0.0],
            ColorCategory::Blue => [0.0, 0.0, 1.0],
            ColorCategory::White => [1.0, 1.0, 1.0],
        }
    }

    /// Table index of this category
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One simulated sphere.
///
/// Velocity is never stored: it is the difference between `current` and
/// `previous` over the last step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub current: Vec3,
    pub previous: Vec3,
    /// Accumulated acceleration, cleared by every integration step
    pub acceleration: Vec3,
    pub radius: f32,
    pub mass: f32,
    pub category: ColorCategory,
    /// Only visible particles are emitted to the renderer
    pub visible: bool,
}

impl Particle {
    /// Create a particle at `position` moving by `velocity` per step
    pub fn new(position: Vec3, velocity: Vec3, category: ColorCategory, radius: f32) -> Self {
        Self {
            current: position,
            previous: position - velocity,
            acceleration: Vec3::ZERO,
            radius,
            mass: category.mass(),
            category,
            visible: true,
        }
    }

    /// Displacement over the last step
    pub fn displacement(&self) -> Vec3 {
        self.current - self.previous
    }

    /// Velocity implied by the last step of length `dt`
    pub fn velocity(&self, dt: f32) -> Vec3 {
        self.displacement() / dt
    }

    /// Speed value used for render shading
    pub fn display_speed(&self) -> f32 {
        self.current.distance(self.previous) * SPEED_SCALE
    }

    /// Per-instance record for the renderer
    pub fn instance(&self) -> ParticleInstance {
        ParticleInstance {
            position: self.current.to_array(),
            speed: self.display_speed(),
            color: self.category.color_vector(),
            _padding: 0.0,
        }
    }
}

/// Render-facing particle record
/// Aligned so a slice can be uploaded to an instance buffer as-is
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub speed: f32,
    pub color: [f32; 3],
    pub _padding: f32,
}
