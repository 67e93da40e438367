//! Grid-based collision resolution on a persistent worker pool
//!
//! Overlaps are resolved by positional correction: both particles of an
//! overlapping pair are pushed apart by half the penetration depth. No
//! velocities change; the integrator picks up the displacement implicitly.
//!
//! The interior of the grid (the outermost cell layer is a halo) is split into
//! slabs of whole x columns, one per worker. Positions are gathered into a
//! scratch buffer in grid order, so each slab owns a disjoint slice of it.
//! Workers first resolve the columns whose 3×3×3 neighbourhood stays inside
//! their own slab; the remaining boundary columns are resolved afterwards on
//! the calling thread. No two threads ever write the same particle.

use std::ops::Range;

use glam::Vec3;
use rayon::prelude::*;
use verlet_physics::{Particle, EPSILON};

use crate::SpatialGrid;

/// Push two overlapping spheres apart along their centre line.
///
/// Coincident centres fall back to separating along +x. Returns whether a
/// correction was applied.
pub fn separate(a: &mut Vec3, radius_a: f32, b: &mut Vec3, radius_b: f32) -> bool {
    let axis = *a - *b;
    let mut distance = axis.length();
    let min_distance = radius_a + radius_b;
    if distance >= min_distance {
        return false;
    }

    let normal = if distance > EPSILON {
        axis / distance
    } else {
        distance = 0.0;
        Vec3::X
    };
    let correction = normal * (0.5 * (min_distance - distance));
    *a += correction;
    *b -= correction;
    true
}

/// Resolve the overlap between two particles, if any
pub fn resolve_pair(a: &mut Particle, b: &mut Particle) -> bool {
    separate(&mut a.current, a.radius, &mut b.current, b.radius)
}

/// Contiguous run of grid x columns owned by one worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slab {
    pub start: usize,
    pub end: usize,
}

impl Slab {
    /// Columns whose neighbours all lie inside this slab
    pub fn interior(&self) -> Range<usize> {
        (self.start + 1)..self.end.saturating_sub(1).max(self.start + 1)
    }

    /// Columns that touch a neighbouring slab or the halo
    pub fn boundary(&self) -> impl Iterator<Item = usize> {
        let interior = self.interior();
        (self.start..self.end).filter(move |x| !interior.contains(x))
    }
}

/// Split the interior columns `1..dimension - 1` into at most `workers` slabs
pub fn partition(dimension: usize, workers: usize) -> Vec<Slab> {
    let columns = dimension.saturating_sub(2);
    let workers = workers.clamp(1, columns.max(1));
    let width = columns / workers;
    let remainder = columns % workers;

    let mut start = 1;
    (0..workers)
        .map(|w| {
            let end = start + width + usize::from(w < remainder);
            let slab = Slab { start, end };
            start = end;
            slab
        })
        .filter(|slab| slab.end > slab.start)
        .collect()
}

/// Gathered collision state of one particle
#[derive(Debug, Clone, Copy)]
struct Body {
    position: Vec3,
    radius: f32,
    index: usize,
}

pub struct CollisionResolver {
    pool: rayon::ThreadPool,
    slabs: Vec<Slab>,
    bodies: Vec<Body>,
}

impl CollisionResolver {
    /// Start `workers` threads for a grid of `dimension` cells per axis
    pub fn new(workers: usize, dimension: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("collision-worker-{i}"))
            .build()?;

        Ok(Self {
            pool,
            slabs: partition(dimension, workers),
            bodies: Vec::new(),
        })
    }

    pub fn slabs(&self) -> &[Slab] {
        &self.slabs
    }

    pub fn worker_count(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// One resolution pass over every particle indexed by `grid`.
    ///
    /// `grid` must have been rebuilt from `particles`.
    pub fn resolve(&mut self, particles: &mut [Particle], grid: &SpatialGrid) {
        debug_assert_eq!(grid.len(), particles.len());
        if self.slabs.is_empty() {
            return;
        }

        self.bodies.clear();
        self.bodies.extend(grid.entries().iter().map(|&index| {
            let particle = &particles[index];
            Body {
                position: particle.current,
                radius: particle.radius,
                index,
            }
        }));

        // Phase 1: slab interiors in parallel, each on its own slice
        let mut offset = grid.column_start(self.slabs[0].start);
        let (_, mut rest) = self.bodies.split_at_mut(offset);
        let mut jobs = Vec::with_capacity(self.slabs.len());
        for slab in &self.slabs {
            let end = grid.column_start(slab.end);
            let (slice, tail) = std::mem::take(&mut rest).split_at_mut(end - offset);
            jobs.push((slab, offset, slice));
            rest = tail;
            offset = end;
        }

        self.pool.install(|| {
            jobs.into_par_iter().for_each(|(slab, offset, bodies)| {
                for x in slab.interior() {
                    resolve_column(grid, bodies, offset, x);
                }
            });
        });

        // Phase 2: slab boundaries on this thread
        for slab in &self.slabs {
            for x in slab.boundary() {
                resolve_column(grid, &mut self.bodies, 0, x);
            }
        }

        for body in &self.bodies {
            particles[body.index].current = body.position;
        }
    }
}

/// Resolve every centre cell of column `x` against its 3×3×3 neighbourhood.
///
/// `bodies` starts at entry `offset` of the grid and must cover columns
/// `x - 1..=x + 1`. A pair is handled only from the side with the lower
/// particle index, so each unordered pair is resolved at most once per pass.
fn resolve_column(grid: &SpatialGrid, bodies: &mut [Body], offset: usize, x: usize) {
    let dimension = grid.dimension();
    for y in 1..dimension - 1 {
        for z in 1..dimension - 1 {
            let cell = grid.cell_range(x, y, z);
            if cell.is_empty() {
                continue;
            }

            for nx in x - 1..=x + 1 {
                for ny in y - 1..=y + 1 {
                    for nz in z - 1..=z + 1 {
                        let other = grid.cell_range(nx, ny, nz);
                        for i in cell.clone() {
                            for j in other.clone() {
                                let (a, b) = (i - offset, j - offset);
                                if bodies[a].index < bodies[b].index {
                                    let (a, b) = pair_mut(bodies, a, b);
                                    separate(&mut a.position, a.radius, &mut b.position, b.radius);
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn pair_mut<T>(items: &mut [T], a: usize, b: usize) -> (&mut T, &mut T) {
    debug_assert_ne!(a, b);
    if a < b {
        let (head, tail) = items.split_at_mut(b);
        (&mut head[a], &mut tail[0])
    } else {
        let (head, tail) = items.split_at_mut(a);
        (&mut tail[0], &mut head[b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verlet_physics::ColorCategory;

    const R: f32 = 0.15;

    fn particle(position: Vec3) -> Particle {
        Particle::new(position, Vec3::ZERO, ColorCategory::Blue, R)
    }

    fn run_pass(particles: &mut [Particle], workers: usize) {
        let mut grid = SpatialGrid::new(58, 2.0 * R);
        let mut resolver = CollisionResolver::new(workers, 58).unwrap();
        grid.rebuild(particles);
        resolver.resolve(particles, &grid);
    }

    #[test]
    fn test_head_on_overlap() {
        let mut a = particle(Vec3::new(1.0, 0.0, 0.0));
        let mut b = particle(Vec3::new(1.0 + 1.5 * R, 0.0, 0.0));
        let midpoint = (a.current + b.current) * 0.5;

        assert!(resolve_pair(&mut a, &mut b));

        assert!((a.current.distance(b.current) - 2.0 * R).abs() < 1e-6);
        assert!(((a.current + b.current) * 0.5).abs_diff_eq(midpoint, 1e-6));
        assert!(a.current.x < b.current.x);
        // Previous positions are not touched
        assert_eq!(a.previous, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_separated_pair_untouched() {
        let mut a = particle(Vec3::ZERO);
        let mut b = particle(Vec3::new(0.0, 0.31, 0.0));
        assert!(!resolve_pair(&mut a, &mut b));
        assert_eq!(a.current, Vec3::ZERO);
        assert_eq!(b.current, Vec3::new(0.0, 0.31, 0.0));
    }

    #[test]
    fn test_coincident_fallback_axis() {
        let mut a = particle(Vec3::ONE);
        let mut b = particle(Vec3::ONE);
        assert!(resolve_pair(&mut a, &mut b));
        assert!(a.current.abs_diff_eq(Vec3::new(1.0 + R, 1.0, 1.0), 1e-6));
        assert!(b.current.abs_diff_eq(Vec3::new(1.0 - R, 1.0, 1.0), 1e-6));
    }

    #[test]
    fn test_partition_covers_interior() {
        let slabs = partition(58, 8);
        assert_eq!(slabs.len(), 8);
        assert_eq!(slabs[0].start, 1);
        assert_eq!(slabs[7].end, 57);
        for pair in slabs.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }

        // More workers than columns
        let slabs = partition(5, 16);
        assert_eq!(slabs, [Slab { start: 1, end: 2 }, Slab { start: 2, end: 3 }, Slab { start: 3, end: 4 }]);
    }

    #[test]
    fn test_slab_columns_split() {
        let wide = Slab { start: 8, end: 15 };
        assert_eq!(wide.interior(), 9..14);
        assert_eq!(wide.boundary().collect::<Vec<_>>(), [8, 14]);

        let narrow = Slab { start: 3, end: 5 };
        assert!(narrow.interior().is_empty());
        assert_eq!(narrow.boundary().collect::<Vec<_>>(), [3, 4]);
    }

    #[test]
    fn test_head_on_overlap_through_grid() {
        let mut particles = [particle(Vec3::ZERO), particle(Vec3::new(1.5 * R, 0.0, 0.0))];
        run_pass(&mut particles, 8);

        assert!((particles[0].current.distance(particles[1].current) - 2.0 * R).abs() < 1e-5);
        assert!(particles[0].current.abs_diff_eq(Vec3::new(-0.25 * R, 0.0, 0.0), 1e-5));
        assert!(particles[1].current.abs_diff_eq(Vec3::new(1.75 * R, 0.0, 0.0), 1e-5));
    }

    /// Overlapping pairs centred on every slab boundary and inside every slab
    fn isolated_pairs() -> Vec<Particle> {
        let cell = 2.0 * R;
        let mut particles = Vec::new();
        for (k, slab) in partition(58, 8).iter().enumerate() {
            let boundary_x = (slab.start as f32 - 29.0) * cell;
            let middle_x = ((slab.start + slab.end) as f32 * 0.5 - 29.0) * cell;
            let y = k as f32 * 0.9 - 3.0;
            let z = 1.0 - k as f32 * 0.4;
            let mut pairs = vec![(Vec3::new(middle_x, y, z), Vec3::new(0.6, 0.0, 0.8))];
            // The first slab starts at the halo, which is never a centre column
            if k > 0 {
                pairs.push((Vec3::new(boundary_x, y, z), Vec3::X));
            }
            for (center, direction) in pairs {
                particles.push(particle(center - direction * 0.11));
                particles.push(particle(center + direction * 0.11));
            }
        }
        particles
    }

    #[test]
    fn test_isolated_pairs_separate_across_slabs() {
        let mut particles = isolated_pairs();
        run_pass(&mut particles, 8);

        for pair in particles.chunks(2) {
            let distance = pair[0].current.distance(pair[1].current);
            assert!((distance - 2.0 * R).abs() < 1e-5, "distance {distance}");
        }
    }

    #[test]
    fn test_worker_count_does_not_change_isolated_result() {
        let mut serial = isolated_pairs();
        let mut parallel = serial.clone();
        run_pass(&mut serial, 1);
        run_pass(&mut parallel, 8);

        for (a, b) in serial.iter().zip(&parallel) {
            assert!(a.current.abs_diff_eq(b.current, 1e-6));
        }
    }

    #[test]
    fn test_empty_pass() {
        let mut particles: [Particle; 0] = [];
        run_pass(&mut particles, 4);
    }
}
