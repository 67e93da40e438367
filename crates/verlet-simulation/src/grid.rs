//! Uniform 3D bucket grid for collision broad phase
//!
//! Rebuilt from scratch every substep. Buckets hold particle indices, never
//! particles. Storage is a counting sort: `cell_start` holds prefix sums over
//! per-cell counts and `entries` holds the indices grouped by cell. Both
//! buffers are reused across rebuilds.
//!
//! Cells are flattened x-major, so every x column (all y, z for one x) is a
//! contiguous run of `entries`. The collision resolver relies on this to hand
//! each worker a disjoint slice.

use std::ops::Range;

use glam::{UVec3, Vec3};
use verlet_physics::Particle;

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    dimension: usize,
    cell_size: f32,
    /// `cell_start[c]..cell_start[c + 1]` is the entry range of cell `c`
    cell_start: Vec<usize>,
    entries: Vec<usize>,
}

impl SpatialGrid {
    /// Grid of `dimension³` cells of edge `cell_size`, centred on the origin
    pub fn new(dimension: usize, cell_size: f32) -> Self {
        let cells = dimension * dimension * dimension;
        Self {
            dimension,
            cell_size,
            cell_start: vec![0; cells + 1],
            entries: Vec::new(),
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing `position`. Positions outside the grid land in the
    /// nearest border cell.
    pub fn cell_of(&self, position: Vec3) -> UVec3 {
        let half = (self.dimension / 2) as f32;
        let max = (self.dimension - 1) as f32;
        ((position / self.cell_size).floor() + Vec3::splat(half))
            .clamp(Vec3::ZERO, Vec3::splat(max))
            .as_uvec3()
    }

    /// Clear every bucket and insert all `particles` by index
    pub fn rebuild(&mut self, particles: &[Particle]) {
        self.cell_start.fill(0);
        for particle in particles {
            let cell = self.flat_index_of(particle.current);
            self.cell_start[cell + 1] += 1;
        }
        for c in 1..self.cell_start.len() {
            self.cell_start[c] += self.cell_start[c - 1];
        }

        // Scatter, using cell_start[c] as the write cursor of cell c
        self.entries.clear();
        self.entries.resize(particles.len(), 0);
        for (index, particle) in particles.iter().enumerate() {
            let cell = self.flat_index_of(particle.current);
            self.entries[self.cell_start[cell]] = index;
            self.cell_start[cell] += 1;
        }

        // Each cursor now points at the next cell's start; shift back by one
        for c in (1..self.cell_start.len()).rev() {
            self.cell_start[c] = self.cell_start[c - 1];
        }
        self.cell_start[0] = 0;
    }

    /// Particle indices in `cell`
    pub fn bucket(&self, cell: UVec3) -> &[usize] {
        let range = self.cell_range(cell.x as usize, cell.y as usize, cell.z as usize);
        &self.entries[range]
    }

    /// All particle indices in cell order
    pub fn entries(&self) -> &[usize] {
        &self.entries
    }

    /// Number of indexed particles
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of non-empty cells
    pub fn occupied_cells(&self) -> usize {
        self.cell_start.windows(2).filter(|w| w[1] > w[0]).count()
    }

    /// Range into [`entries`](Self::entries) covered by one cell
    pub fn cell_range(&self, x: usize, y: usize, z: usize) -> Range<usize> {
        let cell = self.flat_index(x, y, z);
        self.cell_start[cell]..self.cell_start[cell + 1]
    }

    /// Offset into [`entries`](Self::entries) where column `x` begins.
    /// `x == dimension` gives the end of the last column.
    pub fn column_start(&self, x: usize) -> usize {
        self.cell_start[x * self.dimension * self.dimension]
    }

    fn flat_index(&self, x: usize, y: usize, z: usize) -> usize {
        (x * self.dimension + y) * self.dimension + z
    }

    fn flat_index_of(&self, position: Vec3) -> usize {
        let cell = self.cell_of(position);
        self.flat_index(cell.x as usize, cell.y as usize, cell.z as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verlet_physics::ColorCategory;

    fn particle(position: Vec3) -> Particle {
        Particle::new(position, Vec3::ZERO, ColorCategory::Blue, 0.15)
    }

    #[test]
    fn test_cell_of_maps_and_clamps() {
        let grid = SpatialGrid::new(58, 0.3);
        assert_eq!(grid.cell_of(Vec3::ZERO), UVec3::splat(29));
        assert_eq!(grid.cell_of(Vec3::new(-0.01, 0.29, 0.31)), UVec3::new(28, 29, 30));
        assert_eq!(grid.cell_of(Vec3::new(1000.0, -1000.0, 0.0)), UVec3::new(57, 0, 29));
        assert_eq!(grid.cell_of(Vec3::splat(f32::NAN)), UVec3::ZERO);
    }

    #[test]
    fn test_rebuild_buckets_particles() {
        let mut grid = SpatialGrid::new(10, 1.0);
        let particles = [
            particle(Vec3::new(0.5, 0.5, 0.5)),
            particle(Vec3::new(-2.5, 0.0, 0.0)),
            particle(Vec3::new(0.1, 0.9, 0.2)),
        ];
        grid.rebuild(&particles);

        assert_eq!(grid.len(), 3);
        assert_eq!(grid.occupied_cells(), 2);

        let mut shared = grid.bucket(UVec3::new(5, 5, 5)).to_vec();
        shared.sort_unstable();
        assert_eq!(shared, [0, 2]);
        assert_eq!(grid.bucket(UVec3::new(2, 5, 5)), [1]);
        assert!(grid.bucket(UVec3::new(0, 0, 0)).is_empty());
    }

    #[test]
    fn test_rebuild_clears_previous_contents() {
        let mut grid = SpatialGrid::new(10, 1.0);
        let mut particles: Vec<_> = (0..50)
            .map(|i| particle(Vec3::new(i as f32 * 0.1 - 2.5, 0.0, 0.0)))
            .collect();
        grid.rebuild(&particles);
        assert_eq!(grid.len(), 50);

        particles.truncate(4);
        particles[0].current = Vec3::new(3.5, 3.5, 3.5);
        grid.rebuild(&particles);

        assert_eq!(grid.len(), 4);
        assert_eq!(grid.bucket(UVec3::splat(8)), [0]);
        let total: usize = (0..10)
            .map(|x| grid.column_start(x + 1) - grid.column_start(x))
            .sum();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_columns_are_contiguous() {
        let mut grid = SpatialGrid::new(6, 1.0);
        let particles: Vec<_> = (0..36)
            .map(|i| {
                let x = (i % 6) as f32 - 3.0 + 0.5;
                let y = (i / 6) as f32 - 3.0 + 0.5;
                particle(Vec3::new(x, y, -x))
            })
            .collect();
        grid.rebuild(&particles);

        for x in 0..6 {
            let column = &grid.entries()[grid.column_start(x)..grid.column_start(x + 1)];
            assert_eq!(column.len(), 6);
            for &index in column {
                assert_eq!(grid.cell_of(particles[index].current).x as usize, x);
            }
        }
        assert_eq!(grid.column_start(6), 36);
    }
}
