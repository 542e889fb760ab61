//! Level authoring: turning terrain/water masks into initial simulation
//! state.
//!
//! A level is described by two boolean masks over the cell grid (terrain
//! and water), plus a list of drain cells. `SpawnData` is the fully baked
//! result: the initial cell-type grid and a particle array distributed
//! over the water cells. The simulation keeps a copy for reset.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use crate::grid::CellType;
use crate::particle::Particle;

/// Baked initial state for a level.
#[derive(Clone, Debug)]
pub struct SpawnData {
    pub cols: usize,
    pub rows: usize,
    pub cell_size: f32,
    pub cell_types: Vec<CellType>,
    pub cell_vel_x: Vec<f32>,
    pub cell_vel_y: Vec<f32>,
    pub particles: Vec<Particle>,
}

impl SpawnData {
    /// Build spawn data from row-major boolean masks.
    ///
    /// Layering order matters: terrain first, then water (water wins where
    /// both masks are set), then the boundary ring is forced to `Stone`,
    /// then drains are punched in. `num_particles` are spread evenly over
    /// the water cells with seeded jitter; if the water mask is empty the
    /// particles spawn in a blob at the grid center instead.
    pub fn from_masks(
        cols: usize,
        rows: usize,
        cell_size: f32,
        terrain_mask: &[bool],
        water_mask: &[bool],
        drains: &[(usize, usize)],
        num_particles: usize,
        seed: u64,
    ) -> Self {
        let total = cols * rows;
        assert_eq!(terrain_mask.len(), total, "terrain mask length mismatch");
        assert_eq!(water_mask.len(), total, "water mask length mismatch");

        let mut cell_types = vec![CellType::Air; total];
        let mut water_cells = Vec::new();

        for idx in 0..total {
            if terrain_mask[idx] {
                cell_types[idx] = CellType::Terrain;
            }
            if water_mask[idx] {
                cell_types[idx] = CellType::Water;
                water_cells.push(idx);
            }
        }

        // Boundary ring overrides whatever the masks said.
        for col in 0..cols {
            cell_types[col] = CellType::Stone;
            cell_types[(rows - 1) * cols + col] = CellType::Stone;
        }
        for row in 1..rows - 1 {
            cell_types[row * cols] = CellType::Stone;
            cell_types[row * cols + cols - 1] = CellType::Stone;
        }
        water_cells.retain(|&idx| cell_types[idx] == CellType::Water);

        for &(col, row) in drains {
            assert!(col < cols && row < rows, "drain cell out of range");
            cell_types[row * cols + col] = CellType::Drain;
        }
        water_cells.retain(|&idx| cell_types[idx] == CellType::Water);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut particles = Vec::with_capacity(num_particles);

        if water_cells.is_empty() {
            log::warn!("no water cells in level, spawning particles at grid center");
            let center = Vec2::new(cols as f32, rows as f32) * cell_size * 0.5;
            let spread = 2.0 * cell_size;
            for _ in 0..num_particles {
                let jitter = Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5);
                particles.push(Particle::new(center + spread * jitter, Vec2::ZERO));
            }
        } else {
            let per_cell = num_particles / water_cells.len();
            let mut extras = num_particles % water_cells.len();

            for &idx in &water_cells {
                let col = idx % cols;
                let row = idx / cols;
                let origin = Vec2::new(col as f32, row as f32) * cell_size;

                let mut n = per_cell;
                if extras > 0 {
                    n += 1;
                    extras -= 1;
                }
                for _ in 0..n {
                    let jitter = Vec2::new(rng.gen::<f32>(), rng.gen::<f32>()) * cell_size;
                    particles.push(Particle::new(origin + jitter, Vec2::ZERO));
                }
            }
        }

        log::info!(
            "level baked: {}x{} cells, {} water cells, {} drains, {} particles",
            cols,
            rows,
            water_cells.len(),
            drains.len(),
            particles.len()
        );

        Self {
            cols,
            rows,
            cell_size,
            cell_types,
            cell_vel_x: vec![0.0; total],
            cell_vel_y: vec![0.0; total],
            particles,
        }
    }

    /// Assert the internal buffers are mutually consistent.
    pub fn validate(&self) {
        let total = self.cols * self.rows;
        assert_eq!(self.cell_types.len(), total, "cell type buffer mismatch");
        assert_eq!(self.cell_vel_x.len(), total, "u velocity buffer mismatch");
        assert_eq!(self.cell_vel_y.len(), total, "v velocity buffer mismatch");
        assert!(self.cell_size > 0.0, "cell size must be positive");
    }
}
