//! Particle <-> grid velocity transfer and density estimation.
//!
//! Scatter (P2G) uses two independent bilinear stencils, one per staggered
//! component, offset to each component's face center. Gather (G2P) mirrors
//! the same stencil geometry with validity-masked PIC interpolation.

use glam::Vec2;
use rayon::prelude::*;

use crate::grid::CellType;
use crate::simulation::FlipSimulation;

/// Sample-point offsets in cell units: left-face horizontal component,
/// bottom-face vertical component, and the vertex-centered density stencil.
const U_OFFSET: Vec2 = Vec2::new(0.0, 0.5);
const V_OFFSET: Vec2 = Vec2::new(0.5, 0.0);
const DENSITY_OFFSET: Vec2 = Vec2::new(0.5, 0.5);

impl FlipSimulation {
    /// Scatter particle velocities onto the grid's staggered face samples.
    ///
    /// Water occupancy is recomputed from scratch: previous `Water` cells
    /// reset to `Air`, then any `Air` cell containing an active particle is
    /// re-marked. After weight normalization, faces adjacent to a solid
    /// cell are restored to their pre-scatter velocity so solids never
    /// acquire flow.
    pub fn particles_to_grid(&mut self) {
        let grid = &mut self.grid;
        let cols = grid.cols;
        let max_col = cols - 2;
        let max_row = grid.rows - 2;

        for idx in 0..grid.total_cells() {
            if grid.cell_type[idx] == CellType::Water {
                grid.cell_type[idx] = CellType::Air;
            }
            grid.prev_vel_x[idx] = grid.vel_x[idx];
            grid.prev_vel_y[idx] = grid.vel_y[idx];
            grid.vel_x[idx] = 0.0;
            grid.vel_y[idx] = 0.0;
            grid.weight_x[idx] = 0.0;
            grid.weight_y[idx] = 0.0;
        }

        // Occupancy pass: particles turn air into water, never solids or
        // drains.
        for p in self.particles.active() {
            let (col, row) = grid.pos_to_cell(p.position);
            let idx = grid.cell_index(col, row);
            if grid.cell_type[idx] == CellType::Air {
                grid.cell_type[idx] = CellType::Water;
            }
        }

        for p in self.particles.active() {
            let u = grid.bilinear_stencil(p.position, U_OFFSET, max_col, max_row);
            let v = grid.bilinear_stencil(p.position, V_OFFSET, max_col, max_row);

            for k in 0..4 {
                grid.vel_x[u.indices[k]] += p.velocity.x * u.weights[k];
                grid.weight_x[u.indices[k]] += u.weights[k];
                grid.vel_y[v.indices[k]] += p.velocity.y * v.weights[k];
                grid.weight_y[v.indices[k]] += v.weights[k];
            }
        }

        for idx in 0..grid.total_cells() {
            if grid.weight_x[idx] > 0.0 {
                grid.vel_x[idx] /= grid.weight_x[idx];
            }
            if grid.weight_y[idx] > 0.0 {
                grid.vel_y[idx] /= grid.weight_y[idx];
            }

            // No-flow boundary: a face touching a solid keeps whatever the
            // solid had last frame rather than the scattered value.
            let col = idx % cols;
            let row = idx / cols;
            let solid = grid.cell_type[idx].is_solid();
            let left_solid = col > 0 && grid.cell_type[idx - 1].is_solid();
            let bottom_solid = row > 0 && grid.cell_type[idx - cols].is_solid();

            if solid || left_solid {
                grid.vel_x[idx] = grid.prev_vel_x[idx];
            }
            if solid || bottom_solid {
                grid.vel_y[idx] = grid.prev_vel_y[idx];
            }
        }
    }

    /// Estimate per-cell particle density with the vertex-centered stencil
    /// and lazily initialize the rest density.
    ///
    /// Rest density is the mean density over water cells on the first
    /// substep that has any; after that it is held fixed until a full
    /// reset.
    pub fn compute_densities(&mut self) {
        let grid = &mut self.grid;
        let max_col = grid.cols - 1;
        let max_row = grid.rows - 1;

        grid.density.fill(0.0);

        // Unit particle mass.
        for p in self.particles.active() {
            let stencil = grid.bilinear_stencil(p.position, DENSITY_OFFSET, max_col, max_row);
            for k in 0..4 {
                grid.density[stencil.indices[k]] += stencil.weights[k];
            }
        }

        if self.rest_density == 0.0 {
            let mut sum = 0.0;
            let mut water_cells = 0usize;
            for idx in 0..grid.total_cells() {
                if grid.cell_type[idx] == CellType::Water {
                    sum += grid.density[idx];
                    water_cells += 1;
                }
            }
            if water_cells > 0 {
                self.rest_density = sum / water_cells as f32;
            }
        }
    }

    /// Gather grid velocities back onto particles (pure PIC).
    ///
    /// Each of the four face samples per component is masked by validity: a
    /// face counts only if one of its two adjacent cells is non-air. A
    /// component with zero valid weight leaves the particle's pre-transfer
    /// velocity untouched.
    pub fn grid_to_particles(&mut self) {
        let grid = &self.grid;
        let cols = grid.cols;
        let max_col = cols - 2;
        let max_row = grid.rows - 2;

        self.particles.list.par_iter_mut().for_each(|p| {
            if p.disabled {
                return;
            }

            let u = grid.bilinear_stencil(p.position, U_OFFSET, max_col, max_row);
            let v = grid.bilinear_stencil(p.position, V_OFFSET, max_col, max_row);

            let mut u_weight = 0.0;
            let mut u_sum = 0.0;
            for k in 0..4 {
                let idx = u.indices[k];
                let col = idx % cols;
                let valid = grid.cell_type[idx] != CellType::Air
                    || (col > 0 && grid.cell_type[idx - 1] != CellType::Air);
                if valid {
                    u_weight += u.weights[k];
                    u_sum += u.weights[k] * grid.vel_x[idx];
                }
            }
            if u_weight > 0.0 {
                p.velocity.x = u_sum / u_weight;
            }

            let mut v_weight = 0.0;
            let mut v_sum = 0.0;
            for k in 0..4 {
                let idx = v.indices[k];
                let row = idx / cols;
                let valid = grid.cell_type[idx] != CellType::Air
                    || (row > 0 && grid.cell_type[idx - cols] != CellType::Air);
                if valid {
                    v_weight += v.weights[k];
                    v_sum += v.weights[k] * grid.vel_y[idx];
                }
            }
            if v_weight > 0.0 {
                p.velocity.y = v_sum / v_weight;
            }
        });
    }
}
