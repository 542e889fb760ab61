//! Incompressibility solver.
//!
//! Sequential Gauss-Seidel relaxation over water cells, single-buffered:
//! each correction is visible to the next cell in the same sweep. This is
//! an intentionally approximate projection (see `physics::OVER_RELAXATION`),
//! not an exact Poisson solve.

use crate::grid::Grid;

impl Grid {
    /// Run `iterations` full sweeps removing velocity divergence from water
    /// cells, respecting solid faces and correcting density drift.
    ///
    /// For each interior water cell, the divergence surplus is redistributed
    /// across the non-solid faces. Once `rest_density > 0`, cells denser
    /// than rest get an extra outward push of
    /// `stiffness * (density - rest_density)`.
    ///
    /// Fully enclosed cells (all four neighbors solid) admit no correction
    /// and are skipped.
    pub fn solve_incompressibility(
        &mut self,
        iterations: usize,
        over_relaxation: f32,
        stiffness: f32,
        rest_density: f32,
    ) {
        let cols = self.cols;

        for _ in 0..iterations {
            for row in 1..self.rows - 1 {
                for col in 1..cols - 1 {
                    let idx = self.cell_index(col, row);
                    if self.cell_type[idx] != crate::grid::CellType::Water {
                        continue;
                    }

                    let left = idx - 1;
                    let right = idx + 1;
                    let bottom = idx - cols;
                    let top = idx + cols;

                    let s_left = if self.cell_type[left].is_solid() { 0.0 } else { 1.0 };
                    let s_right = if self.cell_type[right].is_solid() { 0.0 } else { 1.0 };
                    let s_bottom = if self.cell_type[bottom].is_solid() { 0.0 } else { 1.0 };
                    let s_top = if self.cell_type[top].is_solid() { 0.0 } else { 1.0 };
                    let s = s_left + s_right + s_bottom + s_top;
                    if s == 0.0 {
                        continue;
                    }

                    let mut d =
                        self.vel_x[right] - self.vel_x[idx] + self.vel_y[top] - self.vel_y[idx];

                    // Density drift: over-packed cells push outward so the
                    // particle distribution relaxes back toward rest.
                    if rest_density > 0.0 {
                        d -= stiffness * (self.density[idx] - rest_density).max(0.0);
                    }

                    let delta = over_relaxation * d / s;

                    self.vel_x[idx] += delta * s_left;
                    self.vel_x[right] -= delta * s_right;
                    self.vel_y[idx] += delta * s_bottom;
                    self.vel_y[top] -= delta * s_top;
                }
            }
        }
    }

    /// Sum of absolute divergence over interior water cells. Diagnostic.
    pub fn total_divergence(&self) -> f32 {
        let mut total = 0.0;
        for row in 1..self.rows - 1 {
            for col in 1..self.cols - 1 {
                let idx = self.cell_index(col, row);
                if self.cell_type[idx] == crate::grid::CellType::Water {
                    total += self.divergence_at(col, row).abs();
                }
            }
        }
        total
    }
}
