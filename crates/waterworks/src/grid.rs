//! Fixed-resolution simulation grid.
//!
//! Velocity uses a staggered (MAC) convention packed per cell: `vel_x[idx]`
//! is the horizontal sample at the cell's LEFT face, `vel_y[idx]` the
//! vertical sample at the cell's BOTTOM face. Pressure-free: the
//! incompressibility solve operates directly on these face samples.
//!
//! Everything is a flat arena of plain arrays indexed by
//! `row * cols + col`; components borrow slices and never own references.

use glam::Vec2;

/// Cell classification.
///
/// `Terrain` and `Stone` are immutable solids whose velocity is never
/// overwritten by a transfer pass. `Water` is transient: recomputed every
/// substep from particle occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellType {
    Air,
    /// Level terrain (paintable/diggable solid).
    Terrain,
    /// Boundary walls and fixed rock.
    Stone,
    /// Occupied by at least one particle this substep.
    Water,
    /// Absorbs particles and scores them.
    Drain,
}

impl CellType {
    /// Solid cells block flow and keep their face velocities.
    #[inline]
    pub fn is_solid(self) -> bool {
        matches!(self, CellType::Terrain | CellType::Stone)
    }
}

/// Four-cell bilinear stencil: parallel cell indices and weights.
#[derive(Clone, Copy, Debug)]
pub struct Stencil {
    pub indices: [usize; 4],
    pub weights: [f32; 4],
}

/// 2D cell array with per-cell type, staggered velocity, transfer weight,
/// and density.
pub struct Grid {
    pub cols: usize,
    pub rows: usize,
    pub cell_size: f32,

    pub cell_type: Vec<CellType>,
    /// Horizontal velocity at each cell's left face.
    pub vel_x: Vec<f32>,
    /// Vertical velocity at each cell's bottom face.
    pub vel_y: Vec<f32>,
    /// Transfer weight accumulators (transient, used only during scatter).
    pub weight_x: Vec<f32>,
    pub weight_y: Vec<f32>,
    /// Velocity snapshot from before the current scatter, used to restore
    /// faces adjacent to solids.
    pub prev_vel_x: Vec<f32>,
    pub prev_vel_y: Vec<f32>,
    /// Particle density estimate at cell centers.
    pub density: Vec<f32>,
}

impl Grid {
    pub fn new(cols: usize, rows: usize, cell_size: f32) -> Self {
        assert!(cols >= 3 && rows >= 3, "grid needs at least 3x3 cells");
        assert!(cell_size > 0.0, "cell_size must be positive");
        let total = cols * rows;
        Self {
            cols,
            rows,
            cell_size,
            cell_type: vec![CellType::Air; total],
            vel_x: vec![0.0; total],
            vel_y: vec![0.0; total],
            weight_x: vec![0.0; total],
            weight_y: vec![0.0; total],
            prev_vel_x: vec![0.0; total],
            prev_vel_y: vec![0.0; total],
            density: vec![0.0; total],
        }
    }

    #[inline]
    pub fn total_cells(&self) -> usize {
        self.cols * self.rows
    }

    /// World-space extent of the grid.
    #[inline]
    pub fn bounds_size(&self) -> Vec2 {
        Vec2::new(
            self.cols as f32 * self.cell_size,
            self.rows as f32 * self.cell_size,
        )
    }

    #[inline]
    pub fn cell_index(&self, col: usize, row: usize) -> usize {
        row * self.cols + col
    }

    /// Containing cell of a world position, clamped into the grid.
    #[inline]
    pub fn pos_to_cell(&self, pos: Vec2) -> (usize, usize) {
        let col = (pos.x / self.cell_size).floor() as i32;
        let row = (pos.y / self.cell_size).floor() as i32;
        (
            col.clamp(0, self.cols as i32 - 1) as usize,
            row.clamp(0, self.rows as i32 - 1) as usize,
        )
    }

    #[inline]
    pub fn is_solid_at(&self, col: usize, row: usize) -> bool {
        self.cell_type[self.cell_index(col, row)].is_solid()
    }

    /// Bilinear stencil around `pos` for a sample point shifted by `offset`
    /// (in cell units: `(0, 0.5)` for left-face samples, `(0.5, 0)` for
    /// bottom-face samples, `(0.5, 0.5)` for cell centers).
    ///
    /// Cell coordinates are clamped to `[0, max_col] x [0, max_row]` before
    /// indexing, so out-of-range positions degrade to edge weights instead
    /// of failing.
    pub fn bilinear_stencil(&self, pos: Vec2, offset: Vec2, max_col: usize, max_row: usize) -> Stencil {
        let h = self.cell_size;

        // Work in cell space, clamped into the interior.
        let cx = (pos.x / h).clamp(1.0, self.cols as f32 - 1.0);
        let cy = (pos.y / h).clamp(1.0, self.rows as f32 - 1.0);

        let x0 = (((cx - offset.x).floor() as i32).clamp(0, max_col as i32)) as usize;
        let y0 = (((cy - offset.y).floor() as i32).clamp(0, max_row as i32)) as usize;
        let x1 = (x0 + 1).min(max_col);
        let y1 = (y0 + 1).min(max_row);

        let tx = cx - offset.x - x0 as f32;
        let ty = cy - offset.y - y0 as f32;
        let sx = 1.0 - tx;
        let sy = 1.0 - ty;

        Stencil {
            indices: [
                self.cell_index(x0, y0),
                self.cell_index(x1, y0),
                self.cell_index(x1, y1),
                self.cell_index(x0, y1),
            ],
            weights: [sx * sy, tx * sy, tx * ty, sx * ty],
        }
    }

    /// Discrete divergence of the velocity field at an interior cell:
    /// outflow through the right/top faces minus inflow through this cell's
    /// own (left/bottom) faces.
    #[inline]
    pub fn divergence_at(&self, col: usize, row: usize) -> f32 {
        let idx = self.cell_index(col, row);
        self.vel_x[idx + 1] - self.vel_x[idx] + self.vel_y[idx + self.cols] - self.vel_y[idx]
    }

    /// Count of cells currently typed `Water`.
    pub fn water_cell_count(&self) -> usize {
        self.cell_type
            .iter()
            .filter(|&&t| t == CellType::Water)
            .count()
    }
}
