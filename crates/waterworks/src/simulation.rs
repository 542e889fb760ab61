//! Simulation orchestrator.
//!
//! Owns the grid, the particle array, and the derived spatial hash, and
//! runs the substep pipeline:
//!
//! 1. Integrate gravity and advect particles
//! 2. Rebuild the spatial hash, resolve particle overlap
//! 3. Clamp to bounds, collide against both SDF terrain layers
//! 4. Absorb particles sitting in drain cells (scoring)
//! 5. Scatter velocities to the grid, estimate densities
//! 6. Incompressibility solve
//! 7. Gather velocities back to particles
//!
//! Hosts drive it through discrete commands (`pause`, `resume`,
//! `request_step`, `reset`) and poll `substeps_completed` instead of
//! subscribing to a step callback.

use glam::Vec2;
use rayon::prelude::*;

use crate::grid::{CellType, Grid};
use crate::level::SpawnData;
use crate::params::SimParams;
use crate::particle::Particles;
use crate::sdf::SdfField;
use crate::spatial_hash::SpatialHash;

/// Host-driven execution state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    Paused,
    /// Run one frame's worth of substeps, then pause.
    StepOnce,
}

pub struct FlipSimulation {
    pub grid: Grid,
    pub particles: Particles,
    pub params: SimParams,

    hash: SpatialHash,
    static_sdf: Option<SdfField>,
    dynamic_sdf: Option<SdfField>,

    pub(crate) rest_density: f32,
    score: u64,
    substeps_completed: u64,
    run_state: RunState,

    /// Immutable copy of the initial state, restored on reset.
    spawn: SpawnData,
}

impl FlipSimulation {
    /// Build a simulation from level spawn data.
    ///
    /// Panics if the spawn buffers disagree with the grid dimensions; a
    /// mismatched level is a programming error, not a runtime condition.
    pub fn new(params: SimParams, spawn: SpawnData) -> Self {
        params.validate();
        spawn.validate();

        let mut grid = Grid::new(spawn.cols, spawn.rows, spawn.cell_size);
        grid.cell_type.copy_from_slice(&spawn.cell_types);
        grid.vel_x.copy_from_slice(&spawn.cell_vel_x);
        grid.vel_y.copy_from_slice(&spawn.cell_vel_y);

        let hash = SpatialHash::new(grid.bounds_size(), params.particle_radius);
        let particles = Particles::from_list(spawn.particles.clone());

        log::info!(
            "simulation initialized: {}x{} cells, {} particles",
            spawn.cols,
            spawn.rows,
            particles.len()
        );

        Self {
            grid,
            particles,
            params,
            hash,
            static_sdf: None,
            dynamic_sdf: None,
            rest_density: 0.0,
            score: 0,
            substeps_completed: 0,
            run_state: RunState::Paused,
            spawn,
        }
    }

    // ------------------------------------------------------------------
    // Terrain layers
    // ------------------------------------------------------------------

    /// Install the static terrain layer (generated once at level load).
    pub fn set_static_sdf(&mut self, sdf: SdfField) {
        self.static_sdf = Some(sdf);
    }

    /// Install the dynamically editable terrain layer.
    pub fn set_dynamic_sdf(&mut self, sdf: SdfField) {
        self.dynamic_sdf = Some(sdf);
    }

    /// Mutable access for the host's terrain editing between substeps.
    /// The collider re-reads the layer fresh every substep.
    pub fn dynamic_sdf_mut(&mut self) -> Option<&mut SdfField> {
        self.dynamic_sdf.as_mut()
    }

    // ------------------------------------------------------------------
    // Host commands and queries
    // ------------------------------------------------------------------

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn pause(&mut self) {
        self.run_state = RunState::Paused;
    }

    pub fn resume(&mut self) {
        self.run_state = RunState::Running;
    }

    /// Advance one frame, then pause again.
    pub fn request_step(&mut self) {
        self.run_state = RunState::StepOnce;
    }

    /// Particles absorbed by drains so far this run.
    pub fn score(&self) -> u64 {
        self.score
    }

    /// Monotonic substep counter; poll this instead of a step callback.
    pub fn substeps_completed(&self) -> u64 {
        self.substeps_completed
    }

    /// Current rest density (0 until the first substep with water cells).
    pub fn rest_density(&self) -> f32 {
        self.rest_density
    }

    /// Restore all mutable state to the initial spawn snapshot.
    ///
    /// Must not run concurrently with a substep; `&mut self` enforces that.
    /// Rest density returns to uninitialized and is re-derived on the next
    /// substep. The substep counter is not rewound (it is a notification
    /// counter, not simulation state).
    pub fn reset(&mut self) {
        self.grid.cell_type.copy_from_slice(&self.spawn.cell_types);
        self.grid.vel_x.copy_from_slice(&self.spawn.cell_vel_x);
        self.grid.vel_y.copy_from_slice(&self.spawn.cell_vel_y);
        self.grid.weight_x.fill(0.0);
        self.grid.weight_y.fill(0.0);
        self.grid.prev_vel_x.fill(0.0);
        self.grid.prev_vel_y.fill(0.0);
        self.grid.density.fill(0.0);

        self.particles.list.clear();
        self.particles.list.extend_from_slice(&self.spawn.particles);

        self.rest_density = 0.0;
        self.score = 0;
        self.run_state = RunState::Paused;

        log::debug!("simulation reset to spawn state");
    }

    // ------------------------------------------------------------------
    // Stepping
    // ------------------------------------------------------------------

    /// Run one frame: split `frame_time` into substeps according to the
    /// run state. Paused frames do nothing; `StepOnce` frames run and then
    /// pause.
    pub fn advance(&mut self, frame_time: f32) {
        if self.run_state == RunState::Paused {
            return;
        }

        let dt = frame_time / self.params.substeps_per_frame as f32 * self.params.time_scale;
        for _ in 0..self.params.substeps_per_frame {
            self.step(dt);
        }

        if self.run_state == RunState::StepOnce {
            self.run_state = RunState::Paused;
        }
    }

    /// Run a single substep of the full pipeline.
    pub fn step(&mut self, dt: f32) {
        self.integrate(dt);
        self.push_apart_particles();
        self.constrain_to_bounds();
        self.collide_terrain();
        self.absorb_drained();

        self.particles_to_grid();
        self.compute_densities();
        self.grid.solve_incompressibility(
            self.params.incompressibility_iterations,
            self.params.over_relaxation,
            self.params.stiffness,
            self.rest_density,
        );
        self.grid_to_particles();

        self.substeps_completed += 1;
    }

    /// Semi-implicit Euler: gravity into velocity, velocity into position.
    pub fn integrate(&mut self, dt: f32) {
        let gravity = self.params.gravity;
        self.particles.list.par_iter_mut().for_each(|p| {
            if p.disabled {
                return;
            }
            p.velocity.y += gravity * dt;
            p.position += p.velocity * dt;
        });
    }

    /// Rebuild the spatial hash and resolve particle overlap.
    pub fn push_apart_particles(&mut self) {
        self.hash.build(&self.particles.list);
        self.hash.push_apart(
            &mut self.particles.list,
            self.params.particle_radius,
            self.params.push_apart_iterations,
        );
    }

    /// Clamp particles into the interior, zeroing the velocity component
    /// on contact (inelastic wall collision).
    pub fn constrain_to_bounds(&mut self) {
        let h = self.grid.cell_size;
        let r = self.params.particle_radius;
        let min_x = h + r;
        let max_x = (self.grid.cols - 1) as f32 * h - r;
        let min_y = h + r;
        let max_y = (self.grid.rows - 1) as f32 * h - r;

        self.particles.list.par_iter_mut().for_each(|p| {
            if p.disabled {
                return;
            }
            if p.position.x < min_x {
                p.position.x = min_x;
                p.velocity.x = 0.0;
            }
            if p.position.x > max_x {
                p.position.x = max_x;
                p.velocity.x = 0.0;
            }
            if p.position.y < min_y {
                p.position.y = min_y;
                p.velocity.y = 0.0;
            }
            if p.position.y > max_y {
                p.position.y = max_y;
                p.velocity.y = 0.0;
            }
        });
    }

    /// Collide against the dynamic terrain layer, then the static one,
    /// independently.
    pub fn collide_terrain(&mut self) {
        let r = self.params.particle_radius;
        if let Some(sdf) = &self.dynamic_sdf {
            sdf.collide_particles(&mut self.particles.list, r);
        }
        if let Some(sdf) = &self.static_sdf {
            sdf.collide_particles(&mut self.particles.list, r);
        }
    }

    /// Disable particles whose containing cell is a drain, scoring each
    /// exactly once.
    ///
    /// Runs before the transfer passes so absorbed particles contribute no
    /// weight. Disabled particles are skipped, so re-running the check
    /// never double-counts.
    pub fn absorb_drained(&mut self) {
        let mut absorbed = 0u64;
        for p in self.particles.list.iter_mut() {
            if p.disabled {
                continue;
            }
            let (col, row) = self.grid.pos_to_cell(p.position);
            if self.grid.cell_type[self.grid.cell_index(col, row)] == CellType::Drain {
                p.disable();
                absorbed += 1;
            }
        }
        if absorbed > 0 {
            self.score += absorbed;
            log::debug!("drained {absorbed} particles, score now {}", self.score);
        }
    }

    /// World-space bounds of the simulated area.
    pub fn bounds_size(&self) -> Vec2 {
        self.grid.bounds_size()
    }
}
