//! Host-facing simulation parameters.
//!
//! The host owns these values (UI sliders, level config files); the solver
//! treats them as read-only per run. Serde derives let level configs embed
//! a parameter block directly.

use serde::{Deserialize, Serialize};

use crate::physics;

/// Tuning knobs consumed from the orchestrating host.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Gravity in world units/s² (negative = down).
    pub gravity: f32,
    /// Particle radius in world units.
    pub particle_radius: f32,
    /// Multiplier applied to the frame time before substepping.
    pub time_scale: f32,
    /// Substeps run per `advance` call.
    pub substeps_per_frame: u32,
    /// Relaxation sweeps of the incompressibility solver per substep.
    pub incompressibility_iterations: usize,
    /// Gauss-Seidel over-relaxation factor, valid in (0, 2).
    pub over_relaxation: f32,
    /// Scale on the density-drift divergence correction.
    pub stiffness: f32,
    /// World-space radius of host interaction tools (pull/push/dig).
    /// The solver itself does not read this; it is carried for the host.
    pub interaction_radius: f32,
    /// Fixed iterations of particle overlap resolution per substep.
    pub push_apart_iterations: usize,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            gravity: physics::GRAVITY,
            particle_radius: 0.3,
            time_scale: 1.0,
            substeps_per_frame: 1,
            incompressibility_iterations: physics::PRESSURE_ITERATIONS,
            over_relaxation: physics::OVER_RELAXATION,
            stiffness: physics::DRIFT_STIFFNESS,
            interaction_radius: 5.0,
            push_apart_iterations: physics::PUSH_APART_ITERATIONS,
        }
    }
}

impl SimParams {
    /// Panics on values that violate the solver's contracts.
    ///
    /// Called once at simulation construction; malformed parameters are a
    /// programming error, not a runtime condition.
    pub fn validate(&self) {
        assert!(
            self.particle_radius > 0.0,
            "particle_radius must be positive"
        );
        assert!(self.time_scale > 0.0, "time_scale must be positive");
        assert!(
            self.substeps_per_frame > 0,
            "substeps_per_frame must be at least 1"
        );
        assert!(
            self.over_relaxation > 0.0 && self.over_relaxation < 2.0,
            "over_relaxation must lie in (0, 2)"
        );
        assert!(self.stiffness >= 0.0, "stiffness must be non-negative");
    }
}
