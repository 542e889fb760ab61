//! Unified tuning constants for the PIC/FLIP solver.
//!
//! All simulation modules should use these constants instead of defining
//! their own. This prevents drift between subsystems and makes tuning easier.

/// Simulation gravity in world units/s² (negative = down).
pub const GRAVITY: f32 = -9.81;

/// Full relaxation sweeps of the incompressibility solver per substep.
pub const PRESSURE_ITERATIONS: usize = 50;

/// Over-relaxation factor for the Gauss-Seidel sweep.
///
/// Values in (0, 2) converge; ~1.9 trades exactness for speed. This is a
/// visually-plausible projection, not an exact Poisson solve.
pub const OVER_RELAXATION: f32 = 1.9;

/// Scale on the density-drift term added to the divergence target.
///
/// Pushes over-dense water cells apart to counter particle clumping.
pub const DRIFT_STIFFNESS: f32 = 1.0;

/// Spatial-hash bucket size as a multiple of particle radius.
///
/// 2.2 x radius guarantees a 3x3 bucket scan covers every pair within
/// 2 x radius.
pub const PARTITION_SPACING_FACTOR: f32 = 2.2;

/// Fixed iterations of the push-apart overlap resolution per substep.
pub const PUSH_APART_ITERATIONS: usize = 2;
