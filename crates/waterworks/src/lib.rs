//! Hybrid PIC/FLIP water simulation.
//!
//! Particle-based water with:
//! - MAC-style staggered velocity samples per cell (left/bottom faces)
//! - Bilinear particle<->grid velocity transfer
//! - Gauss-Seidel incompressibility solve with density-drift correction
//! - Spatial-hash particle separation
//! - SDF terrain collision (static + dynamically edited layer)
//! - Drain cells that absorb particles and score them
//!
//! This crate is framework-agnostic - it handles simulation only. Rendering,
//! input, and level texture decoding live in the host application.

pub mod physics;
pub mod params;
pub mod grid;
pub mod particle;
pub mod spatial_hash;
pub mod sdf;
pub mod level;
pub mod simulation;

mod pressure;
mod transfer;

pub use grid::{CellType, Grid};
pub use level::SpawnData;
pub use params::SimParams;
pub use particle::{Particle, Particles};
pub use sdf::SdfField;
pub use simulation::{FlipSimulation, RunState};
pub use spatial_hash::SpatialHash;
