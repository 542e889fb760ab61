//! Fluid particles.
//!
//! Each particle has a continuous world-space position and velocity.
//! Particles absorbed by a drain are disabled in place: they keep their
//! slot in the array (stable indices for the host's instanced rendering)
//! but move to an out-of-bounds sentinel and are skipped by every
//! simulation pass.

use glam::Vec2;

/// Sentinel position for disabled particles (outside any valid grid).
pub const DISABLED_POSITION: Vec2 = Vec2::new(-1.0, -1.0);

#[derive(Clone, Copy, Debug)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub disabled: bool,
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            disabled: false,
        }
    }

    /// Remove the particle from the simulation without shifting the array.
    pub fn disable(&mut self) {
        self.position = DISABLED_POSITION;
        self.velocity = Vec2::ZERO;
        self.disabled = true;
    }
}

/// Particle collection owned by the simulation loop.
///
/// Other components (spatial hash, transfer operators) borrow the list for
/// one call and never retain references across substeps.
#[derive(Clone, Default)]
pub struct Particles {
    pub list: Vec<Particle>,
}

impl Particles {
    pub fn from_list(list: Vec<Particle>) -> Self {
        Self { list }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Iterate over non-disabled particles.
    pub fn active(&self) -> impl Iterator<Item = &Particle> {
        self.list.iter().filter(|p| !p.disabled)
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }
}
