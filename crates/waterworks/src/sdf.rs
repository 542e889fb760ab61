//! Signed-distance-field terrain layer.
//!
//! A 2D scalar field sampled at pixel centers: negative inside solid
//! terrain, positive outside, magnitudes in world units. The solver keeps
//! two layers (static level geometry and a dynamically edited layer) and
//! collides particles against each independently every substep. The
//! dynamic layer is mutated in place by the host's terrain editing between
//! substeps; collision reads it fresh each call and never caches a copy.

use glam::Vec2;
use rayon::prelude::*;

use crate::particle::Particle;

pub struct SdfField {
    width: usize,
    height: usize,
    /// World units per pixel.
    pixel_size: f32,
    /// Signed distance per pixel, row-major, negative inside solids.
    data: Vec<f32>,
}

impl SdfField {
    pub fn new(width: usize, height: usize, pixel_size: f32, data: Vec<f32>) -> Self {
        assert!(width > 1 && height > 1, "SDF needs at least 2x2 pixels");
        assert!(pixel_size > 0.0, "pixel_size must be positive");
        assert_eq!(
            data.len(),
            width * height,
            "SDF data length must match dimensions"
        );
        Self {
            width,
            height,
            pixel_size,
            data,
        }
    }

    /// Build a field from a solid-occupancy mask using two chamfer sweeps
    /// (distance-to-solid minus distance-to-open). Coarser than the host's
    /// jump-flooded textures but exact enough for levels and tests.
    pub fn from_solid_mask(width: usize, height: usize, pixel_size: f32, solid: &[bool]) -> Self {
        assert_eq!(solid.len(), width * height, "mask length must match dimensions");
        let len = width * height;
        let mut outer = vec![0.0f32; len];
        let mut inner = vec![0.0f32; len];

        for i in 0..len {
            if solid[i] {
                outer[i] = 0.0;
                inner[i] = f32::MAX;
            } else {
                outer[i] = f32::MAX;
                inner[i] = 0.0;
            }
        }

        let sweep = |field: &mut [f32]| {
            // Forward pass (bottom-left to top-right).
            for y in 0..height {
                for x in 0..width {
                    let idx = y * width + x;
                    if x > 0 {
                        field[idx] = field[idx].min(field[idx - 1] + pixel_size);
                    }
                    if y > 0 {
                        field[idx] = field[idx].min(field[idx - width] + pixel_size);
                    }
                }
            }
            // Backward pass.
            for y in (0..height).rev() {
                for x in (0..width).rev() {
                    let idx = y * width + x;
                    if x + 1 < width {
                        field[idx] = field[idx].min(field[idx + 1] + pixel_size);
                    }
                    if y + 1 < height {
                        field[idx] = field[idx].min(field[idx + width] + pixel_size);
                    }
                }
            }
        };
        sweep(&mut outer);
        sweep(&mut inner);

        let data = outer
            .iter()
            .zip(inner.iter())
            .map(|(o, i)| o - i)
            .collect();

        Self::new(width, height, pixel_size, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }

    #[inline]
    fn pixel_at(&self, px: i32, py: i32) -> f32 {
        let x = px.clamp(0, self.width as i32 - 1) as usize;
        let y = py.clamp(0, self.height as i32 - 1) as usize;
        self.data[y * self.width + x]
    }

    /// Signed distance at a world position (nearest pixel, no filtering).
    #[inline]
    pub fn sample(&self, pos: Vec2) -> f32 {
        let px = (pos.x / self.pixel_size).floor() as i32;
        let py = (pos.y / self.pixel_size).floor() as i32;
        self.pixel_at(px, py)
    }

    /// Unit surface gradient via forward differences at +1 pixel, falling
    /// back to a backward difference on an axis whose +1 sample would
    /// clamp, so the gradient stays defined in the last pixel row/column.
    ///
    /// Points away from the surface outside terrain, into the surface
    /// inside. Zero where the field is locally flat.
    #[inline]
    pub fn gradient(&self, pos: Vec2) -> Vec2 {
        let px = (pos.x / self.pixel_size).floor() as i32;
        let py = (pos.y / self.pixel_size).floor() as i32;
        let here = self.pixel_at(px, py);
        let dx = if px + 1 < self.width as i32 {
            self.pixel_at(px + 1, py) - here
        } else {
            here - self.pixel_at(px - 1, py)
        };
        let dy = if py + 1 < self.height as i32 {
            self.pixel_at(px, py + 1) - here
        } else {
            here - self.pixel_at(px, py - 1)
        };
        Vec2::new(dx, dy).normalize_or_zero()
    }

    /// Collide particles against the field.
    ///
    /// For each active particle within `radius` of the surface: remove the
    /// velocity component moving into the surface (project onto the
    /// tangent), then displace along the gradient to restore the minimum
    /// clearance. Data-parallel: each particle touches only itself.
    pub fn collide_particles(&self, particles: &mut [Particle], radius: f32) {
        particles.par_iter_mut().for_each(|p| {
            if p.disabled {
                return;
            }
            let dist = self.sample(p.position);
            if dist > radius {
                return;
            }
            let normal = self.gradient(p.position);
            if normal == Vec2::ZERO {
                return;
            }
            let inward = p.velocity.dot(normal);
            if inward < 0.0 {
                p.velocity -= normal * inward;
            }
            p.position += normal * (radius - dist);
        });
    }
}
