//! Uniform spatial partition over particle positions.
//!
//! Counting-sort layout rebuilt every substep: per-bucket counts, bucket
//! start offsets, and a particle index permutation grouped by bucket.
//! Gives O(1)-expected neighbor queries for the push-apart pass.

use glam::Vec2;

use crate::particle::Particle;
use crate::physics::PARTITION_SPACING_FACTOR;

pub struct SpatialHash {
    spacing: f32,
    cols: usize,
    rows: usize,
    counts: Vec<u32>,
    /// Bucket start offsets, length `num_buckets + 1`. After a build,
    /// bucket `c` owns `indices[starts[c]..starts[c + 1]]`.
    starts: Vec<u32>,
    indices: Vec<u32>,
}

impl SpatialHash {
    /// Partition covering a world area of `bounds` with bucket size
    /// `PARTITION_SPACING_FACTOR * particle_radius`.
    pub fn new(bounds: Vec2, particle_radius: f32) -> Self {
        assert!(particle_radius > 0.0, "particle_radius must be positive");
        let spacing = PARTITION_SPACING_FACTOR * particle_radius;
        let cols = (bounds.x / spacing).ceil().max(1.0) as usize;
        let rows = (bounds.y / spacing).ceil().max(1.0) as usize;
        let buckets = cols * rows;
        Self {
            spacing,
            cols,
            rows,
            counts: vec![0; buckets],
            starts: vec![0; buckets + 1],
            indices: Vec::new(),
        }
    }

    #[inline]
    fn bucket_coord(&self, pos: Vec2) -> (usize, usize) {
        let bx = ((pos.x / self.spacing).floor() as i32).clamp(0, self.cols as i32 - 1);
        let by = ((pos.y / self.spacing).floor() as i32).clamp(0, self.rows as i32 - 1);
        (bx as usize, by as usize)
    }

    #[inline]
    fn bucket_index(&self, bx: usize, by: usize) -> usize {
        by * self.cols + bx
    }

    /// Rebuild the partition from current particle positions.
    ///
    /// Disabled particles are excluded from every bucket.
    pub fn build(&mut self, particles: &[Particle]) {
        let buckets = self.cols * self.rows;
        self.counts.fill(0);
        self.indices.clear();
        self.indices.resize(particles.len(), 0);

        for p in particles.iter().filter(|p| !p.disabled) {
            let (bx, by) = self.bucket_coord(p.position);
            let c = self.bucket_index(bx, by);
            self.counts[c] += 1;
        }

        // Running sum so starts[c] is the END of bucket c; the fill pass
        // below decrements each entry back to the bucket's first slot.
        let mut running = 0u32;
        for c in 0..buckets {
            running += self.counts[c];
            self.starts[c] = running;
        }
        self.starts[buckets] = running;
        let active = running as usize;

        for (i, p) in particles.iter().enumerate() {
            if p.disabled {
                continue;
            }
            let (bx, by) = self.bucket_coord(p.position);
            let c = self.bucket_index(bx, by);
            self.starts[c] -= 1;
            self.indices[self.starts[c] as usize] = i as u32;
        }

        // Disabled tail slots are never read: queries stop at starts[buckets].
        self.indices.truncate(active);
    }

    /// Particle indices stored in bucket `(bx, by)`.
    pub fn bucket(&self, bx: usize, by: usize) -> &[u32] {
        let c = self.bucket_index(bx, by);
        let lo = self.starts[c] as usize;
        let hi = self.starts[c + 1] as usize;
        &self.indices[lo..hi]
    }

    /// Resolve particle-particle overlap with fixed symmetric push-apart
    /// iterations over the current build.
    ///
    /// Every pair closer than `2 * radius` is separated along its center
    /// line, half the penetration each, restoring the minimum distance in
    /// one application. Exactly-coincident pairs have no separating
    /// direction and are skipped; they stay overlapping rather than being
    /// jittered apart.
    pub fn push_apart(&self, particles: &mut [Particle], radius: f32, iterations: usize) {
        let min_dist = 2.0 * radius;
        let min_dist_sq = min_dist * min_dist;

        for _ in 0..iterations {
            for i in 0..particles.len() {
                if particles[i].disabled {
                    continue;
                }
                let (bx, by) = self.bucket_coord(particles[i].position);

                let x0 = bx.saturating_sub(1);
                let y0 = by.saturating_sub(1);
                let x1 = (bx + 1).min(self.cols - 1);
                let y1 = (by + 1).min(self.rows - 1);

                for y in y0..=y1 {
                    for x in x0..=x1 {
                        for &other in self.bucket(x, y) {
                            let j = other as usize;
                            if j == i || particles[j].disabled {
                                continue;
                            }

                            let diff = particles[j].position - particles[i].position;
                            let d_sq = diff.length_squared();
                            if d_sq >= min_dist_sq || d_sq == 0.0 {
                                continue;
                            }

                            let d = d_sq.sqrt();
                            let s = 0.5 * (min_dist - d) / d;
                            particles[i].position -= diff * s;
                            particles[j].position += diff * s;
                        }
                    }
                }
            }
        }
    }
}
