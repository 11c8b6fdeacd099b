//! Stratified sample patterns for antialiasing and lens sampling.
//!
//! A [`Sampler`] precomputes `num_sets` independent sets of points in the
//! unit square (plus their concentric mapping onto the unit disk) and a
//! shuffled index table per set. Pixels read them through a
//! [`SampleCursor`], which picks a random set for every pass over
//! `num_samples` so neighbouring pixels do not share a pattern.

use crate::{ConfigError, ConfigResult};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_4;
use strata_math::Vec2;

/// Number of sample sets generated by default.
pub const DEFAULT_NUM_SETS: usize = 83;

/// Sample distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    /// Cell centers of an n x n grid.
    Regular,
    /// Independent uniform points.
    PureRandom,
    /// One random point per cell of an n x n grid.
    Jittered,
    /// Jittered plus n-rooks: also one point per row and column of the
    /// fine n^2 x n^2 grid.
    #[default]
    MultiJittered,
}

impl SamplerKind {
    /// Largest usable sample count not above `requested` (at least 1).
    ///
    /// Stratified kinds need a perfect square.
    pub fn usable_count(self, requested: u32) -> u32 {
        let requested = requested.max(1);
        match self {
            SamplerKind::PureRandom => requested,
            _ => {
                let n = (requested as f64).sqrt().floor() as u32;
                n * n
            }
        }
    }
}

/// Precomputed sample pool.
#[derive(Debug, Clone)]
pub struct Sampler {
    kind: SamplerKind,
    num_samples: usize,
    num_sets: usize,
    samples: Vec<Vec2>,
    disk_samples: Vec<Vec2>,
    shuffled_indices: Vec<usize>,
}

impl Sampler {
    /// Generate `num_samples` samples per set with [`DEFAULT_NUM_SETS`] sets.
    pub fn new(kind: SamplerKind, num_samples: u32, seed: u64) -> ConfigResult<Self> {
        Self::with_sets(kind, num_samples, DEFAULT_NUM_SETS, seed)
    }

    pub fn with_sets(
        kind: SamplerKind,
        num_samples: u32,
        num_sets: usize,
        seed: u64,
    ) -> ConfigResult<Self> {
        if num_samples == 0 {
            return Err(ConfigError::InvalidSampleCount(num_samples));
        }
        let num_sets = num_sets.max(1);
        let usable = kind.usable_count(num_samples);
        if usable != num_samples {
            log::warn!("{kind:?} sampler needs a square count; using {usable} instead of {num_samples}");
        }
        let num_samples = usable as usize;

        let mut rng = StdRng::seed_from_u64(seed);
        let samples = match kind {
            SamplerKind::Regular => regular(num_samples, num_sets),
            SamplerKind::PureRandom => pure_random(num_samples, num_sets, &mut rng),
            SamplerKind::Jittered => jittered(num_samples, num_sets, &mut rng),
            SamplerKind::MultiJittered => multi_jittered(num_samples, num_sets, &mut rng),
        };
        let disk_samples = samples.iter().map(|&s| concentric_disk(s)).collect();

        let mut shuffled_indices = Vec::with_capacity(num_samples * num_sets);
        let mut order: Vec<usize> = (0..num_samples).collect();
        for _ in 0..num_sets {
            order.shuffle(&mut rng);
            shuffled_indices.extend_from_slice(&order);
        }

        Ok(Self {
            kind,
            num_samples,
            num_sets,
            samples,
            disk_samples,
            shuffled_indices,
        })
    }

    pub fn kind(&self) -> SamplerKind {
        self.kind
    }

    /// Samples per set (after rounding to a usable count).
    pub fn num_samples(&self) -> usize {
        self.num_samples
    }

    pub fn num_sets(&self) -> usize {
        self.num_sets
    }

    /// One set of unit-square samples.
    pub fn square_set(&self, set: usize) -> &[Vec2] {
        let start = (set % self.num_sets) * self.num_samples;
        &self.samples[start..start + self.num_samples]
    }

    /// One set of unit-disk samples, in the same order as [`Self::square_set`].
    pub fn disk_set(&self, set: usize) -> &[Vec2] {
        let start = (set % self.num_sets) * self.num_samples;
        &self.disk_samples[start..start + self.num_samples]
    }

    /// Reader over this pool, deterministic for a given seed.
    pub fn cursor(&self, seed: u64) -> SampleCursor<'_> {
        SampleCursor {
            sampler: self,
            rng: StdRng::seed_from_u64(seed),
            jump: 0,
            count: 0,
        }
    }

    fn sample_index(&self, cursor_jump: usize, count: usize) -> usize {
        cursor_jump + self.shuffled_indices[cursor_jump + count % self.num_samples]
    }
}

/// Per-pixel reader over a [`Sampler`].
///
/// Every `num_samples` draws it jumps to a randomly chosen set, then walks
/// that set in its shuffled order.
pub struct SampleCursor<'a> {
    sampler: &'a Sampler,
    rng: StdRng,
    jump: usize,
    count: usize,
}

impl<'a> SampleCursor<'a> {
    fn next_index(&mut self) -> usize {
        let n = self.sampler.num_samples;
        if self.count % n == 0 {
            self.jump = self.rng.gen_range(0..self.sampler.num_sets) * n;
        }
        let index = self.sampler.sample_index(self.jump, self.count);
        self.count += 1;
        index
    }

    /// Next point in [0, 1)^2.
    pub fn next_square(&mut self) -> Vec2 {
        let i = self.next_index();
        self.sampler.samples[i]
    }

    /// Next point on the unit disk.
    pub fn next_disk(&mut self) -> Vec2 {
        let i = self.next_index();
        self.sampler.disk_samples[i]
    }
}

/// Seed for the sample cursor of pixel `(x, y)`.
pub fn pixel_seed(x: u32, y: u32, seed: u64) -> u64 {
    ((u64::from(y) << 32) | u64::from(x)) ^ seed.rotate_left(29)
}

// =============================================================================
// Pattern generators
// =============================================================================

fn regular(num_samples: usize, num_sets: usize) -> Vec<Vec2> {
    let n = (num_samples as f64).sqrt() as usize;
    let mut samples = Vec::with_capacity(num_samples * num_sets);
    for _ in 0..num_sets {
        for p in 0..n {
            for q in 0..n {
                samples.push(Vec2::new(
                    (q as f32 + 0.5) / n as f32,
                    (p as f32 + 0.5) / n as f32,
                ));
            }
        }
    }
    samples
}

fn pure_random(num_samples: usize, num_sets: usize, rng: &mut StdRng) -> Vec<Vec2> {
    (0..num_samples * num_sets)
        .map(|_| Vec2::new(rng.gen(), rng.gen()))
        .collect()
}

fn jittered(num_samples: usize, num_sets: usize, rng: &mut StdRng) -> Vec<Vec2> {
    let n = (num_samples as f64).sqrt() as usize;
    let mut samples = Vec::with_capacity(num_samples * num_sets);
    for _ in 0..num_sets {
        for j in 0..n {
            for k in 0..n {
                samples.push(Vec2::new(
                    (k as f32 + rng.gen::<f32>()) / n as f32,
                    (j as f32 + rng.gen::<f32>()) / n as f32,
                ));
            }
        }
    }
    samples
}

fn multi_jittered(num_samples: usize, num_sets: usize, rng: &mut StdRng) -> Vec<Vec2> {
    let n = (num_samples as f64).sqrt() as usize;
    let subcell = 1.0 / num_samples as f32;
    let mut samples = vec![Vec2::ZERO; num_samples * num_sets];

    for p in 0..num_sets {
        let set = &mut samples[p * num_samples..(p + 1) * num_samples];

        // Canonical pattern: coarse cell (i, j) holds fine column i*n + j
        // and fine row j*n + i
        for i in 0..n {
            for j in 0..n {
                set[i * n + j] = Vec2::new(
                    ((i * n + j) as f32 + rng.gen::<f32>()) * subcell,
                    ((j * n + i) as f32 + rng.gen::<f32>()) * subcell,
                );
            }
        }

        // Shuffle x within each coarse column
        for i in 0..n {
            for j in 0..n {
                let k = rng.gen_range(j..n);
                let tmp = set[i * n + j].x;
                set[i * n + j].x = set[i * n + k].x;
                set[i * n + k].x = tmp;
            }
        }

        // Shuffle y within each coarse row
        for i in 0..n {
            for j in 0..n {
                let k = rng.gen_range(j..n);
                let tmp = set[j * n + i].y;
                set[j * n + i].y = set[k * n + i].y;
                set[k * n + i].y = tmp;
            }
        }
    }

    samples
}

/// Shirley-Chiu concentric map from [0, 1]^2 to the unit disk.
pub fn concentric_disk(s: Vec2) -> Vec2 {
    let sp = 2.0 * s - Vec2::ONE;

    let (r, phi) = if sp.x > -sp.y {
        if sp.x > sp.y {
            (sp.x, sp.y / sp.x)
        } else {
            (sp.y, 2.0 - sp.x / sp.y)
        }
    } else if sp.x < sp.y {
        (-sp.x, 4.0 + sp.y / sp.x)
    } else if sp.y != 0.0 {
        (-sp.y, 6.0 - sp.x / sp.y)
    } else {
        (-sp.y, 0.0)
    };

    let phi = phi * FRAC_PI_4;
    Vec2::new(r * phi.cos(), r * phi.sin())
}
