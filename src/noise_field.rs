// Coherent noise sampler shared by every panel
// Fractal Perlin noise sampled along a single axis, remapped to [0, 1]

use bevy::prelude::*;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

pub const NOISE_SEED: u32 = 42;
const NOISE_OCTAVES: usize = 4;
const NOISE_PERSISTENCE: f64 = 0.5;
const NOISE_LACUNARITY: f64 = 2.0;
// Off-lattice row so integer seeds don't all land on Perlin zeros
const NOISE_ROW: f64 = 0.371;

/// Deterministic 1D coherent noise. Holds no counters, so the same seed always
/// yields the same value and neighbouring seeds yield neighbouring values.
#[derive(Resource, Clone)]
pub struct NoiseField {
    fbm: Fbm<Perlin>,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        let fbm: Fbm<Perlin> = Fbm::new(seed)
            .set_octaves(NOISE_OCTAVES)
            .set_persistence(NOISE_PERSISTENCE)
            .set_lacunarity(NOISE_LACUNARITY)
            .set_frequency(1.0);
        Self { fbm }
    }

    /// Sample the field; result is always within [0, 1]
    /// Frame-derived seeds grow without bound; f64 keeps neighbouring frames apart.
    pub fn sample(&self, seed: f64) -> f32 {
        let raw = self.fbm.get([seed, NOISE_ROW]);
        ((raw * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
    }

    /// Sample re-centred on zero, in [-0.5, 0.5]
    pub fn centered(&self, seed: f64) -> f32 {
        self.sample(seed) - 0.5
    }
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(NOISE_SEED)
    }
}
