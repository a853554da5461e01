//! Gaussian sensor noise.
//!
//! Readings exposed by the thermal and attitude subsystems are corrupted with
//! zero-mean normal noise. The source is injected into the agent so tests can
//! fix the seed or swap in [`ZeroNoise`].

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TWO_PI: f64 = 2.0 * core::f64::consts::PI;

pub trait NoiseSource {
    /// Draw one zero-mean sample with standard deviation `sigma`.
    fn sample(&mut self, sigma: f32) -> f32;

    fn corrupt(&mut self, value: f32, sigma: f32) -> f32 {
        value + self.sample(sigma)
    }
}

/// Box–Muller normal generator over a seeded uniform source.
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    rng: StdRng,
}

impl GaussianNoise {
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when `seed` is set, otherwise seeded from the OS.
    #[must_use]
    pub fn seeded_or_entropy(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::with_seed)
    }

    /// Uniform sample in (0, 1].
    fn unit_uniform(&mut self) -> f64 {
        1.0 - self.rng.gen::<f64>()
    }

    fn standard_normal(&mut self) -> f64 {
        // ln(0) is undefined, redraw until strictly positive
        let mut u = self.unit_uniform();
        while u <= 0.0 {
            u = self.unit_uniform();
        }
        let v = self.unit_uniform();

        (-2.0 * u.ln()).sqrt() * (TWO_PI * v).cos()
    }
}

impl NoiseSource for GaussianNoise {
    fn sample(&mut self, sigma: f32) -> f32 {
        if sigma <= 0.0 {
            return 0.0;
        }
        (f64::from(sigma) * self.standard_normal()) as f32
    }
}

/// Noise source that never perturbs a reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroNoise;

impl NoiseSource for ZeroNoise {
    fn sample(&mut self, _sigma: f32) -> f32 {
        0.0
    }
}

impl<N: NoiseSource + ?Sized> NoiseSource for Box<N> {
    fn sample(&mut self, sigma: f32) -> f32 {
        (**self).sample(sigma)
    }
}
