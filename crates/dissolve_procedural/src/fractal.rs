//! # Fractal Noise
//!
//! Multi-octave (fBm) simplex noise used as the dissolve mask source.
//!
//! The defaults reproduce the look the effect was tuned with:
//! 5 octaves, persistence 0.3, lacunarity 2.0, scale 5.0.

use serde::{Deserialize, Serialize};

use crate::noise::{NoiseSeed, SimplexNoise};

/// Upper bound on octaves. The shader loop is unrolled to this count.
pub const MAX_OCTAVES: u32 = 8;

/// Options for fractal Brownian motion noise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FbmOptions {
    /// Seed for the permutation table.
    pub seed: NoiseSeed,
    /// Number of noise layers (1..=`MAX_OCTAVES`).
    pub octaves: u32,
    /// Amplitude decay per octave (gain).
    pub persistence: f32,
    /// Frequency increase per octave.
    pub lacunarity: f32,
    /// Base frequency applied to the input position.
    pub scale: f32,
    /// Exponent applied to the normalized value (1.0 = unchanged).
    pub redistribution: f32,
    /// Use `|noise|` per octave (billowy look).
    pub turbulence: bool,
    /// Negate turbulent octaves. Ignored without `turbulence`.
    pub ridge: bool,
}

impl Default for FbmOptions {
    fn default() -> Self {
        Self {
            seed: NoiseSeed::default(),
            octaves: 5,
            persistence: 0.3,
            lacunarity: 2.0,
            scale: 5.0,
            redistribution: 1.0,
            turbulence: false,
            ridge: false,
        }
    }
}

impl FbmOptions {
    /// Returns a copy with every field forced into its valid range.
    ///
    /// Non-finite values fall back to the defaults. Every adjustment is
    /// logged at warn level.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();

        let octaves = self.octaves.clamp(1, MAX_OCTAVES);
        if octaves != self.octaves {
            tracing::warn!(requested = self.octaves, octaves, "noise octaves clamped");
        }
        let ridge = self.ridge && self.turbulence;
        if self.ridge && !ridge {
            tracing::warn!("noise ridge ignored without turbulence");
        }

        Self {
            seed: self.seed,
            octaves,
            persistence: clamp_option("persistence", self.persistence, 0.0, defaults.persistence),
            lacunarity: clamp_option("lacunarity", self.lacunarity, f32::EPSILON, defaults.lacunarity),
            scale: clamp_option("scale", self.scale, f32::EPSILON, defaults.scale),
            redistribution: clamp_option(
                "redistribution",
                self.redistribution,
                f32::EPSILON,
                defaults.redistribution,
            ),
            turbulence: self.turbulence,
            ridge,
        }
    }
}

/// Clamps `value` to at least `min`, replacing non-finite input with `fallback`.
fn clamp_option(field: &'static str, value: f32, min: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        tracing::warn!(field, value, fallback, "non-finite noise option replaced");
        return fallback;
    }
    if value < min {
        tracing::warn!(field, value, min, "noise option clamped");
        return min;
    }
    value
}

/// Seeded fractal noise over 3D positions.
///
/// # Example
///
/// ```rust
/// use dissolve_procedural::{FbmOptions, FractalNoise};
///
/// let noise = FractalNoise::new(FbmOptions::default());
/// let value = noise.sample_normalized([0.25, 1.5, -0.75]);
/// assert!((0.0..=1.0).contains(&value));
/// ```
#[derive(Clone, Debug)]
pub struct FractalNoise {
    simplex: SimplexNoise,
    options: FbmOptions,
}

impl FractalNoise {
    /// Creates a fractal noise generator. Options are sanitized.
    #[must_use]
    pub fn new(options: FbmOptions) -> Self {
        let options = options.sanitized();
        Self {
            simplex: SimplexNoise::new(options.seed),
            options,
        }
    }

    /// Returns the (sanitized) options in use.
    #[must_use]
    pub fn options(&self) -> &FbmOptions {
        &self.options
    }

    /// Returns the underlying simplex generator.
    #[must_use]
    pub fn simplex(&self) -> &SimplexNoise {
        &self.simplex
    }

    /// Samples fractal noise in roughly [-1, 1].
    ///
    /// The octave sum is divided by the sum of the amplitudes used.
    #[must_use]
    pub fn sample(&self, position: [f32; 3]) -> f32 {
        let opts = &self.options;
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut max_amplitude = 0.0;

        for _ in 0..opts.octaves {
            let f = frequency * opts.scale;
            let mut value = self.simplex.sample(position[0] * f, position[1] * f, position[2] * f);
            if opts.turbulence {
                value = value.abs();
                if opts.ridge {
                    value = -value;
                }
            }
            total += value * amplitude;
            max_amplitude += amplitude;
            amplitude *= opts.persistence;
            frequency *= opts.lacunarity;
        }

        if max_amplitude > 0.0 {
            total / max_amplitude
        } else {
            0.0
        }
    }

    /// Samples fractal noise mapped to [0, 1].
    #[must_use]
    pub fn sample_normalized(&self, position: [f32; 3]) -> f32 {
        let normalized = (self.sample(position) * 0.5 + 0.5).clamp(0.0, 1.0);
        if (self.options.redistribution - 1.0).abs() < f32::EPSILON {
            normalized
        } else {
            normalized.powf(self.options.redistribution)
        }
    }
}

impl Default for FractalNoise {
    fn default() -> Self {
        Self::new(FbmOptions::default())
    }
}
