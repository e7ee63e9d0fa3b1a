//! # DISSOLVE Procedural Noise
//!
//! Deterministic coherent noise for the dissolve boundary.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same boundary
//! 2. **Position-only**: Noise depends on world position, never on time,
//!    so the boundary does not swim between frames
//! 3. **GPU parity**: The permutation table is exported for the shader
//!
//! ## Core Components
//!
//! - `SimplexNoise`: seeded 3D simplex noise in [-1, 1]
//! - `FractalNoise`: multi-octave fBm, normalized to [0, 1]
//!
//! ## Example
//!
//! ```rust
//! use dissolve_procedural::{FbmOptions, FractalNoise, NoiseSeed};
//!
//! let noise = FractalNoise::new(FbmOptions {
//!     seed: NoiseSeed::new(7),
//!     ..FbmOptions::default()
//! });
//! let mask_source = noise.sample_normalized([1.0, 2.0, 3.0]);
//! assert!((0.0..=1.0).contains(&mask_source));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

pub mod fractal;
pub mod noise;

pub use fractal::{FbmOptions, FractalNoise, MAX_OCTAVES};
pub use noise::{NoiseSeed, SimplexNoise, PERMUTATION_SIZE};
