//! # Simplex Noise Implementation
//!
//! Deterministic 3D simplex noise sampled from surface positions.
//!
//! ## Why Simplex over Perlin?
//!
//! - Fewer directional artifacts
//! - Better gradient distribution
//! - 4 corners per sample in 3D instead of 8
//!
//! ## Determinism Guarantee
//!
//! Given the same `NoiseSeed`, this implementation produces
//! **exactly** the same values on any platform, any time. The
//! permutation table is exposed so the GPU path can use the identical
//! table (see `SimplexNoise::permutation`).

use serde::{Deserialize, Serialize};

/// Seed for deterministic noise generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoiseSeed(u64);

impl NoiseSeed {
    /// Creates a new noise seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose.
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for NoiseSeed {
    fn default() -> Self {
        Self(1)
    }
}

/// Number of distinct permutation entries.
pub const PERMUTATION_SIZE: usize = 256;

/// 12 gradient vectors pointing to the edge midpoints of a cube.
const GRAD3: [[i8; 3]; 12] = [
    [1, 1, 0], [-1, 1, 0], [1, -1, 0], [-1, -1, 0],
    [1, 0, 1], [-1, 0, 1], [1, 0, -1], [-1, 0, -1],
    [0, 1, 1], [0, -1, 1], [0, 1, -1], [0, -1, -1],
];

/// Pre-computed permutation table for noise.
///
/// This is computed once from the seed and reused.
#[derive(Clone)]
struct PermutationTable {
    /// 512-entry permutation table (256 entries, doubled for overflow handling).
    perm: [u8; 512],
}

impl PermutationTable {
    /// Creates a new permutation table from a seed.
    fn new(seed: NoiseSeed) -> Self {
        let mut perm = [0u8; 512];

        // Identity permutation
        for (i, slot) in perm.iter_mut().take(PERMUTATION_SIZE).enumerate() {
            *slot = i as u8;
        }

        // Fisher-Yates shuffle with xorshift64. A zero state would never
        // advance, so the seed is mixed first.
        let mut rng_state = seed.derive(0x5EED).value();
        if rng_state == 0 {
            rng_state = 0x9E37_79B9_7F4A_7C15;
        }
        for i in (1..PERMUTATION_SIZE).rev() {
            rng_state ^= rng_state << 13;
            rng_state ^= rng_state >> 7;
            rng_state ^= rng_state << 17;

            let j = (rng_state % (i as u64 + 1)) as usize;
            perm.swap(i, j);
        }

        // Double the table to avoid index wrapping
        perm.copy_within(..PERMUTATION_SIZE, PERMUTATION_SIZE);

        Self { perm }
    }

    /// Gets a permutation value (with automatic wrapping).
    #[inline]
    fn get(&self, index: usize) -> usize {
        usize::from(self.perm[index & 511])
    }
}

/// 3D Simplex noise generator.
///
/// Produces smooth, continuous noise values in the range [-1, 1].
///
/// # Example
///
/// ```rust
/// use dissolve_procedural::{NoiseSeed, SimplexNoise};
///
/// let noise = SimplexNoise::new(NoiseSeed::new(42));
/// let value = noise.sample(0.3, 1.7, -2.2);
/// assert!((-1.0..=1.0).contains(&value));
/// ```
#[derive(Clone)]
pub struct SimplexNoise {
    perm_table: PermutationTable,
    seed: NoiseSeed,
}

impl SimplexNoise {
    /// Skewing factor for the 3D simplex grid.
    const F3: f32 = 1.0 / 3.0;
    /// Unskewing factor for the 3D simplex grid.
    const G3: f32 = 1.0 / 6.0;

    /// Creates a new simplex noise generator from a seed.
    #[must_use]
    pub fn new(seed: NoiseSeed) -> Self {
        Self {
            perm_table: PermutationTable::new(seed),
            seed,
        }
    }

    /// Returns the seed this generator was built from.
    #[must_use]
    pub fn seed(&self) -> NoiseSeed {
        self.seed
    }

    /// Returns the 256 base permutation entries.
    ///
    /// The shader indexes this table with `i & 255`, which is equivalent to
    /// the doubled table used on the CPU.
    #[must_use]
    pub fn permutation(&self) -> [u8; PERMUTATION_SIZE] {
        let mut out = [0u8; PERMUTATION_SIZE];
        out.copy_from_slice(&self.perm_table.perm[..PERMUTATION_SIZE]);
        out
    }

    /// Samples 3D simplex noise at the given coordinates.
    ///
    /// # Returns
    ///
    /// A value in the range [-1, 1].
    #[must_use]
    #[allow(clippy::many_single_char_names, clippy::similar_names)]
    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        // Skew input space to find the containing simplex cell
        let skew = (x + y + z) * Self::F3;
        let i = fast_floor(x + skew);
        let j = fast_floor(y + skew);
        let k = fast_floor(z + skew);

        // Unskew the cell origin back to (x, y, z) space. Summed in f32 so
        // far-away cells cannot overflow the integer lattice.
        let unskew = (i as f32 + j as f32 + k as f32) * Self::G3;
        let x0 = x - (i as f32 - unskew);
        let y0 = y - (j as f32 - unskew);
        let z0 = z - (k as f32 - unskew);

        // Determine which of the six tetrahedra we are in
        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        // Offsets for the remaining corners
        let x1 = x0 - i1 as f32 + Self::G3;
        let y1 = y0 - j1 as f32 + Self::G3;
        let z1 = z0 - k1 as f32 + Self::G3;
        let x2 = x0 - i2 as f32 + 2.0 * Self::G3;
        let y2 = y0 - j2 as f32 + 2.0 * Self::G3;
        let z2 = z0 - k2 as f32 + 2.0 * Self::G3;
        let x3 = x0 - 1.0 + 3.0 * Self::G3;
        let y3 = y0 - 1.0 + 3.0 * Self::G3;
        let z3 = z0 - 1.0 + 3.0 * Self::G3;

        // Hash corner coordinates to gradient indices
        let ii = (i & 255) as usize;
        let jj = (j & 255) as usize;
        let kk = (k & 255) as usize;
        let p = &self.perm_table;

        let gi0 = p.get(ii + p.get(jj + p.get(kk)));
        let gi1 = p.get(ii + i1 + p.get(jj + j1 + p.get(kk + k1)));
        let gi2 = p.get(ii + i2 + p.get(jj + j2 + p.get(kk + k2)));
        let gi3 = p.get(ii + 1 + p.get(jj + 1 + p.get(kk + 1)));

        let n0 = contribution(x0, y0, z0, gi0);
        let n1 = contribution(x1, y1, z1, gi1);
        let n2 = contribution(x2, y2, z2, gi2);
        let n3 = contribution(x3, y3, z3, gi3);

        // The factor 32 scales the sum to roughly [-1, 1]
        (32.0 * (n0 + n1 + n2 + n3)).clamp(-1.0, 1.0)
    }

    /// Samples noise at a position given as an array.
    #[inline]
    #[must_use]
    pub fn sample_point(&self, position: [f32; 3]) -> f32 {
        self.sample(position[0], position[1], position[2])
    }
}

impl std::fmt::Debug for SimplexNoise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimplexNoise").field("seed", &self.seed).finish()
    }
}

/// Contribution from one corner of the simplex.
#[inline]
fn contribution(x: f32, y: f32, z: f32, hash: usize) -> f32 {
    let t = 0.6 - x * x - y * y - z * z;
    if t < 0.0 {
        0.0
    } else {
        let grad = GRAD3[hash % 12];
        let t2 = t * t;
        t2 * t2 * (x * f32::from(grad[0]) + y * f32::from(grad[1]) + z * f32::from(grad[2]))
    }
}

/// Floor to `i64` without going through `f32::floor`.
///
/// The cast saturates for positions beyond the `i64` range, so the
/// decrement wraps instead of overflowing. Only `& 255` of the result is
/// ever hashed.
#[inline]
fn fast_floor(x: f32) -> i64 {
    let xi = x as i64;
    if x < xi as f32 { xi.wrapping_sub(1) } else { xi }
}
