//! Alpha and edge masks derived from a noise sample and the progress.
//!
//! ```text
//!   noise:  0 ─────────── outer ──── inner ─────────── 1
//!                 hidden     | border  |     opaque
//!   outer = 1 - progress - thickness
//!   inner = 1 - progress
//! ```
//!
//! Both masks are hard 0/1 steps, so opacity is always 0 or 1 and the
//! border band changes color, not translucency.

use crate::color::Rgb;

/// GLSL-style `step`: 1.0 when `x >= edge`.
#[inline]
fn step(edge: f32, x: f32) -> f32 {
    if x >= edge { 1.0 } else { 0.0 }
}

/// Masks for one surface point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DissolveMask {
    /// 1 where the surface is fully shown.
    pub alpha: f32,
    /// 1 inside the edge band just below the alpha cutoff.
    pub border: f32,
}

impl DissolveMask {
    /// Nothing visible.
    pub const HIDDEN: Self = Self { alpha: 0.0, border: 0.0 };

    /// Derives the masks from a normalized noise value.
    ///
    /// A fully dissolved surface (`progress <= 0`) is transparent for every
    /// noise value, including the top of the range.
    #[must_use]
    pub fn evaluate(noise: f32, progress: f32, thickness: f32) -> Self {
        if progress <= 0.0 {
            return Self::HIDDEN;
        }
        let inner = 1.0 - progress;
        let alpha = step(inner, noise);
        let border = step(inner - thickness, noise) - alpha;
        Self { alpha, border }
    }

    /// Final surface opacity (0 or 1).
    #[must_use]
    pub fn opacity(self) -> f32 {
        self.alpha + self.border
    }

    /// Which region the point falls into.
    #[must_use]
    pub fn region(self) -> MaskRegion {
        if self.border > 0.0 {
            MaskRegion::Edge
        } else if self.alpha > 0.0 {
            MaskRegion::Opaque
        } else {
            MaskRegion::Hidden
        }
    }

    /// Blends the shaded base color toward the edge color by `border`.
    #[must_use]
    pub fn composite(self, base: Rgb, edge: Rgb) -> ShadedFragment {
        ShadedFragment {
            color: base.lerp(edge, self.border),
            opacity: self.opacity(),
        }
    }
}

/// Region of the surface a point falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaskRegion {
    /// Fully shown with the base color.
    Opaque,
    /// Drawn in the edge color.
    Edge,
    /// Discarded.
    Hidden,
}

/// Output of the color/opacity stage for one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedFragment {
    /// Final color (linear, may exceed 1 in the edge band).
    pub color: Rgb,
    /// Final opacity (0 or 1).
    pub opacity: f32,
}

impl ShadedFragment {
    /// True when the host should discard the fragment.
    #[must_use]
    pub fn is_discarded(&self) -> bool {
        self.opacity <= 0.0
    }
}
