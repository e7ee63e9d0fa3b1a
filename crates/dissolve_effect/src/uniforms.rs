//! Uniform blocks consumed by the dissolve shaders.
//!
//! Layouts are `#[repr(C)]` and packed into `vec4` slots so they match the
//! WGSL structs in `shaders.rs` byte for byte.

use bytemuck::{Pod, Zeroable};
use dissolve_procedural::{FbmOptions, SimplexNoise, PERMUTATION_SIZE};

use crate::color::Rgb;
use crate::config::EffectParameters;

/// Per-draw dissolve uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct DissolveUniforms {
    /// Edge color pre-multiplied by intensity (rgb), thickness (w).
    pub edge_color_thickness: [f32; 4],
    /// Progress, noise scale, persistence, lacunarity.
    pub progress_scale: [f32; 4],
    /// Octaves, redistribution, turbulence (0/1), ridge (0/1).
    pub noise_config: [f32; 4],
    /// Base material color (rgb), alpha (w). Used by the unlit entry point.
    pub base_color: [f32; 4],
}

impl DissolveUniforms {
    /// Builds uniforms from parameters, noise options and progress.
    #[must_use]
    pub fn new(params: &EffectParameters, noise: &FbmOptions, progress: f32) -> Self {
        let mut uniforms = Self {
            base_color: [1.0; 4],
            ..Self::default()
        };
        uniforms.sync_parameters(params);
        uniforms.sync_noise(noise);
        uniforms.set_progress(progress);
        uniforms
    }

    /// Writes the base material color.
    pub fn set_base_color(&mut self, color: Rgb) {
        let [r, g, b] = color.to_array();
        self.base_color = [r, g, b, 1.0];
    }

    /// Re-syncs thickness and the pre-multiplied edge color.
    pub fn sync_parameters(&mut self, params: &EffectParameters) {
        let [r, g, b] = params.premultiplied_edge_color().to_array();
        self.edge_color_thickness = [r, g, b, params.thickness];
    }

    /// Re-syncs the noise shape.
    pub fn sync_noise(&mut self, noise: &FbmOptions) {
        self.progress_scale[1] = noise.scale;
        self.progress_scale[2] = noise.persistence;
        self.progress_scale[3] = noise.lacunarity;
        self.noise_config = [
            noise.octaves as f32,
            noise.redistribution,
            f32::from(u8::from(noise.turbulence)),
            f32::from(u8::from(noise.ridge)),
        ];
    }

    /// Writes the current progress.
    pub fn set_progress(&mut self, progress: f32) {
        self.progress_scale[0] = progress;
    }

    /// Current progress.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress_scale[0]
    }

    /// Edge band width.
    #[must_use]
    pub fn thickness(&self) -> f32 {
        self.edge_color_thickness[3]
    }

    /// Pre-multiplied edge color.
    #[must_use]
    pub fn edge_color(&self) -> [f32; 3] {
        let [r, g, b, _] = self.edge_color_thickness;
        [r, g, b]
    }

    /// Raw bytes for a uniform buffer upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Permutation table packed four entries per `u32`.
///
/// Entry `i` lives in `perm[i / 16][(i / 4) % 4]`, byte `i % 4`
/// (little end first).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct NoiseTableUniforms {
    /// Packed permutation entries.
    pub perm: [[u32; 4]; PERMUTATION_SIZE / 16],
}

impl NoiseTableUniforms {
    /// Packs the table of a simplex generator.
    #[must_use]
    pub fn from_simplex(simplex: &SimplexNoise) -> Self {
        let table = simplex.permutation();
        let mut perm = [[0u32; 4]; PERMUTATION_SIZE / 16];
        for (i, &entry) in table.iter().enumerate() {
            perm[i / 16][(i / 4) % 4] |= u32::from(entry) << ((i % 4) * 8);
        }
        Self { perm }
    }

    /// Unpacks entry `index & 255`, mirroring the shader's `perm()` helper.
    #[must_use]
    pub fn entry(&self, index: usize) -> u8 {
        let i = index & (PERMUTATION_SIZE - 1);
        ((self.perm[i / 16][(i / 4) % 4] >> ((i % 4) * 8)) & 0xFF) as u8
    }

    /// Raw bytes for a uniform buffer upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

/// Camera and model matrices for the vertex stage.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct TransformUniforms {
    /// View-projection matrix (column-major).
    pub view_proj: [[f32; 4]; 4],
    /// Model matrix (column-major), object -> world.
    pub model: [[f32; 4]; 4],
}

impl TransformUniforms {
    /// Creates transform uniforms.
    #[must_use]
    pub const fn new(view_proj: [[f32; 4]; 4], model: [[f32; 4]; 4]) -> Self {
        Self { view_proj, model }
    }
}
