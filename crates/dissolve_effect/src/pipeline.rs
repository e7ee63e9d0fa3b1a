//! Render pipeline description for the dissolve pass.
//!
//! No device is created here. The host builds its `wgpu` pipeline from these
//! descriptors, so the crate stays usable headless.
//!
//! Blend State Configuration:
//! ```text
//! color_blend: SRC_ALPHA + ONE_MINUS_SRC_ALPHA (ADD)
//! alpha_blend: ONE + ONE_MINUS_SRC_ALPHA (ADD)
//! ```
//!
//! Opacity is binary, so blending never produces partial coverage. It is
//! enabled so the host sorts the surface into its transparent pass.

use std::mem;

use crate::shaders::DissolveShaders;
use crate::surface::SurfaceVertex;
use crate::uniforms::{DissolveUniforms, NoiseTableUniforms, TransformUniforms};

/// Binding index of `TransformUniforms`.
pub const TRANSFORM_BINDING: u32 = 0;
/// Binding index of `DissolveUniforms`.
pub const DISSOLVE_BINDING: u32 = 1;
/// Binding index of `NoiseTableUniforms`.
pub const NOISE_TABLE_BINDING: u32 = 2;

/// Pipeline settings for a dissolving surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DissolvePipelineConfig {
    /// Blend state of the color target.
    pub blend: wgpu::BlendState,
    /// Draw in the host's transparent pass.
    pub transparent: bool,
    /// Whether the host should tone map the output. Off so the edge glow
    /// (color x intensity) reaches the HDR target unclamped.
    pub tone_mapped: bool,
    /// Write depth for surviving fragments.
    pub depth_write: bool,
    /// Face culling.
    pub cull_mode: Option<wgpu::Face>,
}

impl Default for DissolvePipelineConfig {
    fn default() -> Self {
        Self {
            blend: wgpu::BlendState::ALPHA_BLENDING,
            transparent: true,
            tone_mapped: false,
            depth_write: true,
            cull_mode: Some(wgpu::Face::Back),
        }
    }
}

impl DissolvePipelineConfig {
    /// Double-sided variant for thin shells where the inside shows through holes.
    #[must_use]
    pub fn double_sided() -> Self {
        Self {
            cull_mode: None,
            ..Self::default()
        }
    }

    /// Bind group layout entries for group 0.
    #[must_use]
    pub fn bind_group_layout_entries() -> [wgpu::BindGroupLayoutEntry; 3] {
        [
            uniform_entry(
                TRANSFORM_BINDING,
                wgpu::ShaderStages::VERTEX,
                mem::size_of::<TransformUniforms>(),
            ),
            uniform_entry(
                DISSOLVE_BINDING,
                wgpu::ShaderStages::FRAGMENT,
                mem::size_of::<DissolveUniforms>(),
            ),
            uniform_entry(
                NOISE_TABLE_BINDING,
                wgpu::ShaderStages::FRAGMENT,
                mem::size_of::<NoiseTableUniforms>(),
            ),
        ]
    }

    /// Vertex buffer layout of `SurfaceVertex`.
    #[must_use]
    pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
        SurfaceVertex::desc()
    }

    /// Color target for the given surface format.
    #[must_use]
    pub fn color_target(&self, format: wgpu::TextureFormat) -> wgpu::ColorTargetState {
        wgpu::ColorTargetState {
            format,
            blend: self.transparent.then_some(self.blend),
            write_mask: wgpu::ColorWrites::ALL,
        }
    }

    /// Primitive state (triangle list, CCW front faces).
    #[must_use]
    pub fn primitive(&self) -> wgpu::PrimitiveState {
        wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: self.cull_mode,
            ..wgpu::PrimitiveState::default()
        }
    }

    /// Depth-stencil state for the given depth format.
    #[must_use]
    pub fn depth_stencil(&self, format: wgpu::TextureFormat) -> wgpu::DepthStencilState {
        wgpu::DepthStencilState {
            format,
            depth_write_enabled: self.depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }
    }

    /// Shader entry points as `(vertex, fragment)`.
    #[must_use]
    pub const fn entry_points() -> (&'static str, &'static str) {
        (DissolveShaders::vertex_entry(), DissolveShaders::fragment_entry())
    }
}

fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    size: usize,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(size as u64),
        },
        count: None,
    }
}
