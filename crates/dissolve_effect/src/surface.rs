//! Host-side surface description: what the effect is attached to.
//!
//! Two attachment modes:
//! - `Attachment::Surface` layers the dissolve stage over an existing
//!   surface that has geometry and a base material.
//! - `Attachment::Material` is a standalone shading stage the host applies
//!   to its own child content. It has no geometry.

use bytemuck::{Pod, Zeroable};

use crate::color::Rgb;

/// Host handle for a renderable surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

/// A point produced by the host's rasterization stage.
///
/// Read-only input to the noise function. Positions are world space;
/// texture coordinates are deliberately not used so the pattern stays
/// consistent when the surface is scaled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    /// World-space position.
    pub world_position: [f32; 3],
}

impl SurfacePoint {
    /// Creates a surface point.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { world_position: [x, y, z] }
    }
}

impl From<[f32; 3]> for SurfacePoint {
    fn from(world_position: [f32; 3]) -> Self {
        Self { world_position }
    }
}

/// Intrinsic appearance used under the dissolve stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseMaterial {
    /// Albedo (linear).
    pub color: Rgb,
}

impl Default for BaseMaterial {
    /// Neutral grey. A new value is built for every attachment.
    fn default() -> Self {
        Self {
            color: Rgb::from_srgb_hex(0x80_8080),
        }
    }
}

/// Vertex consumed by the dissolve vertex shader.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    /// Object-space position [x, y, z].
    pub position: [f32; 3],
    /// Object-space normal [nx, ny, nz].
    pub normal: [f32; 3],
}

impl SurfaceVertex {
    /// Vertex buffer layout for WGPU.
    pub const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,  // position
        1 => Float32x3,  // normal
    ];

    /// Vertex buffer layout descriptor.
    #[must_use]
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SurfaceVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// Host geometry for a surface attachment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceGeometry {
    /// Vertices in object space.
    pub vertices: Vec<SurfaceVertex>,
}

impl SurfaceGeometry {
    /// Creates geometry from positions only (normals left zero).
    #[must_use]
    pub fn from_positions(positions: &[[f32; 3]]) -> Self {
        Self {
            vertices: positions
                .iter()
                .map(|&position| SurfaceVertex { position, normal: [0.0; 3] })
                .collect(),
        }
    }

    /// Unit sphere sampled with a Fibonacci lattice.
    #[must_use]
    pub fn sphere(vertex_count: usize) -> Self {
        let count = vertex_count.max(2);
        let golden = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        let vertices = (0..count)
            .map(|i| {
                let y = 1.0 - (i as f32 / (count - 1) as f32) * 2.0;
                let radius = (1.0 - y * y).max(0.0).sqrt();
                let theta = golden * i as f32;
                let p = [theta.cos() * radius, y, theta.sin() * radius];
                SurfaceVertex { position: p, normal: p }
            })
            .collect();
        Self { vertices }
    }

    /// Returns true when there is nothing to draw.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Column-major 4x4 identity.
pub const IDENTITY: [[f32; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Applies a column-major model matrix to a point.
#[must_use]
pub fn transform_point(m: &[[f32; 4]; 4], p: [f32; 3]) -> [f32; 3] {
    let mut out = [0.0; 3];
    for (row, value) in out.iter_mut().enumerate() {
        *value = m[0][row] * p[0] + m[1][row] * p[1] + m[2][row] * p[2] + m[3][row];
    }
    out
}

/// What the effect is attached to.
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// An existing surface with geometry and a base material.
    Surface {
        /// Host geometry.
        geometry: SurfaceGeometry,
        /// Appearance under the dissolve stage.
        base_material: BaseMaterial,
        /// Column-major model matrix (object -> world).
        transform: [[f32; 4]; 4],
    },
    /// A standalone shading stage applied to host children.
    Material {
        /// Appearance under the dissolve stage.
        base_material: BaseMaterial,
        /// Child content the host renders with this stage.
        children: Vec<SurfaceId>,
    },
}

impl Attachment {
    /// Surface attachment with the default base material and no transform.
    #[must_use]
    pub fn surface(geometry: SurfaceGeometry) -> Self {
        Self::Surface {
            geometry,
            base_material: BaseMaterial::default(),
            transform: IDENTITY,
        }
    }

    /// Standalone material attachment with the default base material.
    #[must_use]
    pub fn material(children: Vec<SurfaceId>) -> Self {
        Self::Material {
            base_material: BaseMaterial::default(),
            children,
        }
    }

    /// Replaces the base material.
    #[must_use]
    pub fn with_base_material(mut self, material: BaseMaterial) -> Self {
        match &mut self {
            Self::Surface { base_material, .. } | Self::Material { base_material, .. } => {
                *base_material = material;
            }
        }
        self
    }

    /// Replaces the model matrix. No-op for material attachments.
    #[must_use]
    pub fn with_transform(mut self, matrix: [[f32; 4]; 4]) -> Self {
        if let Self::Surface { transform, .. } = &mut self {
            *transform = matrix;
        }
        self
    }

    /// Returns the base material.
    #[must_use]
    pub fn base_material(&self) -> &BaseMaterial {
        match self {
            Self::Surface { base_material, .. } | Self::Material { base_material, .. } => {
                base_material
            }
        }
    }

    /// Returns false for the degenerate "no geometry, no children" case.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        match self {
            Self::Surface { geometry, .. } => !geometry.is_empty(),
            Self::Material { children, .. } => !children.is_empty(),
        }
    }

    /// World-space points of a surface attachment. Empty for materials.
    pub fn world_points(&self) -> impl Iterator<Item = SurfacePoint> + '_ {
        let (vertices, transform): (&[SurfaceVertex], &[[f32; 4]; 4]) = match self {
            Self::Surface { geometry, transform, .. } => (&geometry.vertices, transform),
            Self::Material { .. } => (&[], &IDENTITY),
        };
        vertices
            .iter()
            .map(move |v| SurfacePoint::from(transform_point(transform, v.position)))
    }
}
