//! Dissolve Shaders
//!
//! WGSL source for drawing a dissolving surface:
//! 1. Vertex Shader - Transforms to clip space, forwards the WORLD position
//! 2. Fragment Shader - fBm noise, alpha/border masks, edge glow, discard
//!
//! ## Bindings (group 0)
//!
//! ```text
//! binding 0: TransformUniforms   (vertex)
//! binding 1: DissolveUniforms    (fragment)
//! binding 2: NoiseTableUniforms  (fragment)
//! ```
//!
//! The fragment stage evaluates the same simplex lattice as
//! `dissolve_procedural::SimplexNoise`, reading the permutation from
//! binding 2, so CPU queries (`DissolveMaterialEffect::mask_at`) agree with
//! what is drawn.
//!
//! Hosts layering the effect over their own lit color can paste the
//! fragment source and call `dissolve_apply(world_position, base)`.

/// WGSL shader sources for the dissolve pass.
pub struct DissolveShaders;

impl DissolveShaders {
    /// Returns the vertex shader source (`vs_main`).
    #[must_use]
    pub fn vertex_shader() -> &'static str {
        DISSOLVE_VERTEX_WGSL
    }

    /// Returns the fragment shader source (`fs_main`, `dissolve_apply`).
    #[must_use]
    pub fn fragment_shader() -> &'static str {
        DISSOLVE_FRAGMENT_WGSL
    }

    /// Vertex entry point name.
    #[must_use]
    pub const fn vertex_entry() -> &'static str {
        "vs_main"
    }

    /// Fragment entry point name.
    #[must_use]
    pub const fn fragment_entry() -> &'static str {
        "fs_main"
    }
}

/// Vertex shader: world position out, no UVs involved.
const DISSOLVE_VERTEX_WGSL: &str = r#"
struct TransformUniforms {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
}

@group(0) @binding(0) var<uniform> transform: TransformUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
}

@vertex
fn vs_main(in: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world = transform.model * vec4<f32>(in.position, 1.0);
    out.clip_position = transform.view_proj * world;
    out.world_position = world.xyz;
    out.world_normal = (transform.model * vec4<f32>(in.normal, 0.0)).xyz;
    return out;
}
"#;

/// Fragment shader: noise, masks, edge color, discard.
const DISSOLVE_FRAGMENT_WGSL: &str = r#"
struct DissolveUniforms {
    // rgb: edge color * intensity, w: thickness
    edge_color_thickness: vec4<f32>,
    // x: progress, y: scale, z: persistence, w: lacunarity
    progress_scale: vec4<f32>,
    // x: octaves, y: redistribution, z: turbulence, w: ridge
    noise_config: vec4<f32>,
    base_color: vec4<f32>,
}

struct NoiseTableUniforms {
    perm: array<vec4<u32>, 16>,
}

@group(0) @binding(1) var<uniform> dissolve: DissolveUniforms;
@group(0) @binding(2) var<uniform> noise_table: NoiseTableUniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_position: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
}

const MAX_OCTAVES: u32 = 8u;
const F3: f32 = 0.33333334;
const G3: f32 = 0.16666667;

const GRAD3: array<vec3<f32>, 12> = array<vec3<f32>, 12>(
    vec3<f32>(1.0, 1.0, 0.0), vec3<f32>(-1.0, 1.0, 0.0),
    vec3<f32>(1.0, -1.0, 0.0), vec3<f32>(-1.0, -1.0, 0.0),
    vec3<f32>(1.0, 0.0, 1.0), vec3<f32>(-1.0, 0.0, 1.0),
    vec3<f32>(1.0, 0.0, -1.0), vec3<f32>(-1.0, 0.0, -1.0),
    vec3<f32>(0.0, 1.0, 1.0), vec3<f32>(0.0, -1.0, 1.0),
    vec3<f32>(0.0, 1.0, -1.0), vec3<f32>(0.0, -1.0, -1.0),
);

// Entry i lives in perm[i / 16][(i / 4) % 4], byte i % 4
fn perm(index: i32) -> i32 {
    let i = u32(index) & 255u;
    let word = noise_table.perm[i / 16u][(i / 4u) % 4u];
    return i32((word >> ((i % 4u) * 8u)) & 255u);
}

fn corner(p: vec3<f32>, hash: i32) -> f32 {
    let t = 0.6 - dot(p, p);
    if t < 0.0 {
        return 0.0;
    }
    // Runtime indexing needs a function-local copy of the table
    var grads = GRAD3;
    let t2 = t * t;
    return t2 * t2 * dot(grads[hash % 12], p);
}

fn simplex3(v: vec3<f32>) -> f32 {
    // Skew to the simplex cell
    let s = (v.x + v.y + v.z) * F3;
    let cell = floor(v + vec3<f32>(s));
    let t = (cell.x + cell.y + cell.z) * G3;
    let x0 = v - (cell - vec3<f32>(t));

    var i1: vec3<i32>;
    var i2: vec3<i32>;
    if x0.x >= x0.y {
        if x0.y >= x0.z {
            i1 = vec3<i32>(1, 0, 0); i2 = vec3<i32>(1, 1, 0);
        } else if x0.x >= x0.z {
            i1 = vec3<i32>(1, 0, 0); i2 = vec3<i32>(1, 0, 1);
        } else {
            i1 = vec3<i32>(0, 0, 1); i2 = vec3<i32>(1, 0, 1);
        }
    } else {
        if x0.y < x0.z {
            i1 = vec3<i32>(0, 0, 1); i2 = vec3<i32>(0, 1, 1);
        } else if x0.x < x0.z {
            i1 = vec3<i32>(0, 1, 0); i2 = vec3<i32>(0, 1, 1);
        } else {
            i1 = vec3<i32>(0, 1, 0); i2 = vec3<i32>(1, 1, 0);
        }
    }

    let x1 = x0 - vec3<f32>(i1) + vec3<f32>(G3);
    let x2 = x0 - vec3<f32>(i2) + vec3<f32>(2.0 * G3);
    let x3 = x0 - vec3<f32>(1.0) + vec3<f32>(3.0 * G3);

    let c = vec3<i32>(cell) & vec3<i32>(255);
    let gi0 = perm(c.x + perm(c.y + perm(c.z)));
    let gi1 = perm(c.x + i1.x + perm(c.y + i1.y + perm(c.z + i1.z)));
    let gi2 = perm(c.x + i2.x + perm(c.y + i2.y + perm(c.z + i2.z)));
    let gi3 = perm(c.x + 1 + perm(c.y + 1 + perm(c.z + 1)));

    let n = corner(x0, gi0) + corner(x1, gi1) + corner(x2, gi2) + corner(x3, gi3);
    return clamp(32.0 * n, -1.0, 1.0);
}

fn fbm(p: vec3<f32>) -> f32 {
    let octaves = u32(dissolve.noise_config.x);
    let turbulence = dissolve.noise_config.z > 0.5;
    let ridge = dissolve.noise_config.w > 0.5;

    var total: f32 = 0.0;
    var amplitude: f32 = 1.0;
    var frequency: f32 = 1.0;
    var max_amplitude: f32 = 0.0;

    for (var i = 0u; i < MAX_OCTAVES; i++) {
        if i >= octaves {
            break;
        }
        var value = simplex3(p * (frequency * dissolve.progress_scale.y));
        if turbulence {
            value = abs(value);
            if ridge {
                value = -value;
            }
        }
        total += value * amplitude;
        max_amplitude += amplitude;
        amplitude *= dissolve.progress_scale.z;
        frequency *= dissolve.progress_scale.w;
    }

    if max_amplitude > 0.0 {
        return total / max_amplitude;
    }
    return 0.0;
}

fn dissolve_noise(world_position: vec3<f32>) -> f32 {
    let n = clamp(fbm(world_position) * 0.5 + 0.5, 0.0, 1.0);
    let redistribution = dissolve.noise_config.y;
    if abs(redistribution - 1.0) < 1.1920929e-7 {
        return n;
    }
    return clamp(pow(n, redistribution), 0.0, 1.0);
}

// rgb: mixed color, a: opacity (0 or 1)
fn dissolve_apply(world_position: vec3<f32>, base: vec3<f32>) -> vec4<f32> {
    let progress = dissolve.progress_scale.x;
    if progress <= 0.0 {
        return vec4<f32>(base, 0.0);
    }

    let noise = dissolve_noise(world_position);
    let inner = 1.0 - progress;
    let alpha = step(inner, noise);
    let border = step(inner - dissolve.edge_color_thickness.w, noise) - alpha;

    let color = mix(base, dissolve.edge_color_thickness.rgb, vec3<f32>(border));
    return vec4<f32>(color, alpha + border);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let shaded = dissolve_apply(in.world_position, dissolve.base_color.rgb);
    if shaded.a <= 0.0 {
        discard;
    }
    return shaded;
}
"#;
