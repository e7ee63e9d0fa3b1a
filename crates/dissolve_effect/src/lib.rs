//! # DISSOLVE Effect
//!
//! Procedural dissolve transition for rendered surfaces:
//! - Noise-driven boundary that eats through the surface
//! - Glowing edge band in an HDR color
//! - Frame-rate independent progress animation
//! - One-shot completion notification after a fade-out
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      PER FRAME (host)                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  FadeFlags + dt → ProgressAnimator → progress                │
//! │       ↓                                  ↓                   │
//! │  Phase / Shadows / Completion     DissolveUniforms (GPU)     │
//! │                                          ↓                   │
//! │  world position → fBm noise → alpha/border masks → color     │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use dissolve_effect::{
//!     Attachment, DissolveMaterialEffect, EffectParameters, FadeFlags, Rgb, SurfaceGeometry,
//! };
//!
//! let params = EffectParameters::new(Rgb::rgb(1.0, 0.4, 0.0));
//! let mut effect =
//!     DissolveMaterialEffect::new(params, Attachment::surface(SurfaceGeometry::sphere(32)));
//!
//! let side = effect.update(FadeFlags::FADE_IN, 1.0 / 60.0);
//! assert!(effect.progress() > 0.0);
//! assert!(side.shadows_enabled());
//! ```
//!
//! ## MANDATE
//!
//! - No errors in the frame path
//! - No allocations in `update`
//! - CPU masks and GPU masks agree

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]
#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]

pub mod animation;
pub mod color;
pub mod config;
pub mod effect;
pub mod error;
pub mod lifecycle;
pub mod mask;
pub mod pipeline;
pub mod shaders;
pub mod surface;
pub mod system;
pub mod uniforms;

pub use animation::{damp, FadeDirection, ProgressAnimator};
pub use color::Rgb;
pub use config::{DissolveConfig, EffectParameters};
pub use effect::{Coverage, DissolveMaterialEffect, FadeFlags};
pub use error::{DissolveError, DissolveResult};
pub use lifecycle::{
    CompletionLatch, DissolvePhase, RenderSideEffects, ShadowPolicy, COMPLETION_THRESHOLD,
};
pub use mask::{DissolveMask, MaskRegion, ShadedFragment};
pub use pipeline::DissolvePipelineConfig;
pub use shaders::DissolveShaders;
pub use surface::{Attachment, BaseMaterial, SurfaceGeometry, SurfaceId, SurfacePoint, SurfaceVertex};
pub use system::{DissolveSystem, DissolveSystemStats, FrameReport};
pub use uniforms::{DissolveUniforms, NoiseTableUniforms, TransformUniforms};

// Noise types used in configuration
pub use dissolve_procedural::{FbmOptions, NoiseSeed};
