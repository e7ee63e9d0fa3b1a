//! Effect configuration.
//!
//! `EffectParameters` is what the effect runs on. `DissolveConfig` is the
//! TOML form a host loads once at startup:
//!
//! ```toml
//! color = "#ff6a00"
//! thickness = 0.1
//! intensity = 50.0
//! duration = 1.2
//!
//! [noise]
//! seed = 1
//! octaves = 5
//!
//! [shadows]
//! cast = true
//! receive = true
//! ```

use std::path::Path;

use dissolve_procedural::FbmOptions;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::error::{DissolveError, DissolveResult};
use crate::lifecycle::ShadowPolicy;

/// Default edge band width in noise units.
pub const DEFAULT_THICKNESS: f32 = 0.1;
/// Default edge color multiplier (HDR glow).
pub const DEFAULT_INTENSITY: f32 = 50.0;
/// Default animation time constant in seconds.
pub const DEFAULT_DURATION: f32 = 1.2;
/// Smallest accepted edge band width.
pub const MIN_THICKNESS: f32 = 1e-4;
/// Smallest accepted time constant.
pub const MIN_DURATION: f32 = 1e-3;

/// Parameters the effect runs on.
///
/// Always pass through `sanitized` before use; the effect does this in
/// `set_configuration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParameters {
    /// Edge band width in noise-normalized units.
    pub thickness: f32,
    /// Edge highlight hue.
    pub edge_color: Rgb,
    /// Multiplier applied to the edge color.
    pub intensity: f32,
    /// Time constant of the progress animation, in seconds.
    pub duration_seconds: f32,
}

impl EffectParameters {
    /// Creates parameters with the default thickness, intensity and duration.
    #[must_use]
    pub fn new(edge_color: Rgb) -> Self {
        Self {
            thickness: DEFAULT_THICKNESS,
            edge_color,
            intensity: DEFAULT_INTENSITY,
            duration_seconds: DEFAULT_DURATION,
        }
    }

    /// Sets the edge band width.
    #[must_use]
    pub fn with_thickness(mut self, thickness: f32) -> Self {
        self.thickness = thickness;
        self
    }

    /// Sets the edge intensity.
    #[must_use]
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Sets the animation time constant.
    #[must_use]
    pub fn with_duration(mut self, duration_seconds: f32) -> Self {
        self.duration_seconds = duration_seconds;
        self
    }

    /// Edge color pre-multiplied by intensity, as uploaded to the shader.
    #[must_use]
    pub fn premultiplied_edge_color(&self) -> Rgb {
        self.edge_color.scaled(self.intensity)
    }

    /// Returns a copy with every field forced into its valid range.
    ///
    /// Non-finite values fall back to defaults. Each correction is logged.
    #[must_use]
    pub fn sanitized(self) -> Self {
        let thickness = clamp_min("thickness", self.thickness, MIN_THICKNESS, DEFAULT_THICKNESS);
        let intensity = clamp_min("intensity", self.intensity, 0.0, DEFAULT_INTENSITY);
        let duration_seconds =
            clamp_min("duration", self.duration_seconds, MIN_DURATION, DEFAULT_DURATION);

        let edge_color = if self.edge_color.is_finite() {
            self.edge_color
        } else {
            tracing::warn!("edge color is not finite, using white");
            Rgb::WHITE
        };

        Self {
            thickness,
            edge_color,
            intensity,
            duration_seconds,
        }
    }
}

/// Clamps `value` to at least `min`, replacing non-finite input with `fallback`.
fn clamp_min(field: &'static str, value: f32, min: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        tracing::warn!(field, value, fallback, "non-finite configuration value replaced");
        return fallback;
    }
    if value < min {
        tracing::warn!(field, value, min, "configuration value clamped");
        return min;
    }
    value
}

/// TOML form of the effect configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DissolveConfig {
    /// Edge highlight hue. Required.
    pub color: Rgb,
    /// Edge band width.
    #[serde(default = "default_thickness")]
    pub thickness: f32,
    /// Edge color multiplier.
    #[serde(default = "default_intensity")]
    pub intensity: f32,
    /// Animation time constant in seconds.
    #[serde(default = "default_duration")]
    pub duration: f32,
    /// Noise field options.
    #[serde(default)]
    pub noise: FbmOptions,
    /// Host shadow preference.
    #[serde(default)]
    pub shadows: ShadowPolicy,
}

fn default_thickness() -> f32 {
    DEFAULT_THICKNESS
}

fn default_intensity() -> f32 {
    DEFAULT_INTENSITY
}

fn default_duration() -> f32 {
    DEFAULT_DURATION
}

impl DissolveConfig {
    /// Creates a configuration with defaults for everything but the color.
    #[must_use]
    pub fn new(color: Rgb) -> Self {
        Self {
            color,
            thickness: DEFAULT_THICKNESS,
            intensity: DEFAULT_INTENSITY,
            duration: DEFAULT_DURATION,
            noise: FbmOptions::default(),
            shadows: ShadowPolicy::default(),
        }
    }

    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns `DissolveError::Parse` when the text is not valid TOML, a
    /// field has the wrong type, `color` is missing, or `color` is not a
    /// recognized color string.
    pub fn from_toml_str(text: &str) -> DissolveResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns `DissolveError::Io` when the file cannot be read, otherwise
    /// the errors of `from_toml_str`.
    pub fn from_toml_file(path: impl AsRef<Path>) -> DissolveResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| DissolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded dissolve configuration");
        Ok(config)
    }

    /// Effect parameters described by this configuration.
    #[must_use]
    pub fn parameters(&self) -> EffectParameters {
        EffectParameters {
            thickness: self.thickness,
            edge_color: self.color,
            intensity: self.intensity,
            duration_seconds: self.duration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let config = DissolveConfig::from_toml_str("color = \"#ffffff\"").unwrap();
        assert!((config.thickness - 0.1).abs() < f32::EPSILON);
        assert!((config.intensity - 50.0).abs() < f32::EPSILON);
        assert!((config.duration - 1.2).abs() < f32::EPSILON);
        assert_eq!(config.noise, FbmOptions::default());
        assert_eq!(config.shadows, ShadowPolicy::default());
    }

    #[test]
    fn test_color_is_required() {
        let err = DissolveConfig::from_toml_str("thickness = 0.2").unwrap_err();
        assert!(matches!(err, DissolveError::Parse(_)));
        assert!(err.to_string().contains("color"), "{err}");
    }

    #[test]
    fn test_bad_color_rejected() {
        let err = DissolveConfig::from_toml_str("color = \"not-a-color\"").unwrap_err();
        assert!(matches!(err, DissolveError::Parse(_)));
    }

    #[test]
    fn test_nested_sections() {
        let config = DissolveConfig::from_toml_str(
            r##"
            color = "#00ffff"
            duration = 0.5

            [noise]
            seed = 9
            octaves = 3

            [shadows]
            cast = false
            "##,
        )
        .unwrap();

        assert_eq!(config.noise.octaves, 3);
        assert_eq!(config.noise.seed.value(), 9);
        assert!((config.noise.persistence - 0.3).abs() < f32::EPSILON);
        assert!(!config.shadows.cast);
        assert!(config.shadows.receive);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = DissolveConfig::from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, DissolveError::Io { .. }));
    }

    #[test]
    fn test_sanitize_clamps() {
        let params = EffectParameters::new(Rgb::WHITE)
            .with_thickness(-1.0)
            .with_duration(0.0)
            .with_intensity(f32::NAN)
            .sanitized();

        assert!((params.thickness - MIN_THICKNESS).abs() < f32::EPSILON);
        assert!((params.duration_seconds - MIN_DURATION).abs() < f32::EPSILON);
        assert!((params.intensity - DEFAULT_INTENSITY).abs() < f32::EPSILON);
    }

    #[test]
    fn test_premultiplied_color() {
        let params = EffectParameters::new(Rgb::rgb(0.5, 0.25, 0.0)).with_intensity(4.0);
        assert_eq!(params.premultiplied_edge_color(), Rgb::rgb(2.0, 1.0, 0.0));
    }
}
