//! The dissolve material effect.
//!
//! One instance per attached surface. The host calls `update` once per frame
//! with the fade flags and the elapsed time; the effect advances its own
//! progress, re-syncs the shader uniforms and reports the side effects the
//! host must apply (shadow flags, completion).
//!
//! ```text
//! FadeFlags ──► ProgressAnimator ──► progress ──┬─► DissolveUniforms (GPU)
//!                                               ├─► DissolvePhase
//!                                               ├─► shadow flags
//!                                               └─► CompletionLatch ──► on_fade_out
//! ```

use std::fmt;

use dissolve_procedural::{FbmOptions, FractalNoise};

use crate::animation::{FadeDirection, ProgressAnimator};
use crate::color::Rgb;
use crate::config::{DissolveConfig, EffectParameters};
use crate::lifecycle::{
    shadow_flags, CompletionLatch, DissolvePhase, RenderSideEffects, ShadowPolicy,
};
use crate::mask::{DissolveMask, MaskRegion, ShadedFragment};
use crate::surface::{Attachment, SurfacePoint};
use crate::uniforms::{DissolveUniforms, NoiseTableUniforms};

/// Per-frame direction flags supplied by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct FadeFlags {
    /// Drive progress toward 1.
    pub fade_in: bool,
    /// Drive progress toward 0.
    pub fade_out: bool,
}

impl FadeFlags {
    /// Neither flag set; progress holds.
    pub const HOLD: Self = Self::new(false, false);
    /// Materialize.
    pub const FADE_IN: Self = Self::new(true, false);
    /// Dissolve.
    pub const FADE_OUT: Self = Self::new(false, true);

    /// Creates flags.
    #[must_use]
    pub const fn new(fade_in: bool, fade_out: bool) -> Self {
        Self { fade_in, fade_out }
    }

    /// Resolved direction. `fade_in` wins when both are set.
    #[must_use]
    pub const fn direction(self) -> FadeDirection {
        FadeDirection::from_flags(self.fade_in, self.fade_out)
    }
}

/// Region counts over the vertices of a surface attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coverage {
    /// Vertices drawn with the base color.
    pub opaque: usize,
    /// Vertices drawn with the edge color.
    pub edge: usize,
    /// Vertices discarded.
    pub hidden: usize,
}

impl Coverage {
    /// Total vertices counted.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.opaque + self.edge + self.hidden
    }

    /// Fraction of counted vertices that are drawn (0 when empty).
    #[must_use]
    pub fn visible_fraction(&self) -> f32 {
        match self.total() {
            0 => 0.0,
            total => (self.opaque + self.edge) as f32 / total as f32,
        }
    }
}

type FadeOutCallback = Box<dyn FnMut()>;

/// Noise-driven dissolve layered onto a surface or used as a standalone
/// shading stage.
pub struct DissolveMaterialEffect {
    params: EffectParameters,
    noise: FractalNoise,
    uniforms: DissolveUniforms,
    noise_table: NoiseTableUniforms,
    animator: ProgressAnimator,
    phase: DissolvePhase,
    latch: CompletionLatch,
    shadow_policy: ShadowPolicy,
    side_effects: RenderSideEffects,
    attachment: Attachment,
    on_fade_out: Option<FadeOutCallback>,
}

impl DissolveMaterialEffect {
    /// Attaches an effect at progress 0 with the default noise options.
    #[must_use]
    pub fn new(params: EffectParameters, attachment: Attachment) -> Self {
        Self::with_noise(params, FbmOptions::default(), attachment)
    }

    /// Attaches an effect with explicit noise options.
    #[must_use]
    pub fn with_noise(params: EffectParameters, noise: FbmOptions, attachment: Attachment) -> Self {
        let params = params.sanitized();
        let noise = FractalNoise::new(noise);
        let mut uniforms = DissolveUniforms::new(&params, noise.options(), 0.0);
        uniforms.set_base_color(attachment.base_material().color);
        let noise_table = NoiseTableUniforms::from_simplex(noise.simplex());

        if !attachment.is_renderable() {
            tracing::debug!("dissolve attached to an empty target, nothing will render");
        }

        Self {
            params,
            noise,
            uniforms,
            noise_table,
            animator: ProgressAnimator::new(),
            phase: DissolvePhase::Idle,
            latch: CompletionLatch::new(),
            shadow_policy: ShadowPolicy::default(),
            side_effects: RenderSideEffects::default(),
            attachment,
            on_fade_out: None,
        }
    }

    /// Builds an effect from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &DissolveConfig, attachment: Attachment) -> Self {
        let mut effect = Self::with_noise(config.parameters(), config.noise, attachment);
        effect.shadow_policy = config.shadows;
        effect
    }

    /// Replaces the parameters without resetting progress.
    pub fn set_configuration(&mut self, params: EffectParameters) {
        self.params = params.sanitized();
        self.uniforms.sync_parameters(&self.params);
        tracing::debug!(
            thickness = self.params.thickness,
            intensity = self.params.intensity,
            duration = self.params.duration_seconds,
            "dissolve parameters synced"
        );
    }

    /// Replaces the noise field. The boundary pattern changes immediately.
    pub fn set_noise(&mut self, options: FbmOptions) {
        self.noise = FractalNoise::new(options);
        self.uniforms.sync_noise(self.noise.options());
        self.noise_table = NoiseTableUniforms::from_simplex(self.noise.simplex());
        tracing::debug!(seed = self.noise.options().seed.value(), "dissolve noise synced");
    }

    /// Sets the host's shadow preference, applied while progress > 0.
    pub fn set_shadow_policy(&mut self, policy: ShadowPolicy) {
        self.shadow_policy = policy;
    }

    /// Registers the fade-out completion callback, replacing any previous one.
    pub fn set_on_fade_out(&mut self, callback: impl FnMut() + 'static) {
        self.on_fade_out = Some(Box::new(callback));
    }

    /// Removes the completion callback. Completion is still reported in
    /// `RenderSideEffects`.
    pub fn clear_on_fade_out(&mut self) {
        self.on_fade_out = None;
    }

    /// Jumps to `progress` without animating, e.g. to start fully visible.
    ///
    /// The phase settles to match the new progress and the completion latch
    /// arms when the jump lands at or above the threshold.
    pub fn set_progress_immediate(&mut self, progress: f32) {
        self.animator.set_immediate(progress);
        let progress = self.animator.progress();
        self.uniforms.set_progress(progress);
        self.latch.arm_at(progress);

        let phase = self.phase.settle(progress);
        if phase != self.phase {
            tracing::debug!("Dissolve phase set: {:?} -> {:?} (progress {:.3})", self.phase, phase, progress);
            self.phase = phase;
        }
    }

    /// Advances one frame.
    ///
    /// `elapsed_seconds` is the frame delta; negative or NaN values count as
    /// zero and an infinite delta finishes the fade.
    pub fn update(&mut self, flags: FadeFlags, elapsed_seconds: f32) -> RenderSideEffects {
        let direction = flags.direction();
        let progress = self
            .animator
            .step(direction, self.params.duration_seconds, elapsed_seconds);
        self.uniforms.set_progress(progress);

        let phase = self.phase.next(direction, progress);
        if phase != self.phase {
            tracing::info!("Dissolve phase: {:?} -> {:?} (progress {:.3})", self.phase, phase, progress);
            self.phase = phase;
        }

        let shadows = shadow_flags(self.shadow_policy, progress);
        let completion_fired = self.latch.observe(direction, progress);
        if completion_fired {
            tracing::info!("Dissolve fade-out complete at progress {:.3}", progress);
            if let Some(callback) = self.on_fade_out.as_mut() {
                callback();
            }
        }

        self.side_effects = RenderSideEffects {
            cast_shadows: shadows.cast,
            receive_shadows: shadows.receive,
            completion_fired,
        };
        self.side_effects
    }

    /// Normalized noise in [0, 1] at a world-space point.
    #[must_use]
    pub fn noise_at(&self, point: SurfacePoint) -> f32 {
        self.noise.sample_normalized(point.world_position)
    }

    /// Masks at a point for the current progress.
    #[must_use]
    pub fn mask_at(&self, point: SurfacePoint) -> DissolveMask {
        DissolveMask::evaluate(self.noise_at(point), self.progress(), self.params.thickness)
    }

    /// Final color and opacity at a point over the given base color.
    #[must_use]
    pub fn shade(&self, point: SurfacePoint, base: Rgb) -> ShadedFragment {
        self.mask_at(point)
            .composite(base, self.params.premultiplied_edge_color())
    }

    /// Same as `shade`, over the attachment's base material color.
    #[must_use]
    pub fn shade_base(&self, point: SurfacePoint) -> ShadedFragment {
        self.shade(point, self.attachment.base_material().color)
    }

    /// Region counts over the attachment's vertices in world space.
    #[must_use]
    pub fn coverage(&self) -> Coverage {
        self.attachment
            .world_points()
            .fold(Coverage::default(), |mut coverage, point| {
                match self.mask_at(point).region() {
                    MaskRegion::Opaque => coverage.opaque += 1,
                    MaskRegion::Edge => coverage.edge += 1,
                    MaskRegion::Hidden => coverage.hidden += 1,
                }
                coverage
            })
    }

    /// Uniform block for the fragment stage.
    #[must_use]
    pub fn uniforms(&self) -> &DissolveUniforms {
        &self.uniforms
    }

    /// Permutation table for the fragment stage.
    #[must_use]
    pub fn noise_table(&self) -> &NoiseTableUniforms {
        &self.noise_table
    }

    /// Current progress in [0, 1].
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.animator.progress()
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> DissolvePhase {
        self.phase
    }

    /// Side effects computed by the last `update`.
    #[must_use]
    pub fn side_effects(&self) -> RenderSideEffects {
        self.side_effects
    }

    /// Sanitized parameters in use.
    #[must_use]
    pub fn parameters(&self) -> &EffectParameters {
        &self.params
    }

    /// Noise options in use.
    #[must_use]
    pub fn noise_options(&self) -> &FbmOptions {
        self.noise.options()
    }

    /// Host shadow preference.
    #[must_use]
    pub fn shadow_policy(&self) -> ShadowPolicy {
        self.shadow_policy
    }

    /// What the effect is attached to.
    #[must_use]
    pub fn attachment(&self) -> &Attachment {
        &self.attachment
    }

    /// False when there is neither geometry nor child content to draw.
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.attachment.is_renderable()
    }
}

impl fmt::Debug for DissolveMaterialEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DissolveMaterialEffect")
            .field("params", &self.params)
            .field("progress", &self.animator.progress())
            .field("phase", &self.phase)
            .field("shadow_policy", &self.shadow_policy)
            .field("has_on_fade_out", &self.on_fade_out.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::surface::SurfaceGeometry;

    const FRAME: f32 = 1.0 / 60.0;

    fn effect() -> DissolveMaterialEffect {
        let params = EffectParameters::new(Rgb::rgb(1.0, 0.4, 0.0)).with_duration(0.2);
        DissolveMaterialEffect::new(params, Attachment::surface(SurfaceGeometry::sphere(64)))
    }

    fn counter(effect: &mut DissolveMaterialEffect) -> Rc<Cell<u32>> {
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        effect.set_on_fade_out(move || seen.set(seen.get() + 1));
        calls
    }

    #[test]
    fn test_starts_dissolved() {
        let effect = effect();
        assert_eq!(effect.progress(), 0.0);
        assert_eq!(effect.phase(), DissolvePhase::Idle);
        assert_eq!(effect.coverage().hidden, 64);
        assert_eq!(effect.uniforms().progress(), 0.0);
    }

    #[test]
    fn test_fade_in_reaches_visible() {
        let mut effect = effect();
        for _ in 0..240 {
            effect.update(FadeFlags::FADE_IN, FRAME);
        }
        assert_eq!(effect.progress(), 1.0);
        assert_eq!(effect.phase(), DissolvePhase::Visible);
        assert_eq!(effect.coverage().opaque, 64);
        assert!(effect.side_effects().shadows_enabled());
    }

    #[test]
    fn test_hold_does_not_move() {
        let mut effect = effect();
        effect.set_progress_immediate(0.6);
        let before = effect.progress();
        effect.update(FadeFlags::HOLD, 5.0);
        assert_eq!(effect.progress(), before);
    }

    #[test]
    fn test_fade_in_wins_over_fade_out() {
        let mut effect = effect();
        effect.update(FadeFlags::new(true, true), FRAME);
        assert!(effect.progress() > 0.0);
    }

    #[test]
    fn test_completion_fires_once_at_first_frame_below_threshold() {
        let mut effect = effect();
        effect.set_progress_immediate(1.0);
        let calls = counter(&mut effect);

        let mut fired_at = None;
        let mut previous = effect.progress();
        for frame in 0..240 {
            let side = effect.update(FadeFlags::FADE_OUT, FRAME);
            if side.completion_fired {
                assert!(fired_at.is_none(), "fired twice");
                assert!(effect.progress() < 0.1);
                assert!(previous >= 0.1);
                fired_at = Some(frame);
            }
            previous = effect.progress();
        }

        assert!(fired_at.is_some());
        assert_eq!(calls.get(), 1);
        assert_eq!(effect.progress(), 0.0);
        assert_eq!(effect.phase(), DissolvePhase::Dissolved);
    }

    #[test]
    fn test_completion_rearms_after_fade_in() {
        let mut effect = effect();
        effect.set_progress_immediate(1.0);
        let calls = counter(&mut effect);

        for _ in 0..2 {
            for _ in 0..240 {
                effect.update(FadeFlags::FADE_OUT, FRAME);
            }
            for _ in 0..240 {
                effect.update(FadeFlags::FADE_IN, FRAME);
            }
        }
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_cleared_callback_still_reports() {
        let mut effect = effect();
        effect.set_progress_immediate(0.5);
        let calls = counter(&mut effect);
        effect.clear_on_fade_out();

        let fired = (0..240).any(|_| effect.update(FadeFlags::FADE_OUT, FRAME).completion_fired);
        assert!(fired);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_never_shown_does_not_complete() {
        let mut effect = effect();
        let calls = counter(&mut effect);

        for _ in 0..60 {
            let side = effect.update(FadeFlags::FADE_OUT, FRAME);
            assert!(!side.completion_fired);
        }
        effect.set_progress_immediate(0.05);
        assert!(!effect.update(FadeFlags::FADE_OUT, FRAME).completion_fired);
        assert_eq!(calls.get(), 0);
        assert_eq!(effect.phase(), DissolvePhase::FadingOut);
    }

    #[test]
    fn test_immediate_progress_settles_phase() {
        let mut effect = effect();
        effect.set_progress_immediate(0.0);
        assert_eq!(effect.phase(), DissolvePhase::Idle);

        effect.set_progress_immediate(1.0);
        assert_eq!(effect.phase(), DissolvePhase::Visible);

        effect.set_progress_immediate(0.4);
        assert_eq!(effect.phase(), DissolvePhase::FadingOut);

        effect.set_progress_immediate(0.0);
        assert_eq!(effect.phase(), DissolvePhase::Dissolved);
        assert!(effect.phase().is_hidden());

        effect.set_progress_immediate(0.3);
        assert_eq!(effect.phase(), DissolvePhase::FadingIn);
    }

    #[test]
    fn test_shadows_off_only_at_zero() {
        let mut effect = effect();
        let side = effect.update(FadeFlags::HOLD, FRAME);
        assert!(!side.shadows_enabled());

        let side = effect.update(FadeFlags::FADE_IN, FRAME);
        assert!(side.cast_shadows && side.receive_shadows);

        effect.set_shadow_policy(ShadowPolicy { cast: false, receive: true });
        let side = effect.update(FadeFlags::FADE_IN, FRAME);
        assert!(!side.cast_shadows);
        assert!(side.receive_shadows);
    }

    #[test]
    fn test_set_configuration_keeps_progress() {
        let mut effect = effect();
        effect.set_progress_immediate(0.5);
        effect.set_configuration(EffectParameters::new(Rgb::WHITE).with_thickness(0.3));

        assert_eq!(effect.progress(), 0.5);
        assert!((effect.uniforms().thickness() - 0.3).abs() < f32::EPSILON);
        assert_eq!(effect.uniforms().edge_color(), [50.0, 50.0, 50.0]);
    }

    #[test]
    fn test_shade_covers_every_region() {
        let mut effect = effect();
        effect.set_progress_immediate(0.5);

        // Thickness 0.1 at progress 0.5: edge band is noise in [0.4, 0.5)
        let mut grid = Vec::new();
        for i in 0..20 {
            for j in 0..20 {
                for k in 0..20 {
                    grid.push(SurfacePoint::new(i as f32 * 0.05, j as f32 * 0.05, k as f32 * 0.05));
                }
            }
        }
        let find = |low: f32, high: f32| {
            grid.iter()
                .copied()
                .find(|&point| (low..high).contains(&effect.noise_at(point)))
        };

        let edge = effect.parameters().premultiplied_edge_color();
        let base = effect.attachment().base_material().color;

        let in_band = find(0.41, 0.49).expect("grid has a point in the band");
        let fragment = effect.shade_base(in_band);
        assert_eq!(fragment.color, edge);
        assert!(!fragment.is_discarded());

        let shown = find(0.51, 1.01).expect("grid has a shown point");
        let fragment = effect.shade_base(shown);
        assert_eq!(fragment.color, base);
        assert_eq!(fragment.opacity, 1.0);

        let gone = find(-0.01, 0.39).expect("grid has a hidden point");
        assert!(effect.shade_base(gone).is_discarded());
    }

    #[test]
    fn test_masks_are_deterministic() {
        let mut a = effect();
        let mut b = effect();
        a.set_progress_immediate(0.37);
        b.set_progress_immediate(0.37);

        for i in 0..50 {
            let point = SurfacePoint::new(i as f32 * 0.13, 1.0 - i as f32 * 0.07, 0.5);
            assert_eq!(a.mask_at(point), b.mask_at(point));
        }
    }

    #[test]
    fn test_empty_material_is_not_renderable() {
        let mut effect =
            DissolveMaterialEffect::new(EffectParameters::new(Rgb::WHITE), Attachment::material(vec![]));
        assert!(!effect.is_renderable());
        effect.update(FadeFlags::FADE_IN, 1.0);
        assert_eq!(effect.coverage(), Coverage::default());
        assert_eq!(effect.coverage().visible_fraction(), 0.0);
    }

    #[test]
    fn test_set_noise_resyncs_table() {
        let mut effect = effect();
        let before = *effect.noise_table();
        effect.set_noise(FbmOptions {
            seed: dissolve_procedural::NoiseSeed::new(99),
            octaves: 3,
            ..FbmOptions::default()
        });
        assert_ne!(*effect.noise_table(), before);
        assert_eq!(effect.uniforms().noise_config[0], 3.0);
    }
}
