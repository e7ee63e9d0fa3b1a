//! Lifecycle side effects: phase tracking, shadow toggling, completion.
//!
//! ## States
//!
//! ```text
//! Idle --fade_in--> FadingIn --progress=1--> Visible
//! Visible --fade_out--> FadingOut --progress<0.1: completion--> --progress=0--> Dissolved
//! ```
//!
//! Completion only fires for a surface that was shown: the latch arms on
//! fade-in or once progress reaches the threshold.
//!
//! `Idle` and `Dissolved` both mean progress 0. The machine never moves on
//! its own; every transition comes from the per-frame flags.

use serde::{Deserialize, Serialize};

use crate::animation::FadeDirection;

/// Progress below which a fade-out reports completion.
pub const COMPLETION_THRESHOLD: f32 = 0.1;

/// Phase of one attached surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DissolvePhase {
    /// Never shown yet (progress 0).
    #[default]
    Idle,
    /// Materializing.
    FadingIn,
    /// Fully shown (progress 1).
    Visible,
    /// Dissolving.
    FadingOut,
    /// Fully dissolved after a fade-out (progress 0).
    Dissolved,
}

impl DissolvePhase {
    /// Computes the phase after a frame.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn next(self, direction: FadeDirection, progress: f32) -> Self {
        match direction {
            FadeDirection::FadeIn if progress >= 1.0 => Self::Visible,
            FadeDirection::FadeIn => Self::FadingIn,
            FadeDirection::FadeOut if progress <= 0.0 => {
                if self == Self::Idle { Self::Idle } else { Self::Dissolved }
            }
            FadeDirection::FadeOut => Self::FadingOut,
            FadeDirection::Hold if progress >= 1.0 => Self::Visible,
            FadeDirection::Hold => self,
        }
    }

    /// Phase after a jump to `progress` with no frame direction.
    ///
    /// The ends map to `Visible` and the zero-progress phases. In between, a
    /// fade already underway keeps its direction; otherwise the jump reads
    /// as moving away from where the surface was.
    #[must_use]
    pub fn settle(self, progress: f32) -> Self {
        if progress >= 1.0 {
            return Self::Visible;
        }
        if progress <= 0.0 {
            return if self == Self::Idle { Self::Idle } else { Self::Dissolved };
        }
        match self {
            Self::FadingIn | Self::FadingOut => self,
            Self::Visible => Self::FadingOut,
            Self::Idle | Self::Dissolved => Self::FadingIn,
        }
    }

    /// True for the two zero-progress phases.
    #[must_use]
    pub const fn is_hidden(self) -> bool {
        matches!(self, Self::Idle | Self::Dissolved)
    }
}

/// Shadow flags the host wants while the surface is not fully dissolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowPolicy {
    /// Cast shadows onto other surfaces.
    pub cast: bool,
    /// Receive shadows from other surfaces.
    pub receive: bool,
}

impl ShadowPolicy {
    /// Neither casts nor receives.
    pub const DISABLED: Self = Self { cast: false, receive: false };
}

impl Default for ShadowPolicy {
    fn default() -> Self {
        Self { cast: true, receive: true }
    }
}

/// Side effects recomputed every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderSideEffects {
    /// Host should let the surface cast shadows.
    pub cast_shadows: bool,
    /// Host should let the surface receive shadows.
    pub receive_shadows: bool,
    /// The completion notification fired on this frame.
    pub completion_fired: bool,
}

impl RenderSideEffects {
    /// True when either shadow flag is on.
    #[must_use]
    pub const fn shadows_enabled(&self) -> bool {
        self.cast_shadows || self.receive_shadows
    }
}

/// Shadow flags for the current progress: off at exactly 0, host policy otherwise.
#[must_use]
pub fn shadow_flags(policy: ShadowPolicy, progress: f32) -> ShadowPolicy {
    if progress <= 0.0 {
        ShadowPolicy::DISABLED
    } else {
        policy
    }
}

/// Fire-once latch for the fade-out completion.
///
/// Starts disarmed. Arms on a fade-in frame or once progress reaches the
/// threshold, then fires the first time a fade-out frame ends below the
/// threshold and stays spent until armed again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionLatch {
    armed: bool,
}

impl CompletionLatch {
    /// Creates a disarmed latch. A surface that was never shown has nothing
    /// to dissolve.
    #[must_use]
    pub const fn new() -> Self {
        Self { armed: false }
    }

    /// Arms the latch when `progress` has reached the threshold.
    pub fn arm_at(&mut self, progress: f32) {
        if progress >= COMPLETION_THRESHOLD {
            self.armed = true;
        }
    }

    /// Returns true when the latch is waiting for the next fade-out.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.armed
    }

    /// Feeds one frame. Returns true on the frame that fires.
    pub fn observe(&mut self, direction: FadeDirection, progress: f32) -> bool {
        self.arm_at(progress);
        match direction {
            FadeDirection::FadeIn => {
                self.armed = true;
                false
            }
            FadeDirection::FadeOut if self.armed && progress < COMPLETION_THRESHOLD => {
                self.armed = false;
                true
            }
            FadeDirection::FadeOut | FadeDirection::Hold => false,
        }
    }
}

impl Default for CompletionLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_cycle() {
        let mut phase = DissolvePhase::Idle;
        phase = phase.next(FadeDirection::FadeIn, 0.4);
        assert_eq!(phase, DissolvePhase::FadingIn);
        phase = phase.next(FadeDirection::FadeIn, 1.0);
        assert_eq!(phase, DissolvePhase::Visible);
        phase = phase.next(FadeDirection::FadeOut, 0.5);
        assert_eq!(phase, DissolvePhase::FadingOut);
        phase = phase.next(FadeDirection::FadeOut, 0.0);
        assert_eq!(phase, DissolvePhase::Dissolved);
        assert!(phase.is_hidden());
    }

    #[test]
    fn test_hold_keeps_phase() {
        assert_eq!(
            DissolvePhase::FadingOut.next(FadeDirection::Hold, 0.3),
            DissolvePhase::FadingOut
        );
        assert_eq!(DissolvePhase::Idle.next(FadeDirection::Hold, 0.0), DissolvePhase::Idle);
        assert_eq!(DissolvePhase::Idle.next(FadeDirection::FadeOut, 0.0), DissolvePhase::Idle);
    }

    #[test]
    fn test_shadows_follow_progress() {
        let policy = ShadowPolicy::default();
        assert_eq!(shadow_flags(policy, 0.0), ShadowPolicy::DISABLED);
        assert_eq!(shadow_flags(policy, 0.01), policy);
        let receive_only = ShadowPolicy { cast: false, receive: true };
        assert_eq!(shadow_flags(receive_only, 1.0), receive_only);
    }

    #[test]
    fn test_settle_after_jump() {
        assert_eq!(DissolvePhase::Idle.settle(1.0), DissolvePhase::Visible);
        assert_eq!(DissolvePhase::FadingOut.settle(1.0), DissolvePhase::Visible);
        assert_eq!(DissolvePhase::Idle.settle(0.0), DissolvePhase::Idle);
        assert_eq!(DissolvePhase::Visible.settle(0.0), DissolvePhase::Dissolved);
        assert_eq!(DissolvePhase::FadingIn.settle(-1.0), DissolvePhase::Dissolved);

        assert_eq!(DissolvePhase::Visible.settle(0.4), DissolvePhase::FadingOut);
        assert_eq!(DissolvePhase::Idle.settle(0.4), DissolvePhase::FadingIn);
        assert_eq!(DissolvePhase::Dissolved.settle(0.4), DissolvePhase::FadingIn);
        assert_eq!(DissolvePhase::FadingOut.settle(0.7), DissolvePhase::FadingOut);
        assert_eq!(DissolvePhase::FadingIn.settle(0.2), DissolvePhase::FadingIn);
    }

    #[test]
    fn test_latch_waits_until_shown() {
        let mut latch = CompletionLatch::new();
        assert!(!latch.is_armed());
        assert!(!latch.observe(FadeDirection::FadeOut, 0.05));
        assert!(!latch.observe(FadeDirection::FadeOut, 0.0));

        latch.arm_at(0.05);
        assert!(!latch.is_armed());
        latch.arm_at(0.1);
        assert!(latch.is_armed());
        assert!(latch.observe(FadeDirection::FadeOut, 0.08));
    }

    #[test]
    fn test_latch_fires_once_and_rearms() {
        let mut latch = CompletionLatch::new();
        assert!(!latch.observe(FadeDirection::FadeOut, 0.5));
        assert!(latch.observe(FadeDirection::FadeOut, 0.09));
        assert!(!latch.observe(FadeDirection::FadeOut, 0.05));
        assert!(!latch.observe(FadeDirection::Hold, 0.05));
        assert!(!latch.observe(FadeDirection::FadeOut, 0.0));

        assert!(!latch.observe(FadeDirection::FadeIn, 0.3));
        assert!(latch.is_armed());
        assert!(latch.observe(FadeDirection::FadeOut, 0.02));
    }
}
