//! Progress animation with frame-rate independent exponential damping.
//!
//! `progress' = target + (progress - target) * exp(-dt / duration)`
//!
//! Splitting one long step into many short ones lands on the same value,
//! which the linear `progress += (target - progress) * dt / duration`
//! does not.

/// Direction the progress value is driven this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeDirection {
    /// Materialize toward 1.
    FadeIn,
    /// Dissolve toward 0.
    FadeOut,
    /// Leave progress untouched.
    #[default]
    Hold,
}

impl FadeDirection {
    /// Resolves the per-frame flags. `fade_in` wins when both are set.
    #[must_use]
    pub const fn from_flags(fade_in: bool, fade_out: bool) -> Self {
        if fade_in {
            Self::FadeIn
        } else if fade_out {
            Self::FadeOut
        } else {
            Self::Hold
        }
    }

    /// Target progress for this direction, `None` when holding.
    #[must_use]
    pub const fn target(self) -> Option<f32> {
        match self {
            Self::FadeIn => Some(1.0),
            Self::FadeOut => Some(0.0),
            Self::Hold => None,
        }
    }
}

/// Damps `current` toward `target` over `elapsed` seconds.
///
/// `duration` is the time constant. Non-positive or non-finite durations
/// snap to the target. Negative or NaN elapsed time is treated as zero,
/// which leaves `current` unchanged; infinite elapsed time lands on the
/// target.
#[must_use]
pub fn damp(current: f32, target: f32, duration: f32, elapsed: f32) -> f32 {
    if elapsed.is_nan() || elapsed <= 0.0 {
        return current;
    }
    if elapsed.is_infinite() || !(duration.is_finite() && duration > 0.0) {
        return target;
    }

    let next = target + (current - target) * (-elapsed / duration).exp();
    if (next - target).abs() <= ProgressAnimator::SNAP_EPSILON {
        target
    } else {
        next
    }
}

/// Owns the dissolve progress of one attached surface.
///
/// Never share one animator between surfaces; their progress would couple.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressAnimator {
    /// Current value in [0, 1].
    progress: f32,
    /// Direction selected by the last step.
    direction: FadeDirection,
}

impl ProgressAnimator {
    /// Distance from the target at which progress snaps onto it.
    pub const SNAP_EPSILON: f32 = 0.001;

    /// Creates an animator at zero progress (fully dissolved).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            progress: 0.0,
            direction: FadeDirection::Hold,
        }
    }

    /// Creates an animator at the given progress.
    #[must_use]
    pub fn with_progress(progress: f32) -> Self {
        let mut animator = Self::new();
        animator.set_immediate(progress);
        animator
    }

    /// Returns the current progress.
    #[must_use]
    pub const fn progress(&self) -> f32 {
        self.progress
    }

    /// Returns the direction selected by the last step.
    #[must_use]
    pub const fn direction(&self) -> FadeDirection {
        self.direction
    }

    /// Returns true when progress sits exactly on `target`.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_at(&self, target: f32) -> bool {
        self.progress == target
    }

    /// Jumps to `progress` without animating.
    pub fn set_immediate(&mut self, progress: f32) {
        self.progress = if progress.is_finite() { progress.clamp(0.0, 1.0) } else { 0.0 };
    }

    /// Advances progress toward `target` and returns the new value.
    ///
    /// `target` is clamped to [0, 1].
    pub fn update(&mut self, target: f32, duration: f32, elapsed: f32) -> f32 {
        let target = if target.is_finite() { target.clamp(0.0, 1.0) } else { self.progress };
        self.progress = damp(self.progress, target, duration, elapsed).clamp(0.0, 1.0);
        self.progress
    }

    /// Advances progress in `direction`. `Hold` leaves progress untouched.
    pub fn step(&mut self, direction: FadeDirection, duration: f32, elapsed: f32) -> f32 {
        self.direction = direction;
        match direction.target() {
            Some(target) => self.update(target, duration, elapsed),
            None => self.progress,
        }
    }
}

impl Default for ProgressAnimator {
    fn default() -> Self {
        Self::new()
    }
}
