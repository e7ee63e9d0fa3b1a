//! Multi-surface driver.
//!
//! Owns one `DissolveMaterialEffect` per surface and drives them all from a
//! single per-frame call. Every surface keeps its own animator, so fading
//! one never moves another.
//!
//! ```text
//! host frame ──► DissolveSystem::frame(dt)
//!                  ├── surface 1: flags ──► effect.update ──► side effects
//!                  ├── surface 2: flags ──► effect.update ──► side effects
//!                  └── ...
//!                ◄── FrameReport { completions, shadow changes }
//! ```

use std::collections::BTreeMap;

use crate::effect::{DissolveMaterialEffect, FadeFlags};
use crate::lifecycle::{DissolvePhase, RenderSideEffects};
use crate::surface::SurfaceId;

struct Entry {
    effect: DissolveMaterialEffect,
    flags: FadeFlags,
}

/// Result of one `frame` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    /// Frame number (starts at 1).
    pub frame_number: u64,
    /// Surfaces updated this frame.
    pub surfaces_updated: u32,
    /// Surfaces whose fade-out completed this frame, in id order.
    pub completions: Vec<SurfaceId>,
    /// Side effects per surface, in id order.
    pub side_effects: Vec<(SurfaceId, RenderSideEffects)>,
    /// Surfaces with progress strictly between 0 and 1.
    pub animating: u32,
}

/// Statistics for the dissolve system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DissolveSystemStats {
    /// Total frames driven.
    pub total_frames: u64,
    /// Surfaces currently attached.
    pub attached: u32,
    /// Completions reported since creation.
    pub total_completions: u64,
}

/// Drives every attached dissolve effect once per frame.
#[derive(Default)]
pub struct DissolveSystem {
    entries: BTreeMap<SurfaceId, Entry>,
    frame_count: u64,
    stats: DissolveSystemStats,
}

impl DissolveSystem {
    /// Creates an empty system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches an effect to `id`, returning the effect it replaced.
    pub fn attach(
        &mut self,
        id: SurfaceId,
        effect: DissolveMaterialEffect,
    ) -> Option<DissolveMaterialEffect> {
        tracing::debug!("Dissolve attached to surface {}", id.0);
        let previous = self
            .entries
            .insert(id, Entry { effect, flags: FadeFlags::HOLD })
            .map(|entry| entry.effect);
        self.stats.attached = self.entries.len() as u32;
        previous
    }

    /// Detaches and returns the effect on `id`. Its progress is dropped.
    pub fn detach(&mut self, id: SurfaceId) -> Option<DissolveMaterialEffect> {
        let removed = self.entries.remove(&id).map(|entry| entry.effect);
        if removed.is_some() {
            tracing::debug!("Dissolve detached from surface {}", id.0);
        }
        self.stats.attached = self.entries.len() as u32;
        removed
    }

    /// Sets the flags used for `id` on every following frame.
    ///
    /// Returns false when nothing is attached to `id`.
    pub fn set_flags(&mut self, id: SurfaceId, flags: FadeFlags) -> bool {
        match self.entries.get_mut(&id) {
            Some(entry) => {
                entry.flags = flags;
                true
            }
            None => false,
        }
    }

    /// Current flags for `id`.
    #[must_use]
    pub fn flags(&self, id: SurfaceId) -> Option<FadeFlags> {
        self.entries.get(&id).map(|entry| entry.flags)
    }

    /// Effect attached to `id`.
    #[must_use]
    pub fn get(&self, id: SurfaceId) -> Option<&DissolveMaterialEffect> {
        self.entries.get(&id).map(|entry| &entry.effect)
    }

    /// Mutable effect attached to `id`.
    pub fn get_mut(&mut self, id: SurfaceId) -> Option<&mut DissolveMaterialEffect> {
        self.entries.get_mut(&id).map(|entry| &mut entry.effect)
    }

    /// Phase of the effect attached to `id`.
    #[must_use]
    pub fn phase(&self, id: SurfaceId) -> Option<DissolvePhase> {
        self.get(id).map(DissolveMaterialEffect::phase)
    }

    /// Number of attached surfaces.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advances every attached effect by `elapsed_seconds`.
    pub fn frame(&mut self, elapsed_seconds: f32) -> FrameReport {
        self.frame_count += 1;

        let mut report = FrameReport {
            frame_number: self.frame_count,
            ..FrameReport::default()
        };

        for (&id, entry) in &mut self.entries {
            let side = entry.effect.update(entry.flags, elapsed_seconds);
            report.surfaces_updated += 1;
            if side.completion_fired {
                report.completions.push(id);
            }
            let progress = entry.effect.progress();
            if progress > 0.0 && progress < 1.0 {
                report.animating += 1;
            }
            report.side_effects.push((id, side));
        }

        self.stats.total_frames = self.frame_count;
        self.stats.total_completions += report.completions.len() as u64;
        report
    }

    /// Returns statistics.
    #[must_use]
    pub fn stats(&self) -> DissolveSystemStats {
        self.stats
    }

    /// Returns the current frame count.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::config::EffectParameters;
    use crate::surface::{Attachment, SurfaceGeometry};

    fn effect() -> DissolveMaterialEffect {
        DissolveMaterialEffect::new(
            EffectParameters::new(Rgb::WHITE).with_duration(0.1),
            Attachment::surface(SurfaceGeometry::sphere(16)),
        )
    }

    #[test]
    fn test_surfaces_are_independent() {
        let mut system = DissolveSystem::new();
        system.attach(SurfaceId(1), effect());
        system.attach(SurfaceId(2), effect());
        assert!(system.set_flags(SurfaceId(1), FadeFlags::FADE_IN));

        for _ in 0..10 {
            system.frame(1.0 / 60.0);
        }

        let fading = system.get(SurfaceId(1)).map(DissolveMaterialEffect::progress);
        let idle = system.get(SurfaceId(2)).map(DissolveMaterialEffect::progress);
        assert!(fading.is_some_and(|p| p > 0.5));
        assert_eq!(idle, Some(0.0));
        assert_eq!(system.phase(SurfaceId(2)), Some(DissolvePhase::Idle));
    }

    #[test]
    fn test_completions_reported_once() {
        let mut system = DissolveSystem::new();
        let mut visible = effect();
        visible.set_progress_immediate(1.0);
        system.attach(SurfaceId(7), visible);
        system.set_flags(SurfaceId(7), FadeFlags::FADE_OUT);

        let mut completions = Vec::new();
        for _ in 0..120 {
            completions.extend(system.frame(1.0 / 60.0).completions);
        }

        assert_eq!(completions, vec![SurfaceId(7)]);
        assert_eq!(system.stats().total_completions, 1);
        assert_eq!(system.stats().total_frames, 120);
        assert_eq!(system.phase(SurfaceId(7)), Some(DissolvePhase::Dissolved));
    }

    #[test]
    fn test_attach_detach() {
        let mut system = DissolveSystem::new();
        assert!(system.attach(SurfaceId(1), effect()).is_none());
        assert!(system.attach(SurfaceId(1), effect()).is_some());
        assert_eq!(system.stats().attached, 1);

        assert!(system.detach(SurfaceId(1)).is_some());
        assert!(system.detach(SurfaceId(1)).is_none());
        assert!(system.is_empty());
        assert!(!system.set_flags(SurfaceId(1), FadeFlags::FADE_IN));

        let report = system.frame(0.016);
        assert_eq!(report.surfaces_updated, 0);
        assert_eq!(report.frame_number, 1);
    }

    #[test]
    fn test_report_counts_animating() {
        let mut system = DissolveSystem::new();
        system.attach(SurfaceId(1), effect());
        system.attach(SurfaceId(2), effect());
        system.set_flags(SurfaceId(2), FadeFlags::FADE_IN);

        let report = system.frame(0.016);
        assert_eq!(report.surfaces_updated, 2);
        assert_eq!(report.animating, 1);
        assert_eq!(report.side_effects.len(), 2);
        assert!(!report.side_effects[0].1.shadows_enabled());
        assert!(report.side_effects[1].1.shadows_enabled());
    }
}
