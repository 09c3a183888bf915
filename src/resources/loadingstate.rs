//! Application loading store.
//!
//! The page starts in [`LoadingPhase::Loading`] and switches to
//! [`LoadingPhase::Ready`] exactly once: when the configured delay has
//! elapsed, or earlier if a readiness signal arrives. Readers query the
//! resource instead of a process-wide flag; see
//! [`crate::systems::loading::update_loading_state`] for the system that
//! drives it.

use bevy_ecs::prelude::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingPhase {
    #[default]
    Loading,
    Ready,
}

#[derive(Resource, Debug, Clone)]
pub struct LoadingState {
    phase: LoadingPhase,
    elapsed: f32,
    delay: f32,
    ready_signaled: bool,
}

impl LoadingState {
    /// Start loading; the phase ends after at most `delay` seconds.
    pub fn new(delay: f32) -> Self {
        Self {
            phase: LoadingPhase::Loading,
            elapsed: 0.0,
            delay: if delay.is_finite() { delay.max(0.0) } else { 0.0 },
            ready_signaled: false,
        }
    }

    pub fn phase(&self) -> LoadingPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadingPhase::Loading
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// Fraction of the delay spent so far, in `[0, 1]`.
    pub fn fraction(&self) -> f32 {
        match self.phase {
            LoadingPhase::Ready => 1.0,
            LoadingPhase::Loading if self.delay <= 0.0 => 1.0,
            LoadingPhase::Loading => (self.elapsed / self.delay).clamp(0.0, 1.0),
        }
    }

    /// Request the switch to ready on the next [`advance`](Self::advance).
    pub fn signal_ready(&mut self) {
        self.ready_signaled = true;
    }

    /// Advance the clock by `dt` seconds. Returns true on the call that
    /// switches the phase to ready.
    pub fn advance(&mut self, dt: f32) -> bool {
        if self.phase == LoadingPhase::Ready {
            return false;
        }
        if dt.is_finite() {
            self.elapsed += dt.max(0.0);
        }
        if self.ready_signaled || self.elapsed >= self.delay {
            self.phase = LoadingPhase::Ready;
            return true;
        }
        false
    }
}
