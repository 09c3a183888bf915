//! Loading phase notification.

use bevy_ecs::prelude::*;

/// The application switched from loading to ready.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct LoadingFinishedEvent {
    /// Seconds spent in the loading phase.
    pub elapsed: f32,
    /// True if readiness was signalled before the delay ran out.
    pub signaled: bool,
}
