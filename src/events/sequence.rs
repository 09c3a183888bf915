//! Playback notifications emitted by the scroll system.
//!
//! Observers can subscribe to these to drive rendering or bookkeeping
//! without polling every [`FrameImage`](crate::components::frameimage::FrameImage).
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<FrameChangedEvent>| {
//!     log::info!("frame {}", trigger.event().frame);
//! });
//! ```

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;

use crate::resources::framelog::FrameChangeLog;

/// The displayed frame of a section changed.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct FrameChangedEvent {
    pub entity: Entity,
    /// Frame now displayed (after smoothing).
    pub frame: u32,
    /// Frame the scroll position maps to; differs from `frame` while easing.
    pub target: u32,
    /// Progress value that produced `target`.
    pub progress: f32,
}

/// A section's first frame resolved and it may now be shown.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceRevealedEvent {
    pub entity: Entity,
    /// False when the section was revealed because frame 1 failed to load.
    pub first_frame_loaded: bool,
}

/// Observer counting frame changes per section in [`FrameChangeLog`].
pub fn record_frame_change(trigger: On<FrameChangedEvent>, mut log: ResMut<FrameChangeLog>) {
    let event = trigger.event();
    log.record(event.entity, event.frame);
}
