//! Scroll-to-frame system.
//!
//! [`scroll_sequence_system`] runs once per tick and, for every animated
//! section:
//!
//! 1. Issues the eager request for frame 1 the first time it sees the section.
//! 2. Measures scroll velocity against the previous tick.
//! 3. Skips sections whose container does not intersect the viewport.
//! 4. Maps the container geometry to a progress value and a target frame
//!    according to the section's [`FramePolicy`].
//! 5. Eases the displayed frame toward the target, faster when scrolling fast.
//! 6. On change, updates [`FrameImage`], triggers [`FrameChangedEvent`] and
//!    requests the preload window around the new frame.
//!
//! The math lives in free functions so it can be checked without a world.

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::frameimage::FrameImage;
use crate::components::scrollcontainer::ScrollContainer;
use crate::components::scrollsequence::{FramePolicy, ScrollSequence};
use crate::events::frameload::FrameLoadRequest;
use crate::events::sequence::FrameChangedEvent;
use crate::resources::debugmode::DebugMode;
use crate::resources::viewport::{ContainerRect, Viewport};
use crate::resources::worldtime::WorldTime;

/// Blend factor used when the page is at rest.
pub const MIN_BLEND: f32 = 0.25;
/// Scroll speed (px/s, scaled by the speed factor) at which the displayed
/// frame snaps straight to the target.
pub const SNAP_VELOCITY: f32 = 2000.0;

/// Progress of an edge-triggered section, in `[0, 1]`.
///
/// - Container entirely inside the viewport: 1.
/// - Top at or above the viewport top: distance scrolled past the top over
///   the scrollable range `height - viewport_height`; 1 when the container is
///   not taller than the viewport.
/// - Otherwise (still entering from below): 0.
///
/// A tall container whose top sits exactly on the viewport top is at 0.
pub fn edge_progress(rect: ContainerRect, viewport_height: f32) -> f32 {
    if !(viewport_height > 0.0 && viewport_height.is_finite())
        || !rect.top.is_finite()
        || !rect.height.is_finite()
    {
        return 0.0;
    }
    let rect = ContainerRect::new(rect.top, rect.height.max(0.0));
    if rect.is_within(viewport_height) {
        return 1.0;
    }
    if rect.top <= 0.0 {
        let range = rect.height - viewport_height;
        if range <= 0.0 {
            return 1.0;
        }
        return (rect.top.abs() / range).clamp(0.0, 1.0);
    }
    0.0
}

/// Progress of a centre-crossing section, in `[0, 1]`, cubic-eased.
///
/// 0.5 when the container centre sits on the viewport centre; 0 and 1 are
/// reached `distance` viewport heights before and after the crossing.
pub fn mirror_progress(rect: ContainerRect, viewport_height: f32, distance: f32) -> f32 {
    let span = viewport_height * distance;
    if !(span > 0.0 && span.is_finite()) || !rect.top.is_finite() || !rect.height.is_finite() {
        return 0.0;
    }
    let offset = viewport_height * 0.5 - rect.center();
    let t = ((offset + span) / (2.0 * span)).clamp(0.0, 1.0);
    ease_cubic_in_out(t)
}

/// Slow start and end (cubic).
pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let p = 2.0 * t - 2.0;
        0.5 * p * p * p + 1.0
    }
}

/// Map progress to a frame: `floor(p * (frame_count - 1)) + 1`, always in
/// `[1, frame_count]`. Non-finite progress maps to frame 1.
pub fn frame_for_progress(progress: f32, frame_count: u32) -> u32 {
    if frame_count <= 1 {
        return 1;
    }
    let p = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let index = (p * (frame_count - 1) as f32).floor() as u32 + 1;
    index.clamp(1, frame_count)
}

/// Forward-then-reverse mapping: progress 0 and 1 show frame 1, progress 0.5
/// shows the last frame.
pub fn mirror_frame(progress: f32, frame_count: u32) -> u32 {
    let p = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    frame_for_progress(1.0 - (2.0 * p - 1.0).abs(), frame_count)
}

/// Progress and target frame of a section under `policy`.
pub fn target_frame(
    policy: FramePolicy,
    rect: ContainerRect,
    viewport_height: f32,
    frame_count: u32,
) -> (f32, u32) {
    match policy {
        FramePolicy::EdgeLinear => {
            let p = edge_progress(rect, viewport_height);
            (p, frame_for_progress(p, frame_count))
        }
        FramePolicy::CenterMirror { distance } => {
            let p = mirror_progress(rect, viewport_height, distance);
            (p, mirror_frame(p, frame_count))
        }
    }
}

/// Scroll speed in px/s between two ticks. 0 without a previous sample or
/// with a non-positive `dt`.
pub fn scroll_velocity(last_scroll: Option<f32>, scroll_offset: f32, dt: f32) -> f32 {
    match last_scroll {
        Some(last) if dt > 0.0 && dt.is_finite() => {
            let v = (scroll_offset - last).abs() / dt;
            if v.is_finite() { v } else { 0.0 }
        }
        _ => 0.0,
    }
}

/// Share of the remaining distance covered this tick, in `[MIN_BLEND, 1]`.
pub fn blend_factor(velocity: f32, speed_factor: f32) -> f32 {
    let blend = MIN_BLEND + velocity * speed_factor / SNAP_VELOCITY;
    if blend.is_finite() {
        blend.clamp(0.0, 1.0)
    } else {
        1.0
    }
}

/// Step from `current` toward `target` by `blend` of the distance, at least
/// one frame and never past the target.
pub fn smooth_toward(current: u32, target: u32, blend: f32) -> u32 {
    if current == target {
        return current;
    }
    let distance = current.abs_diff(target);
    let blend = if blend.is_finite() {
        blend.clamp(0.0, 1.0)
    } else {
        1.0
    };
    let step = ((distance as f32 * blend).round() as u32).clamp(1, distance);
    if target > current {
        current + step
    } else {
        current - step
    }
}

/// Advance every animated section by one tick.
///
/// Contract
/// - Reads [`Viewport`] for the scroll offset and height, [`WorldTime`] for
///   the tick delta.
/// - Mutates [`ScrollSequence`] playback state and [`FrameImage`].
/// - Writes [`FrameLoadRequest`] messages for frame 1 and preload windows.
/// - Triggers [`FrameChangedEvent`] when the displayed frame changes.
pub fn scroll_sequence_system(
    viewport: Res<Viewport>,
    time: Res<WorldTime>,
    debug_mode: Option<Res<DebugMode>>,
    mut query: Query<(
        Entity,
        &ScrollContainer,
        &mut ScrollSequence,
        &mut FrameImage,
    )>,
    mut requests: MessageWriter<FrameLoadRequest>,
    mut commands: Commands,
) {
    let dt = time.delta.max(0.0);
    for (entity, container, mut sequence, mut image) in query.iter_mut() {
        if sequence.prime() {
            requests.write(FrameLoadRequest {
                entity,
                instance: sequence.instance(),
                frame: 1,
                path: sequence.config().path_for(1),
            });
        }

        let velocity = scroll_velocity(sequence.last_scroll(), viewport.scroll_offset, dt);
        sequence.observe_scroll(viewport.scroll_offset, velocity);

        let rect = viewport.rect_of(container);
        if !rect.intersects(viewport.height) {
            continue;
        }

        let (policy, frame_count, speed_factor) = {
            let config = sequence.config();
            (config.policy(), config.frame_count(), config.speed_factor())
        };
        let (progress, target) = target_frame(policy, rect, viewport.height, frame_count);
        let blend = blend_factor(velocity, speed_factor);
        let current = sequence.current_frame();
        let next = smooth_toward(current, target, blend);

        if debug_mode.is_some() {
            info!(
                "[{}] top={:.1} progress={:.3} target={} current={} velocity={:.0}px/s blend={:.2}",
                container.name, rect.top, progress, target, current, velocity, blend
            );
        }

        if !sequence.set_current_frame(next) {
            continue;
        }
        image.show(sequence.config(), next, sequence.is_loaded(next));
        debug!(
            "[{}] frame {} -> {} (target {})",
            container.name, current, next, target
        );
        commands.trigger(FrameChangedEvent {
            entity,
            frame: next,
            target,
            progress,
        });

        for frame in sequence.preload_window(next) {
            if sequence.mark_requested(frame) {
                requests.write(FrameLoadRequest {
                    entity,
                    instance: sequence.instance(),
                    frame,
                    path: sequence.config().path_for(frame),
                });
            }
        }
    }
}
