//! Frame loader thread and the systems that bridge it with the ECS world.
//!
//! - [`frame_loader_thread`] runs on its own OS thread, owns the
//!   [`FrameFetcher`], and answers every load command with a
//!   [`FrameLoadResult`].
//! - [`poll_frame_results`] non-blockingly drains the thread's result
//!   receiver into the ECS message queue each tick.
//! - [`apply_frame_results`] folds results into the matching
//!   [`ScrollSequence`], ignoring results for sections that were torn down.
//! - [`forward_frame_requests`] sends the tick's [`FrameLoadRequest`]s to the
//!   loader thread.
//! - [`update_frame_messages`] advances both message queues at the end of
//!   the tick.
//!
//! The animator never waits on a load; completions may arrive in any order.
//!
//! See also: [`crate::resources::frameloader`] and [`crate::events::frameload`].

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};

use crate::components::frameimage::FrameImage;
use crate::components::scrollsequence::ScrollSequence;
use crate::events::frameload::{FrameLoadRequest, FrameLoadResult, FrameLoadedEvent, LoaderCmd};
use crate::events::sequence::SequenceRevealedEvent;
use crate::resources::frameloader::{FrameFetcher, FrameLoaderBridge};

/// Drain pending results from the loader thread into `Messages<FrameLoadResult>`.
///
/// Does nothing when no loader bridge is installed.
pub fn poll_frame_results(
    bridge: Option<Res<FrameLoaderBridge>>,
    mut writer: MessageWriter<FrameLoadResult>,
) {
    if let Some(bridge) = bridge {
        writer.write_batch(bridge.rx_result.try_iter());
    }
}

/// Apply load results to their sequences.
///
/// - Loaded: the frame joins the loaded set and [`FrameLoadedEvent`] fires.
/// - Failed: the frame leaves the pending set so it can be requested again
///   later; nothing else changes.
/// - Frame 1 resolving either way reveals the section.
/// - Results for despawned sections, or for a different sequence instance
///   on the same entity, are dropped untouched.
pub fn apply_frame_results(
    mut reader: MessageReader<FrameLoadResult>,
    mut query: Query<(&mut ScrollSequence, &mut FrameImage)>,
    mut commands: Commands,
) {
    for result in reader.read() {
        let entity = result.entity();
        let frame = result.frame();
        let Ok((mut sequence, mut image)) = query.get_mut(entity) else {
            debug!("Ignoring frame {} result for removed entity {:?}", frame, entity);
            continue;
        };
        if sequence.instance() != result.instance() {
            debug!(
                "Ignoring frame {} result for stale sequence instance {} on {:?}",
                frame,
                result.instance(),
                entity
            );
            continue;
        }

        let first_frame_loaded = match result {
            FrameLoadResult::Loaded { .. } => {
                if sequence.mark_loaded(frame) {
                    commands.trigger(FrameLoadedEvent { entity, frame });
                }
                if image.frame == frame && !image.loaded {
                    image.loaded = true;
                }
                true
            }
            FrameLoadResult::Failed { error, .. } => {
                warn!("Frame {} failed to load: {}", frame, error);
                sequence.mark_failed(frame);
                false
            }
        };

        if frame == 1 && sequence.reveal() {
            image.visible = true;
            info!(
                "Section {:?} revealed (first frame loaded: {})",
                entity, first_frame_loaded
            );
            commands.trigger(SequenceRevealedEvent {
                entity,
                first_frame_loaded,
            });
        }
    }
}

/// Forward this tick's load requests to the loader thread.
///
/// Without a bridge the requests stay recorded as pending on their sequence.
pub fn forward_frame_requests(
    bridge: Option<Res<FrameLoaderBridge>>,
    mut reader: MessageReader<FrameLoadRequest>,
) {
    let Some(bridge) = bridge else {
        return;
    };
    for request in reader.read() {
        // ignore send error on shutdown
        let _ = bridge.tx_cmd.send(LoaderCmd::Load(request.clone()));
    }
}

/// Advance both frame message queues. Run last in the tick.
pub fn update_frame_messages(
    mut requests: ResMut<Messages<FrameLoadRequest>>,
    mut results: ResMut<Messages<FrameLoadResult>>,
) {
    requests.update();
    results.update();
}

/// Entry point of the dedicated loader thread.
///
/// Blocks on the command channel and answers each [`LoaderCmd::Load`] with
/// exactly one [`FrameLoadResult`]. Exits on [`LoaderCmd::Shutdown`] or when
/// every command sender is gone. Send failures (the world went away) are
/// ignored.
pub fn frame_loader_thread<F: FrameFetcher>(
    fetcher: F,
    rx_cmd: Receiver<LoaderCmd>,
    tx_result: Sender<FrameLoadResult>,
) {
    info!(
        "Frame loader thread starting (id={:?})",
        std::thread::current().id()
    );
    for cmd in rx_cmd.iter() {
        match cmd {
            LoaderCmd::Load(request) => {
                let result = match fetcher.fetch(&request.path) {
                    Ok(()) => FrameLoadResult::loaded(&request),
                    Err(e) => FrameLoadResult::failed(&request, e.to_string()),
                };
                let _ = tx_result.send(result);
            }
            LoaderCmd::Shutdown => break,
        }
    }
    info!("Frame loader thread exiting");
}
