//! ECS resources that bridge the main thread with the background frame loader.
//!
//! Use [`setup_frame_loader`] once during initialization to spawn the loader
//! thread and insert the [`FrameLoaderBridge`] resource. Call
//! [`shutdown_frame_loader`] during teardown to stop and join the thread.
//!
//! Fetching is abstracted behind [`FrameFetcher`] so hosts can plug in their
//! own image source; [`FsFetcher`] reads frames from the local filesystem.

use crate::events::frameload::{FrameLoadRequest, FrameLoadResult, LoaderCmd};
use crate::systems::frameloader::frame_loader_thread;
use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::info;
use thiserror::Error;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G'];

/// Why a frame could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is empty")]
    Empty(String),
    #[error("{0} is not a JPEG or PNG image")]
    UnknownFormat(String),
}

/// Source of frame images. Runs on the loader thread.
pub trait FrameFetcher: Send + 'static {
    fn fetch(&self, path: &str) -> Result<(), FetchError>;
}

/// Confirms frames by reading them from disk and checking the image signature.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsFetcher;

impl FrameFetcher for FsFetcher {
    fn fetch(&self, path: &str) -> Result<(), FetchError> {
        let bytes = std::fs::read(path).map_err(|source| FetchError::Io {
            path: path.to_string(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(FetchError::Empty(path.to_string()));
        }
        if bytes.starts_with(JPEG_MAGIC) || bytes.starts_with(PNG_MAGIC) {
            Ok(())
        } else {
            Err(FetchError::UnknownFormat(path.to_string()))
        }
    }
}

/// Shared bridge between the ECS world and the loader thread.
#[derive(Resource)]
pub struct FrameLoaderBridge {
    /// Sender for [`LoaderCmd`] messages (ECS -> loader thread).
    pub tx_cmd: Sender<LoaderCmd>,
    /// Receiver for [`FrameLoadResult`] messages (loader thread -> ECS).
    pub rx_result: Receiver<FrameLoadResult>,
    /// Join handle for the background loader thread.
    pub handle: std::thread::JoinHandle<()>,
}

/// Register the `Messages` queues used by the scroll and loader systems.
///
/// Needed even without a loader thread: requests are still written, and
/// results can be injected directly.
pub fn setup_frame_messages(world: &mut World) {
    world.init_resource::<Messages<FrameLoadRequest>>();
    world.init_resource::<Messages<FrameLoadResult>>();
}

/// Spawn the loader thread backed by `fetcher` and register the bridge.
pub fn setup_frame_loader<F: FrameFetcher>(world: &mut World, fetcher: F) {
    let (tx_cmd, rx_cmd) = unbounded::<LoaderCmd>();
    let (tx_result, rx_result) = unbounded::<FrameLoadResult>();

    let handle = std::thread::spawn(move || frame_loader_thread(fetcher, rx_cmd, tx_result));

    world.insert_resource(FrameLoaderBridge {
        tx_cmd,
        rx_result,
        handle,
    });
    setup_frame_messages(world);
}

/// Request shutdown of the loader thread and join it.
///
/// Results still queued in the channel are dropped with the bridge.
pub fn shutdown_frame_loader(world: &mut World) {
    if let Some(bridge) = world.remove_resource::<FrameLoaderBridge>() {
        let _ = bridge.tx_cmd.send(LoaderCmd::Shutdown);
        let _ = bridge.handle.join();
        info!("Frame loader stopped");
    }
}
