//! Displayed frame of an animated section.
//!
//! [`FrameImage`] is what renderers consume: the frame currently selected,
//! its resource path, whether the section may be shown yet, and whether the
//! selected frame is confirmed loaded. It starts hidden until the first frame
//! of the sequence resolves.

use bevy_ecs::prelude::Component;
use serde::Serialize;

use crate::components::scrollsequence::SequenceConfig;

#[derive(Component, Debug, Clone, PartialEq, Serialize)]
pub struct FrameImage {
    pub frame: u32,
    pub path: String,
    /// False until the first frame loaded or definitively failed.
    pub visible: bool,
    /// Whether `frame` is confirmed loaded.
    pub loaded: bool,
}

impl FrameImage {
    pub fn new(config: &SequenceConfig) -> Self {
        Self {
            frame: 1,
            path: config.path_for(1),
            visible: false,
            loaded: false,
        }
    }

    /// Point the image at another frame of the same sequence.
    pub fn show(&mut self, config: &SequenceConfig, frame: u32, loaded: bool) {
        self.frame = frame;
        self.path = config.path_for(frame);
        self.loaded = loaded;
    }
}
