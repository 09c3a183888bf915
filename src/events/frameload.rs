//! Frame load requests and results.
//!
//! The scroll system writes [`FrameLoadRequest`] messages; they are forwarded
//! as [`LoaderCmd`]s to the background loader thread, whose answers come back
//! as [`FrameLoadResult`] messages. Every message carries the target entity
//! and its sequence instance token so that answers for torn-down sections can
//! be recognised and dropped.
//!
//! [`FrameLoadedEvent`] is triggered whenever a live sequence accepts a
//! loaded frame.

use bevy_ecs::prelude::*;

/// Ask the loader to fetch one frame of one sequence.
#[derive(Message, Debug, Clone, PartialEq)]
pub struct FrameLoadRequest {
    pub entity: Entity,
    pub instance: u64,
    pub frame: u32,
    pub path: String,
}

/// Commands sent *to* the loader thread.
#[derive(Debug, Clone)]
pub enum LoaderCmd {
    Load(FrameLoadRequest),
    Shutdown,
}

/// Answers sent *back* from the loader thread.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum FrameLoadResult {
    Loaded {
        entity: Entity,
        instance: u64,
        frame: u32,
    },
    Failed {
        entity: Entity,
        instance: u64,
        frame: u32,
        error: String,
    },
}

impl FrameLoadResult {
    pub fn loaded(request: &FrameLoadRequest) -> Self {
        FrameLoadResult::Loaded {
            entity: request.entity,
            instance: request.instance,
            frame: request.frame,
        }
    }

    pub fn failed(request: &FrameLoadRequest, error: impl Into<String>) -> Self {
        FrameLoadResult::Failed {
            entity: request.entity,
            instance: request.instance,
            frame: request.frame,
            error: error.into(),
        }
    }

    pub fn entity(&self) -> Entity {
        match self {
            FrameLoadResult::Loaded { entity, .. } | FrameLoadResult::Failed { entity, .. } => {
                *entity
            }
        }
    }

    pub fn instance(&self) -> u64 {
        match self {
            FrameLoadResult::Loaded { instance, .. }
            | FrameLoadResult::Failed { instance, .. } => *instance,
        }
    }

    pub fn frame(&self) -> u32 {
        match self {
            FrameLoadResult::Loaded { frame, .. } | FrameLoadResult::Failed { frame, .. } => *frame,
        }
    }
}

/// A live sequence recorded `frame` as loaded.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLoadedEvent {
    pub entity: Entity,
    pub frame: u32,
}
