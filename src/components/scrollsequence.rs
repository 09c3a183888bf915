//! Scroll-driven image sequence component.
//!
//! A [`ScrollSequence`] pairs an immutable [`SequenceConfig`] (how many
//! frames, where they live, how the scroll position maps onto them) with the
//! per-instance playback state: the frame currently shown, which frames are
//! confirmed loaded, which are in flight, and the last observed scroll
//! velocity.
//!
//! Frames are numbered from 1 and resolve to `{frame_path}/{k:04}.jpg`.
//! The naming is load-bearing: the asset pipeline writes exactly that layout.
//!
//! See [`crate::systems::scrollsequence`] for the system that advances it.

use bevy_ecs::prelude::Component;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Extension shared by every frame of every sequence.
pub const FRAME_EXTENSION: &str = "jpg";
/// Highest frame number the four-digit naming can express.
pub const MAX_FRAME_COUNT: u32 = 9999;
pub const DEFAULT_FRAME_COUNT: u32 = 120;
pub const DEFAULT_FRAME_PATH: &str = "assets/frames/hero";
pub const DEFAULT_SPEED_FACTOR: f32 = 1.0;
pub const DEFAULT_PRELOAD_RADIUS: u32 = 5;
pub const DEFAULT_MIRROR_DISTANCE: f32 = 1.5;

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// Reasons a sequence configuration is rejected.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SequenceConfigError {
    #[error("frame count must be at least 1")]
    ZeroFrameCount,
    #[error("frame count {0} exceeds the four-digit frame naming limit of 9999")]
    TooManyFrames(u32),
    #[error("frame path must not be empty")]
    EmptyFramePath,
    #[error("speed factor must be a positive finite number, got {0}")]
    InvalidSpeedFactor(f32),
    #[error("mirror distance must be a positive finite number, got {0}")]
    InvalidDistance(f32),
    #[error("unknown frame policy '{0}' (expected 'linear' or 'mirror')")]
    UnknownPolicy(String),
}

/// How scroll geometry turns into a frame index.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FramePolicy {
    /// Progress grows linearly once the container top passes the viewport
    /// top, reaching the last frame when its bottom meets the viewport bottom.
    #[default]
    EdgeLinear,
    /// Plays forward then in reverse as the container centre crosses the
    /// viewport centre. `distance` is the scroll span on each side of the
    /// crossing, in viewport heights. Progress is cubic-eased.
    CenterMirror { distance: f32 },
}

impl FramePolicy {
    /// Parse a policy name as written in configuration files.
    pub fn parse(name: &str, distance: f32) -> Result<Self, SequenceConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "linear" | "edge" => Ok(FramePolicy::EdgeLinear),
            "mirror" | "center" => {
                let policy = FramePolicy::CenterMirror { distance };
                policy.validate()?;
                Ok(policy)
            }
            other => Err(SequenceConfigError::UnknownPolicy(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FramePolicy::EdgeLinear => "linear",
            FramePolicy::CenterMirror { .. } => "mirror",
        }
    }

    fn validate(&self) -> Result<(), SequenceConfigError> {
        match *self {
            FramePolicy::EdgeLinear => Ok(()),
            FramePolicy::CenterMirror { distance } => {
                if distance.is_finite() && distance > 0.0 {
                    Ok(())
                } else {
                    Err(SequenceConfigError::InvalidDistance(distance))
                }
            }
        }
    }
}

/// Resolve frame `frame` under `base`, e.g. `assets/hero` + 7 → `assets/hero/0007.jpg`.
pub fn frame_path(base: &str, frame: u32) -> String {
    let base = base.trim_end_matches('/');
    format!("{base}/{frame:04}.{FRAME_EXTENSION}")
}

/// Validated, immutable description of one animated sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceConfig {
    frame_count: u32,
    frame_path: String,
    speed_factor: f32,
    policy: FramePolicy,
    preload_radius: u32,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            frame_count: DEFAULT_FRAME_COUNT,
            frame_path: DEFAULT_FRAME_PATH.to_string(),
            speed_factor: DEFAULT_SPEED_FACTOR,
            policy: FramePolicy::EdgeLinear,
            preload_radius: DEFAULT_PRELOAD_RADIUS,
        }
    }
}

impl SequenceConfig {
    /// Build a configuration using the edge-linear policy and the default
    /// preload radius.
    pub fn new(
        frame_count: u32,
        frame_path: impl Into<String>,
        speed_factor: f32,
    ) -> Result<Self, SequenceConfigError> {
        let frame_path = frame_path.into();
        if frame_count == 0 {
            return Err(SequenceConfigError::ZeroFrameCount);
        }
        if frame_count > MAX_FRAME_COUNT {
            return Err(SequenceConfigError::TooManyFrames(frame_count));
        }
        if frame_path.trim().is_empty() {
            return Err(SequenceConfigError::EmptyFramePath);
        }
        if !(speed_factor.is_finite() && speed_factor > 0.0) {
            return Err(SequenceConfigError::InvalidSpeedFactor(speed_factor));
        }
        Ok(Self {
            frame_count,
            frame_path,
            speed_factor,
            policy: FramePolicy::EdgeLinear,
            preload_radius: DEFAULT_PRELOAD_RADIUS,
        })
    }

    pub fn with_policy(mut self, policy: FramePolicy) -> Result<Self, SequenceConfigError> {
        policy.validate()?;
        self.policy = policy;
        Ok(self)
    }

    pub fn with_preload_radius(mut self, radius: u32) -> Self {
        self.preload_radius = radius;
        self
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn frame_path(&self) -> &str {
        &self.frame_path
    }

    pub fn speed_factor(&self) -> f32 {
        self.speed_factor
    }

    pub fn policy(&self) -> FramePolicy {
        self.policy
    }

    pub fn preload_radius(&self) -> u32 {
        self.preload_radius
    }

    /// Resource path of `frame`, clamped into `[1, frame_count]`.
    pub fn path_for(&self, frame: u32) -> String {
        frame_path(&self.frame_path, frame.clamp(1, self.frame_count))
    }
}

/// Playback state of one animated section.
///
/// Invariant: `current_frame` stays within `[1, frame_count]`.
#[derive(Component, Debug, Clone)]
pub struct ScrollSequence {
    config: SequenceConfig,
    instance: u64,
    current_frame: u32,
    loaded: FxHashSet<u32>,
    pending: FxHashSet<u32>,
    last_velocity: f32,
    last_scroll: Option<f32>,
    primed: bool,
    revealed: bool,
}

impl ScrollSequence {
    pub fn new(config: SequenceConfig) -> Self {
        Self {
            config,
            instance: NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed),
            current_frame: 1,
            loaded: FxHashSet::default(),
            pending: FxHashSet::default(),
            last_velocity: 0.0,
            last_scroll: None,
            primed: false,
            revealed: false,
        }
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// Token distinguishing this sequence from any other ever spawned.
    pub fn instance(&self) -> u64 {
        self.instance
    }

    pub fn current_frame(&self) -> u32 {
        self.current_frame
    }

    pub fn last_velocity(&self) -> f32 {
        self.last_velocity
    }

    pub fn last_scroll(&self) -> Option<f32> {
        self.last_scroll
    }

    pub fn is_loaded(&self, frame: u32) -> bool {
        self.loaded.contains(&frame)
    }

    pub fn is_pending(&self, frame: u32) -> bool {
        self.pending.contains(&frame)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_primed(&self) -> bool {
        self.primed
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Record the scroll offset seen this tick and the velocity derived from it.
    pub fn observe_scroll(&mut self, scroll_offset: f32, velocity: f32) {
        self.last_scroll = Some(scroll_offset);
        self.last_velocity = if velocity.is_finite() { velocity } else { 0.0 };
    }

    /// Move to `frame`. Returns false when nothing changed.
    pub fn set_current_frame(&mut self, frame: u32) -> bool {
        let frame = frame.clamp(1, self.config.frame_count);
        if frame == self.current_frame {
            return false;
        }
        self.current_frame = frame;
        true
    }

    /// Mark the eager first-frame request as issued. Returns true only the
    /// first time.
    pub fn prime(&mut self) -> bool {
        if self.primed {
            return false;
        }
        self.primed = true;
        self.mark_requested(1)
    }

    /// Frames around `center` that are neither loaded nor in flight.
    pub fn preload_window(&self, center: u32) -> SmallVec<[u32; 16]> {
        let radius = self.config.preload_radius;
        let first = center.saturating_sub(radius).max(1);
        let last = center.saturating_add(radius).min(self.config.frame_count);
        (first..=last)
            .filter(|frame| !self.loaded.contains(frame) && !self.pending.contains(frame))
            .collect()
    }

    /// Record an outgoing load request. Returns false if the frame was
    /// already loaded or in flight.
    pub fn mark_requested(&mut self, frame: u32) -> bool {
        if self.loaded.contains(&frame) {
            return false;
        }
        self.pending.insert(frame)
    }

    /// Record a confirmed load. Returns true if the frame was not known before.
    pub fn mark_loaded(&mut self, frame: u32) -> bool {
        self.pending.remove(&frame);
        self.loaded.insert(frame)
    }

    /// Record a failed load. The frame becomes eligible for a new request
    /// the next time it enters the preload window.
    pub fn mark_failed(&mut self, frame: u32) {
        self.pending.remove(&frame);
    }

    /// Returns true on the call that actually reveals the sequence.
    pub fn reveal(&mut self) -> bool {
        if self.revealed {
            return false;
        }
        self.revealed = true;
        true
    }
}
