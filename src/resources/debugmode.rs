//! Debug toggle resource.
//!
//! The mere presence of this resource enables per-tick diagnostics: the
//! scroll system logs progress and velocity, and the viewer draws an overlay.

use bevy_ecs::prelude::Resource;

/// Marker resource: when present, systems may draw overlays or print extra logs.
#[derive(Resource, Clone, Copy, Debug)]
pub struct DebugMode {}
