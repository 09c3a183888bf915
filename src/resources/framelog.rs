//! Per-section frame change counters, filled by the
//! [`record_frame_change`](crate::events::sequence::record_frame_change) observer.

use bevy_ecs::prelude::*;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameChangeStats {
    pub changes: u32,
    pub last_frame: u32,
}

#[derive(Resource, Debug, Default)]
pub struct FrameChangeLog {
    stats: FxHashMap<Entity, FrameChangeStats>,
}

impl FrameChangeLog {
    pub fn record(&mut self, entity: Entity, frame: u32) {
        let entry = self.stats.entry(entity).or_default();
        entry.changes += 1;
        entry.last_frame = frame;
    }

    pub fn get(&self, entity: Entity) -> FrameChangeStats {
        self.stats.get(&entity).copied().unwrap_or_default()
    }

    pub fn total_changes(&self) -> u32 {
        self.stats.values().map(|s| s.changes).sum()
    }
}
