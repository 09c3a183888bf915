//! Page setup and teardown.
//!
//! Builds the ECS world for a [`ReelConfig`]: host resources, message queues,
//! observers, and one entity per configured section laid out top to bottom.
//! Also provides the update schedule shared by the headless runner, the
//! viewer, and tests.

use bevy_ecs::prelude::*;
use log::info;

use crate::components::frameimage::FrameImage;
use crate::components::scrollcontainer::ScrollContainer;
use crate::components::scrollsequence::ScrollSequence;
use crate::events::sequence::record_frame_change;
use crate::events::switchdebug::switch_debug_observer;
use crate::resources::frameloader::setup_frame_messages;
use crate::resources::framelog::FrameChangeLog;
use crate::resources::loadingstate::LoadingState;
use crate::resources::reelconfig::{ReelConfig, SectionSpec};
use crate::resources::viewport::{PageLayout, Viewport};
use crate::resources::worldtime::WorldTime;
use crate::systems::frameloader::{
    apply_frame_results, forward_frame_requests, poll_frame_results, update_frame_messages,
};
use crate::systems::loading::update_loading_state;
use crate::systems::scrollsequence::scroll_sequence_system;

/// Create a world with every resource the update schedule needs and the
/// configured sections spawned. No loader thread is started.
pub fn setup_world(config: &ReelConfig) -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(Viewport::new(
        config.window_width as f32,
        config.window_height as f32,
    ));
    world.insert_resource(LoadingState::new(config.loading_delay_secs()));
    world.insert_resource(FrameChangeLog::default());
    world.insert_resource(config.clone());
    setup_frame_messages(&mut world);

    world.add_observer(record_frame_change);
    world.add_observer(switch_debug_observer);
    world.flush();

    spawn_sections(&mut world, config);
    world
}

/// Spawn one animated section per configured entry and record the page height.
///
/// Sections start `top_padding` below the page top and are separated by
/// `gap`. The page ends one viewport height below the last section so it can
/// be scrolled all the way through.
pub fn spawn_sections(world: &mut World, config: &ReelConfig) -> Vec<Entity> {
    let mut doc_top = config.top_padding;
    let mut entities = Vec::with_capacity(config.sections.len());
    for spec in &config.sections {
        entities.push(spawn_section(world, spec, doc_top));
        doc_top += spec.height + config.gap;
    }
    let last_bottom = if config.sections.is_empty() {
        config.top_padding
    } else {
        doc_top - config.gap
    };
    world.insert_resource(PageLayout {
        height: last_bottom + config.window_height as f32,
    });
    entities
}

/// Spawn a single section with its top at `doc_top`.
pub fn spawn_section(world: &mut World, spec: &SectionSpec, doc_top: f32) -> Entity {
    let entity = world
        .spawn((
            ScrollContainer::new(spec.name.clone(), doc_top, spec.height),
            FrameImage::new(&spec.sequence),
            ScrollSequence::new(spec.sequence.clone()),
        ))
        .id();
    info!(
        "Section '{}' at {}px: {} frames from {} ({} policy)",
        spec.name,
        doc_top,
        spec.sequence.frame_count(),
        spec.sequence.frame_path(),
        spec.sequence.policy().name()
    );
    entity
}

/// Tear down a section. Load results still in flight for it are ignored
/// when they arrive.
pub fn despawn_sequence(world: &mut World, entity: Entity) -> bool {
    world.despawn(entity)
}

/// The per-tick update schedule.
///
/// Order: pull loader results, fold them in, advance sections, push new
/// requests to the loader, drive the loading phase, then advance the message
/// queues.
pub fn update_schedule() -> Schedule {
    let mut update = Schedule::default();
    update.add_systems(
        (
            poll_frame_results,
            apply_frame_results,
            scroll_sequence_system,
            forward_frame_requests,
            update_loading_state,
            update_frame_messages,
        )
            .chain(),
    );
    update
}
