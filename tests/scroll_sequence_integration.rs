//! Scroll-to-frame integration tests.
//!
//! Sections are spawned into a `World`, the update systems run through a
//! `Schedule`, and load results are injected straight into the message queue
//! so every case is deterministic (no loader thread).

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use std::sync::{Arc, Mutex};

use scrollreel::components::frameimage::FrameImage;
use scrollreel::components::scrollcontainer::ScrollContainer;
use scrollreel::components::scrollsequence::{FramePolicy, ScrollSequence, SequenceConfig};
use scrollreel::events::frameload::{FrameLoadRequest, FrameLoadResult, FrameLoadedEvent};
use scrollreel::events::loading::LoadingFinishedEvent;
use scrollreel::events::sequence::{FrameChangedEvent, SequenceRevealedEvent, record_frame_change};
use scrollreel::resources::frameloader::setup_frame_messages;
use scrollreel::resources::framelog::FrameChangeLog;
use scrollreel::resources::loadingstate::LoadingState;
use scrollreel::resources::viewport::{ContainerRect, Viewport};
use scrollreel::resources::worldtime::WorldTime;
use scrollreel::scene::despawn_sequence;
use scrollreel::systems::frameloader::{apply_frame_results, update_frame_messages};
use scrollreel::systems::loading::update_loading_state;
use scrollreel::systems::scrollsequence::{edge_progress, scroll_sequence_system, target_frame};
use scrollreel::systems::time::update_world_time;

const DT: f32 = 1.0 / 60.0;
const VIEWPORT_HEIGHT: f32 = 800.0;

/// Every load request written during the test, in order.
#[derive(Resource, Default)]
struct RequestLog(Vec<FrameLoadRequest>);

impl RequestLog {
    fn count(&self, frame: u32) -> usize {
        self.0.iter().filter(|r| r.frame == frame).count()
    }
}

fn record_requests(mut reader: MessageReader<FrameLoadRequest>, mut log: ResMut<RequestLog>) {
    log.0.extend(reader.read().cloned());
}

fn make_world() -> World {
    let mut world = World::new();
    world.insert_resource(WorldTime::default());
    world.insert_resource(Viewport::new(1280.0, VIEWPORT_HEIGHT));
    world.insert_resource(LoadingState::new(10.0));
    world.insert_resource(FrameChangeLog::default());
    world.insert_resource(RequestLog::default());
    setup_frame_messages(&mut world);
    world.add_observer(record_frame_change);
    world.flush();
    world
}

fn make_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.add_systems(
        (
            apply_frame_results,
            scroll_sequence_system,
            record_requests,
            update_loading_state,
            update_frame_messages,
        )
            .chain(),
    );
    schedule
}

fn spawn(world: &mut World, config: SequenceConfig, doc_top: f32, height: f32) -> Entity {
    world
        .spawn((
            ScrollContainer::new("test", doc_top, height),
            FrameImage::new(&config),
            ScrollSequence::new(config),
        ))
        .id()
}

fn linear(frame_count: u32) -> SequenceConfig {
    SequenceConfig::new(frame_count, "frames/test", 1.0).unwrap()
}

fn tick(world: &mut World, schedule: &mut Schedule) {
    update_world_time(world, DT);
    schedule.run(world);
    world.clear_trackers();
}

fn run(world: &mut World, schedule: &mut Schedule, ticks: usize) {
    for _ in 0..ticks {
        tick(world, schedule);
    }
}

fn set_scroll(world: &mut World, offset: f32) {
    world.resource_mut::<Viewport>().scroll_offset = offset;
}

fn inject(world: &mut World, result: FrameLoadResult) {
    world.resource_mut::<Messages<FrameLoadResult>>().write(result);
}

fn sequence(world: &World, entity: Entity) -> &ScrollSequence {
    world.get::<ScrollSequence>(entity).unwrap()
}

fn loaded(world: &World, entity: Entity, frame: u32) -> FrameLoadResult {
    FrameLoadResult::Loaded {
        entity,
        instance: sequence(world, entity).instance(),
        frame,
    }
}

fn failed(world: &World, entity: Entity, frame: u32) -> FrameLoadResult {
    FrameLoadResult::Failed {
        entity,
        instance: sequence(world, entity).instance(),
        frame,
        error: "simulated".to_string(),
    }
}

fn count_loaded_events(world: &mut World) -> Arc<Mutex<u32>> {
    let count = Arc::new(Mutex::new(0));
    let count_clone = count.clone();
    world.add_observer(move |_trigger: On<FrameLoadedEvent>| {
        *count_clone.lock().unwrap() += 1;
    });
    world.flush();
    count
}

fn count_changed_events(world: &mut World) -> Arc<Mutex<u32>> {
    let count = Arc::new(Mutex::new(0));
    let count_clone = count.clone();
    world.add_observer(move |_trigger: On<FrameChangedEvent>| {
        *count_clone.lock().unwrap() += 1;
    });
    world.flush();
    count
}

// ==================== CONCRETE SCENARIOS ====================

#[test]
fn halfway_through_tall_container_shows_middle_frame() {
    let rect = ContainerRect::new(-600.0, 2000.0);
    assert_eq!(edge_progress(rect, VIEWPORT_HEIGHT), 0.5);
    let (_, target) = target_frame(FramePolicy::EdgeLinear, rect, VIEWPORT_HEIGHT, 120);
    assert_eq!(target, 60);

    let mut world = make_world();
    let mut schedule = make_schedule();
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);
    set_scroll(&mut world, 600.0);

    run(&mut world, &mut schedule, 100);

    assert_eq!(sequence(&world, entity).current_frame(), 60);
    let image = world.get::<FrameImage>(entity).unwrap();
    assert_eq!(image.frame, 60);
    assert_eq!(image.path, "frames/test/0060.jpg");
}

#[test]
fn container_top_at_viewport_top_shows_first_frame() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);

    run(&mut world, &mut schedule, 30);

    assert_eq!(sequence(&world, entity).current_frame(), 1);
    assert_eq!(world.resource::<FrameChangeLog>().total_changes(), 0);
}

#[test]
fn single_frame_sequence_always_shows_frame_one() {
    for top in [-5000.0, -600.0, 0.0, 300.0, 5000.0] {
        let rect = ContainerRect::new(top, 2000.0);
        let (_, target) = target_frame(FramePolicy::EdgeLinear, rect, VIEWPORT_HEIGHT, 1);
        assert_eq!(target, 1);
    }

    let mut world = make_world();
    let mut schedule = make_schedule();
    let entity = spawn(&mut world, linear(1), 0.0, 2000.0);
    for offset in [0.0, 600.0, 1200.0, 300.0] {
        set_scroll(&mut world, offset);
        run(&mut world, &mut schedule, 5);
        assert_eq!(sequence(&world, entity).current_frame(), 1);
    }
}

#[test]
fn failed_frame_is_not_marked_loaded_and_ticks_continue() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);
    tick(&mut world, &mut schedule);

    let result = failed(&world, entity, 45);
    inject(&mut world, result);
    let result = loaded(&world, entity, 44);
    inject(&mut world, result);
    tick(&mut world, &mut schedule);

    assert!(!sequence(&world, entity).is_loaded(45));
    assert!(!sequence(&world, entity).is_pending(45));
    assert!(sequence(&world, entity).is_loaded(44));

    set_scroll(&mut world, 600.0);
    run(&mut world, &mut schedule, 100);
    assert_eq!(sequence(&world, entity).current_frame(), 60);
    assert_eq!(world.resource::<WorldTime>().frame_count, 102);
}

#[test]
fn late_result_after_teardown_is_ignored() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let loaded_count = count_loaded_events(&mut world);
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);
    tick(&mut world, &mut schedule);

    let late = loaded(&world, entity, 80);
    assert!(despawn_sequence(&mut world, entity));
    inject(&mut world, late);
    run(&mut world, &mut schedule, 3);

    assert_eq!(*loaded_count.lock().unwrap(), 0);
    assert!(world.get::<ScrollSequence>(entity).is_none());
}

// ==================== PROPERTIES ====================

#[test]
fn progress_and_frame_stay_in_range() {
    for height in [0.0, 400.0, 800.0, 2000.0] {
        let mut top = -4000.0;
        while top <= 4000.0 {
            let rect = ContainerRect::new(top, height);
            for policy in [
                FramePolicy::EdgeLinear,
                FramePolicy::CenterMirror { distance: 1.5 },
            ] {
                let (p, frame) = target_frame(policy, rect, VIEWPORT_HEIGHT, 120);
                assert!((0.0..=1.0).contains(&p), "p={p} top={top} height={height}");
                assert!((1..=120).contains(&frame));
            }
            top += 37.0;
        }
    }
}

#[test]
fn degenerate_geometry_does_not_escape_range() {
    for rect in [
        ContainerRect::new(f32::NAN, 2000.0),
        ContainerRect::new(-600.0, f32::INFINITY),
        ContainerRect::new(f32::NEG_INFINITY, 2000.0),
    ] {
        for vh in [VIEWPORT_HEIGHT, 0.0, -10.0, f32::NAN] {
            let (p, frame) = target_frame(FramePolicy::EdgeLinear, rect, vh, 120);
            assert!((0.0..=1.0).contains(&p));
            assert!((1..=120).contains(&frame));
        }
    }
}

#[test]
fn targets_grow_with_scroll() {
    let mut last = 0;
    let mut top = 0.0;
    while top >= -1200.0 {
        let rect = ContainerRect::new(top, 2000.0);
        let (_, frame) = target_frame(FramePolicy::EdgeLinear, rect, VIEWPORT_HEIGHT, 120);
        assert!(frame >= last);
        last = frame;
        top -= 10.0;
    }
    assert_eq!(last, 120);
}

#[test]
fn frame_is_stable_at_rest() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);
    set_scroll(&mut world, 900.0);
    run(&mut world, &mut schedule, 100);

    let frame = sequence(&world, entity).current_frame();
    let changes = world.resource::<FrameChangeLog>().get(entity).changes;
    assert!(changes > 0);

    run(&mut world, &mut schedule, 50);
    assert_eq!(sequence(&world, entity).current_frame(), frame);
    assert_eq!(world.resource::<FrameChangeLog>().get(entity).changes, changes);
}

#[test]
fn fast_scroll_snaps_to_target() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);
    tick(&mut world, &mut schedule);

    // 600px in one 60Hz tick is far past the snap velocity
    set_scroll(&mut world, 600.0);
    tick(&mut world, &mut schedule);

    assert_eq!(sequence(&world, entity).current_frame(), 60);
    assert!(sequence(&world, entity).last_velocity() > 30_000.0);
}

#[test]
fn slow_scroll_eases_without_overshoot() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);
    set_scroll(&mut world, 600.0);

    let mut last = 1;
    for _ in 0..100 {
        tick(&mut world, &mut schedule);
        let frame = sequence(&world, entity).current_frame();
        assert!(frame >= last && frame <= 60);
        last = frame;
    }
    assert_eq!(last, 60);
}

#[test]
fn offscreen_container_is_skipped() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let changed = count_changed_events(&mut world);
    let entity = spawn(&mut world, linear(120), 5000.0, 2000.0);

    set_scroll(&mut world, 1000.0);
    run(&mut world, &mut schedule, 20);

    assert_eq!(sequence(&world, entity).current_frame(), 1);
    assert_eq!(*changed.lock().unwrap(), 0);
    // frame 1 is still fetched eagerly
    let log = world.resource::<RequestLog>();
    assert_eq!(log.0.len(), 1);
    assert_eq!(log.0[0].frame, 1);
    assert_eq!(log.0[0].path, "frames/test/0001.jpg");
}

#[test]
fn frame_changes_request_preload_window_once() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);
    set_scroll(&mut world, 600.0);
    run(&mut world, &mut schedule, 100);

    let log = world.resource::<RequestLog>();
    for frame in 55..=65 {
        assert_eq!(log.count(frame), 1, "frame {frame}");
    }
    assert!(log.0.iter().all(|r| r.entity == entity));
    assert!(log.0.iter().all(|r| (1..=120).contains(&r.frame)));
    assert_eq!(log.count(66), 0);
}

#[test]
fn loaded_frames_are_not_requested_again() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);
    tick(&mut world, &mut schedule);
    for frame in 55..=65 {
        let result = loaded(&world, entity, frame);
        inject(&mut world, result);
    }
    tick(&mut world, &mut schedule);

    set_scroll(&mut world, 600.0);
    tick(&mut world, &mut schedule);

    assert_eq!(sequence(&world, entity).current_frame(), 60);
    assert!(world.get::<FrameImage>(entity).unwrap().loaded);
    let log = world.resource::<RequestLog>();
    assert!((55..=65).all(|frame| log.count(frame) == 0));
}

#[test]
fn failed_frame_is_retried_when_it_returns_to_the_window() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);
    set_scroll(&mut world, 600.0);
    run(&mut world, &mut schedule, 100);
    assert_eq!(world.resource::<RequestLog>().count(60), 1);

    let result = failed(&world, entity, 60);
    inject(&mut world, result);
    tick(&mut world, &mut schedule);
    assert!(!sequence(&world, entity).is_pending(60));

    set_scroll(&mut world, 0.0);
    tick(&mut world, &mut schedule);
    assert_eq!(sequence(&world, entity).current_frame(), 1);

    set_scroll(&mut world, 600.0);
    tick(&mut world, &mut schedule);
    assert_eq!(sequence(&world, entity).current_frame(), 60);
    assert_eq!(world.resource::<RequestLog>().count(60), 2);
}

#[test]
fn result_for_other_instance_is_ignored() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);
    tick(&mut world, &mut schedule);

    let stale = FrameLoadResult::Loaded {
        entity,
        instance: sequence(&world, entity).instance() + 1000,
        frame: 1,
    };
    inject(&mut world, stale);
    tick(&mut world, &mut schedule);

    assert!(!sequence(&world, entity).is_loaded(1));
    assert!(!sequence(&world, entity).is_revealed());
    assert!(!world.get::<FrameImage>(entity).unwrap().visible);
}

// ==================== FIRST FRAME & LOADING ====================

#[test]
fn section_is_revealed_when_first_frame_loads() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let revealed = Arc::new(Mutex::new(Vec::new()));
    let revealed_clone = revealed.clone();
    world.add_observer(move |trigger: On<SequenceRevealedEvent>| {
        revealed_clone.lock().unwrap().push(*trigger.event());
    });
    world.flush();
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);

    tick(&mut world, &mut schedule);
    assert!(!world.get::<FrameImage>(entity).unwrap().visible);
    assert!(sequence(&world, entity).is_pending(1));

    let result = loaded(&world, entity, 1);
    inject(&mut world, result);
    run(&mut world, &mut schedule, 3);

    let image = world.get::<FrameImage>(entity).unwrap();
    assert!(image.visible);
    assert!(image.loaded);
    let revealed = revealed.lock().unwrap();
    assert_eq!(revealed.len(), 1);
    assert_eq!(revealed[0].entity, entity);
    assert!(revealed[0].first_frame_loaded);
}

#[test]
fn section_is_revealed_when_first_frame_fails() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let entity = spawn(&mut world, linear(120), 0.0, 2000.0);
    tick(&mut world, &mut schedule);

    let result = failed(&world, entity, 1);
    inject(&mut world, result);
    tick(&mut world, &mut schedule);

    let image = world.get::<FrameImage>(entity).unwrap();
    assert!(image.visible);
    assert!(!image.loaded);
    assert!(sequence(&world, entity).is_revealed());
}

#[test]
fn loading_finishes_once_every_section_is_revealed() {
    let mut world = make_world();
    let mut schedule = make_schedule();
    let finished = Arc::new(Mutex::new(Vec::new()));
    let finished_clone = finished.clone();
    world.add_observer(move |trigger: On<LoadingFinishedEvent>| {
        finished_clone.lock().unwrap().push(*trigger.event());
    });
    world.flush();
    let a = spawn(&mut world, linear(120), 0.0, 2000.0);
    let b = spawn(&mut world, linear(30), 2400.0, 1200.0);
    tick(&mut world, &mut schedule);

    let result = loaded(&world, a, 1);
    inject(&mut world, result);
    tick(&mut world, &mut schedule);
    assert!(world.resource::<LoadingState>().is_loading());

    let result = failed(&world, b, 1);
    inject(&mut world, result);
    run(&mut world, &mut schedule, 5);

    assert!(!world.resource::<LoadingState>().is_loading());
    let finished = finished.lock().unwrap();
    assert_eq!(finished.len(), 1);
    assert!(finished[0].signaled);
}

#[test]
fn loading_finishes_after_delay_without_frames() {
    let mut world = make_world();
    world.insert_resource(LoadingState::new(0.5));
    let mut schedule = make_schedule();
    spawn(&mut world, linear(120), 0.0, 2000.0);

    run(&mut world, &mut schedule, 20);
    assert!(world.resource::<LoadingState>().is_loading());
    run(&mut world, &mut schedule, 20);
    assert!(!world.resource::<LoadingState>().is_loading());
}

// ==================== MIRROR POLICY ====================

#[test]
fn mirror_policy_peaks_when_centred() {
    let config = linear(101)
        .with_policy(FramePolicy::CenterMirror { distance: 1.5 })
        .unwrap();
    let mut world = make_world();
    let mut schedule = make_schedule();
    // container centre at 1000; viewport centre at scroll + 400
    let entity = spawn(&mut world, config, 800.0, 400.0);

    set_scroll(&mut world, 600.0);
    run(&mut world, &mut schedule, 100);
    assert_eq!(sequence(&world, entity).current_frame(), 101);

    set_scroll(&mut world, 300.0);
    run(&mut world, &mut schedule, 100);
    let frame = sequence(&world, entity).current_frame();
    assert!(frame > 1 && frame < 101);
}
