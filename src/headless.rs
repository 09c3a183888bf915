//! Headless run: scripted scrolling without a window.
//!
//! Drives the configured page with a steady downward scroll (optionally
//! jittered) at a fixed tick rate, with the real loader thread fetching
//! frames, then reports where each section ended up.

use bevy_ecs::prelude::*;
use log::info;
use serde::Serialize;

use crate::components::frameimage::FrameImage;
use crate::components::scrollcontainer::ScrollContainer;
use crate::components::scrollsequence::ScrollSequence;
use crate::resources::debugmode::DebugMode;
use crate::resources::frameloader::{FrameFetcher, setup_frame_loader, shutdown_frame_loader};
use crate::resources::framelog::FrameChangeLog;
use crate::resources::loadingstate::LoadingState;
use crate::resources::reelconfig::ReelConfig;
use crate::resources::viewport::{PageLayout, Viewport};
use crate::scene::{setup_world, update_schedule};
use crate::ticker::Ticker;

/// Ticks spent waiting for outstanding loads after the scripted scroll.
const SETTLE_TICKS: u32 = 120;
const SETTLE_SLEEP: std::time::Duration = std::time::Duration::from_millis(5);

#[derive(Debug, Clone)]
pub struct HeadlessOptions {
    /// Length of the scripted scroll, in seconds of simulated time.
    pub seconds: f32,
    /// Downward scroll speed in px/s.
    pub scroll_speed: f32,
    /// Ticks per simulated second.
    pub tick_rate: u32,
    /// Maximum random deviation added to the speed each tick, in px/s.
    pub jitter: f32,
    pub seed: Option<u64>,
    /// Log per-tick diagnostics.
    pub debug: bool,
}

impl Default for HeadlessOptions {
    fn default() -> Self {
        Self {
            seconds: 10.0,
            scroll_speed: 400.0,
            tick_rate: 60,
            jitter: 0.0,
            seed: None,
            debug: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub name: String,
    pub frame_count: u32,
    pub current_frame: u32,
    pub loaded_frames: usize,
    pub pending_frames: usize,
    pub revealed: bool,
    pub frame_changes: u32,
    pub image: FrameImage,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub final_scroll: f32,
    pub page_height: f32,
    pub loading_finished: bool,
    pub sections: Vec<SectionSummary>,
}

/// Run the scripted scroll against `config`, fetching frames with `fetcher`.
pub fn run_headless<F: FrameFetcher>(
    config: &ReelConfig,
    options: &HeadlessOptions,
    fetcher: F,
) -> RunSummary {
    let mut world = setup_world(config);
    setup_frame_loader(&mut world, fetcher);
    if options.debug {
        world.insert_resource(DebugMode {});
    }

    let tick_rate = options.tick_rate.max(1);
    let dt = 1.0 / tick_rate as f32;
    let total_ticks = (options.seconds.max(0.0) * tick_rate as f32).round() as u64;
    let mut rng = match options.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let page_height = world.resource::<PageLayout>().height;

    info!(
        "Headless run: {} tick(s) at {}Hz, {}px/s (jitter {}px/s), page {}px",
        total_ticks, tick_rate, options.scroll_speed, options.jitter, page_height
    );

    let mut ticker = Ticker::new(update_schedule());
    ticker.start();
    for _ in 0..total_ticks {
        let noise = if options.jitter > 0.0 {
            (rng.f32() * 2.0 - 1.0) * options.jitter
        } else {
            0.0
        };
        world
            .resource_mut::<Viewport>()
            .scroll_by((options.scroll_speed + noise) * dt, page_height);
        ticker.tick(&mut world, dt);
    }

    // Let in-flight loads land; the page stays still meanwhile.
    for _ in 0..SETTLE_TICKS {
        if !has_pending(&mut world) {
            break;
        }
        std::thread::sleep(SETTLE_SLEEP);
        ticker.tick(&mut world, dt);
    }
    ticker.stop();
    shutdown_frame_loader(&mut world);

    summarize(&mut world, ticker.ticks())
}

fn has_pending(world: &mut World) -> bool {
    world
        .query::<&ScrollSequence>()
        .iter(world)
        .any(|s| s.pending_count() > 0)
}

/// Collect the state of every section, in page order.
pub fn summarize(world: &mut World, ticks: u64) -> RunSummary {
    let mut rows: Vec<(f32, SectionSummary)> = {
        let mut q = world.query::<(Entity, &ScrollContainer, &ScrollSequence, &FrameImage)>();
        let log = world.resource::<FrameChangeLog>();
        q.iter(world)
            .map(|(entity, container, sequence, image)| {
                (
                    container.doc_top,
                    SectionSummary {
                        name: container.name.clone(),
                        frame_count: sequence.config().frame_count(),
                        current_frame: sequence.current_frame(),
                        loaded_frames: sequence.loaded_count(),
                        pending_frames: sequence.pending_count(),
                        revealed: sequence.is_revealed(),
                        frame_changes: log.get(entity).changes,
                        image: image.clone(),
                    },
                )
            })
            .collect()
    };
    rows.sort_by(|a, b| a.0.total_cmp(&b.0));

    RunSummary {
        ticks,
        final_scroll: world.resource::<Viewport>().scroll_offset,
        page_height: world.resource::<PageLayout>().height,
        loading_finished: !world.resource::<LoadingState>().is_loading(),
        sections: rows.into_iter().map(|(_, row)| row).collect(),
    }
}
