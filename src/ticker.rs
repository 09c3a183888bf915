//! Explicit tick loop.
//!
//! The [`Ticker`] owns the update [`Schedule`] and runs it once per display
//! refresh while started. Hosts call [`Ticker::tick`] from their frame loop;
//! [`Ticker::stop`] cancels further ticks in one call, so nothing touches a
//! section after teardown.

use bevy_ecs::prelude::*;
use log::info;

use crate::systems::time::update_world_time;

pub struct Ticker {
    schedule: Schedule,
    running: bool,
    ticks: u64,
}

impl Ticker {
    /// Wrap `schedule`. The ticker starts stopped.
    pub fn new(schedule: Schedule) -> Self {
        Self {
            schedule,
            running: false,
            ticks: 0,
        }
    }

    pub fn start(&mut self) {
        if !self.running {
            info!("Ticker started");
        }
        self.running = true;
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("Ticker stopped after {} tick(s)", self.ticks);
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance time by `dt` seconds and run the schedule once.
    ///
    /// Returns false, without touching the world, while stopped.
    pub fn tick(&mut self, world: &mut World, dt: f32) -> bool {
        if !self.running {
            return false;
        }
        update_world_time(world, dt);
        self.schedule.run(world);
        world.clear_trackers();
        self.ticks += 1;
        true
    }
}
