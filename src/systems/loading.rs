//! Loading phase system.
//!
//! Advances [`LoadingState`] with the tick delta and signals readiness as
//! soon as every animated section has been revealed.

use bevy_ecs::prelude::*;
use log::info;

use crate::components::scrollsequence::ScrollSequence;
use crate::events::loading::LoadingFinishedEvent;
use crate::resources::loadingstate::LoadingState;
use crate::resources::worldtime::WorldTime;

/// Drive the loading store and announce the switch to ready once.
pub fn update_loading_state(
    time: Res<WorldTime>,
    mut loading: ResMut<LoadingState>,
    sequences: Query<&ScrollSequence>,
    mut commands: Commands,
) {
    if !loading.is_loading() {
        return;
    }
    let all_revealed = !sequences.is_empty() && sequences.iter().all(|s| s.is_revealed());
    if all_revealed {
        loading.signal_ready();
    }
    if loading.advance(time.delta) {
        info!(
            "Loading finished after {:.2}s ({})",
            loading.elapsed(),
            if all_revealed { "all sections ready" } else { "delay elapsed" }
        );
        commands.trigger(LoadingFinishedEvent {
            elapsed: loading.elapsed(),
            signaled: all_revealed,
        });
    }
}
