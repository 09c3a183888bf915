//! ECS resources made available to systems.
//!
//! This module groups the long-lived data injected into the ECS world and
//! accessed by systems during execution: host geometry, timing, the loading
//! store, configuration, and the bridge to the loader thread.
//!
//! Overview
//! - `debugmode` – presence toggles per-tick diagnostics
//! - `frameloader` – bridge and channels for the background frame loader
//! - `framelog` – per-section frame change counters
//! - `loadingstate` – application loading phase with an explicit lifecycle
//! - `reelconfig` – INI-backed configuration of the window and sections
//! - `viewport` – scroll offset and size of the visible window, page height
//! - `worldtime` – simulation time and delta
pub mod debugmode;
pub mod frameloader;
pub mod framelog;
pub mod loadingstate;
pub mod reelconfig;
pub mod viewport;
pub mod worldtime;
