//! scrollreel library.
//!
//! Maps the scroll position of a page onto numbered animation frames. Each
//! animated section of the page is an entity with a [`ScrollContainer`],
//! a [`ScrollSequence`] holding its playback state and a [`FrameImage`]
//! describing what to display. Systems run in a `bevy_ecs` schedule driven
//! by a [`Ticker`]; frame files are fetched on a background loader thread.
//!
//! [`ScrollContainer`]: components::scrollcontainer::ScrollContainer
//! [`ScrollSequence`]: components::scrollsequence::ScrollSequence
//! [`FrameImage`]: components::frameimage::FrameImage
//! [`Ticker`]: ticker::Ticker

pub mod components;
pub mod events;
pub mod headless;
pub mod resources;
pub mod scene;
pub mod systems;
pub mod ticker;
#[cfg(feature = "viewer")]
pub mod viewer;
