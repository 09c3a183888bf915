//! Scroll container component.
//!
//! Describes where an animated section sits on the page, in document
//! coordinates. The viewport-relative rectangle is derived every tick from
//! the [`Viewport`](crate::resources::viewport::Viewport) scroll offset.

use bevy_ecs::prelude::Component;

/// Layout of an animated section on the page.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ScrollContainer {
    /// Section name, as given in the configuration file.
    pub name: String,
    /// Distance from the top of the page to the top of the container, in pixels.
    pub doc_top: f32,
    /// Container height in pixels. Negative values are treated as zero.
    pub height: f32,
}

impl ScrollContainer {
    pub fn new(name: impl Into<String>, doc_top: f32, height: f32) -> Self {
        Self {
            name: name.into(),
            doc_top,
            height: height.max(0.0),
        }
    }
}
