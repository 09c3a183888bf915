//! Viewport and page layout resources.
//!
//! [`Viewport`] is written by the host every tick (window size, current
//! scroll offset). [`PageLayout`] holds the total scrollable height of the
//! page built from the configured sections. Together with a
//! [`ScrollContainer`] they produce the per-tick [`ContainerRect`] snapshot.

use bevy_ecs::prelude::Resource;

use crate::components::scrollcontainer::ScrollContainer;

/// Visible window onto the page.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Distance scrolled from the top of the page, in pixels.
    pub scroll_offset: f32,
    /// Width in pixels.
    pub width: f32,
    /// Height in pixels.
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scroll_offset: 0.0,
            width,
            height,
        }
    }

    pub fn with_scroll(mut self, scroll_offset: f32) -> Self {
        self.scroll_offset = scroll_offset;
        self
    }

    /// Furthest the page can be scrolled given its total height.
    pub fn max_scroll(&self, page_height: f32) -> f32 {
        (page_height - self.height).max(0.0)
    }

    /// Scroll by `delta` pixels, staying inside the page.
    pub fn scroll_by(&mut self, delta: f32, page_height: f32) {
        self.scroll_to(self.scroll_offset + delta, page_height);
    }

    pub fn scroll_to(&mut self, offset: f32, page_height: f32) {
        let offset = if offset.is_finite() { offset } else { 0.0 };
        self.scroll_offset = offset.clamp(0.0, self.max_scroll(page_height));
    }

    /// Bounding rectangle of `container` relative to the viewport top.
    pub fn rect_of(&self, container: &ScrollContainer) -> ContainerRect {
        ContainerRect {
            top: container.doc_top - self.scroll_offset,
            height: container.height.max(0.0),
        }
    }
}

/// Container geometry relative to the viewport, recomputed every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerRect {
    /// Negative once the container top has scrolled above the viewport top.
    pub top: f32,
    pub height: f32,
}

impl ContainerRect {
    pub fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn center(&self) -> f32 {
        self.top + self.height * 0.5
    }

    /// Any part of the container lies inside `[0, viewport_height)`.
    pub fn intersects(&self, viewport_height: f32) -> bool {
        self.bottom() > 0.0 && self.top < viewport_height
    }

    /// The whole container lies inside the viewport.
    pub fn is_within(&self, viewport_height: f32) -> bool {
        self.top >= 0.0 && self.bottom() <= viewport_height
    }
}

/// Total scrollable height of the page, in pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub height: f32,
}
