//! Interactive viewer backed by raylib.
//!
//! Opens a window onto the configured page. The mouse wheel, arrow keys and
//! PageUp/PageDown scroll it; each visible section draws its current frame
//! pinned to the viewport while its container scrolls past, the way a sticky
//! element would on a web page. F1 toggles the diagnostics overlay.
//!
//! Frame files are confirmed by the loader thread first; only confirmed
//! frames are uploaded as textures, on the main thread.

use bevy_ecs::prelude::*;
use log::{info, warn};
use raylib::ffi::KeyboardKey;
use raylib::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::components::frameimage::FrameImage;
use crate::components::scrollcontainer::ScrollContainer;
use crate::components::scrollsequence::ScrollSequence;
use crate::events::switchdebug::SwitchDebugEvent;
use crate::resources::debugmode::DebugMode;
use crate::resources::frameloader::{FsFetcher, setup_frame_loader, shutdown_frame_loader};
use crate::resources::loadingstate::LoadingState;
use crate::resources::reelconfig::ReelConfig;
use crate::resources::viewport::{ContainerRect, PageLayout, Viewport};
use crate::scene::{setup_world, update_schedule};
use crate::ticker::Ticker;

/// Pixels scrolled per mouse wheel notch.
const WHEEL_STEP: f32 = 120.0;
/// Arrow key scroll speed in px/s.
const KEY_SCROLL_SPEED: f32 = 900.0;
/// Share of the viewport scrolled by PageUp/PageDown.
const PAGE_STEP: f32 = 0.9;
const TEXTURE_CACHE_LIMIT: usize = 96;

const BACKGROUND: Color = Color::new(18, 18, 24, 255);
const CONTAINER: Color = Color::new(32, 34, 44, 255);
const PLACEHOLDER: Color = Color::new(48, 52, 66, 255);

/// Textures uploaded for confirmed frames, keyed by frame path.
#[derive(Default)]
struct FrameTextures {
    map: FxHashMap<String, Texture2D>,
    failed: FxHashSet<String>,
    last_drawn: FxHashMap<Entity, String>,
}

impl FrameTextures {
    /// Upload textures for every displayed frame the loader confirmed.
    fn sync(&mut self, world: &mut World, rl: &mut RaylibHandle, thread: &RaylibThread) {
        let wanted: Vec<String> = world
            .query::<&FrameImage>()
            .iter(world)
            .filter(|image| image.visible && image.loaded)
            .map(|image| image.path.clone())
            .collect();

        for path in &wanted {
            if self.map.contains_key(path) || self.failed.contains(path) {
                continue;
            }
            match rl.load_texture(thread, path) {
                Ok(texture) => {
                    self.map.insert(path.clone(), texture);
                }
                Err(e) => {
                    warn!("Could not upload {}: {}", path, e);
                    self.failed.insert(path.clone());
                }
            }
        }

        if self.map.len() > TEXTURE_CACHE_LIMIT {
            let keep: FxHashSet<&str> = wanted
                .iter()
                .map(String::as_str)
                .chain(self.last_drawn.values().map(String::as_str))
                .collect();
            self.map.retain(|path, _| keep.contains(path.as_str()));
        }
    }

    /// Texture to draw for `entity`: its current frame if uploaded, else the
    /// last frame it showed.
    fn texture_for(&mut self, entity: Entity, path: &str) -> Option<&Texture2D> {
        if self.map.contains_key(path)
            && self.last_drawn.get(&entity).map(String::as_str) != Some(path)
        {
            self.last_drawn.insert(entity, path.to_string());
        }
        let key = self.last_drawn.get(&entity)?;
        self.map.get(key)
    }
}

/// Open the window and run until it is closed.
pub fn run_viewer(config: &ReelConfig, debug: bool) {
    let mut builder = raylib::init();
    builder
        .size(config.window_width as i32, config.window_height as i32)
        .resizable()
        .title("scrollreel");
    if config.vsync {
        builder.vsync();
    }
    let (mut rl, thread) = builder.build();
    rl.set_target_fps(config.target_fps);

    let mut world = setup_world(config);
    setup_frame_loader(&mut world, FsFetcher);
    if debug {
        world.insert_resource(DebugMode {});
    }

    let mut ticker = Ticker::new(update_schedule());
    let mut textures = FrameTextures::default();
    ticker.start();
    info!("Viewer running");

    while !rl.window_should_close() {
        let dt = rl.get_frame_time();
        read_scroll_input(&mut world, &rl, dt);
        if rl.is_key_pressed(KeyboardKey::KEY_F1) {
            world.trigger(SwitchDebugEvent {});
        }

        ticker.tick(&mut world, dt);
        textures.sync(&mut world, &mut rl, &thread);

        let mut d = rl.begin_drawing(&thread);
        render_page(&mut world, &mut d, &mut textures);
    }

    ticker.stop();
    shutdown_frame_loader(&mut world);
}

/// Update the viewport size and scroll offset from window state and input.
fn read_scroll_input(world: &mut World, rl: &RaylibHandle, dt: f32) {
    let page_height = world.resource::<PageLayout>().height;
    let mut viewport = world.resource_mut::<Viewport>();
    viewport.width = rl.get_screen_width() as f32;
    viewport.height = rl.get_screen_height() as f32;

    let mut delta = -rl.get_mouse_wheel_move() * WHEEL_STEP;
    if rl.is_key_down(KeyboardKey::KEY_DOWN) {
        delta += KEY_SCROLL_SPEED * dt;
    }
    if rl.is_key_down(KeyboardKey::KEY_UP) {
        delta -= KEY_SCROLL_SPEED * dt;
    }
    if rl.is_key_pressed(KeyboardKey::KEY_PAGE_DOWN) {
        delta += viewport.height * PAGE_STEP;
    }
    if rl.is_key_pressed(KeyboardKey::KEY_PAGE_UP) {
        delta -= viewport.height * PAGE_STEP;
    }
    if rl.is_key_pressed(KeyboardKey::KEY_HOME) {
        viewport.scroll_to(0.0, page_height);
    } else if delta != 0.0 {
        viewport.scroll_by(delta, page_height);
    }
}

/// Vertical placement of the pinned frame: stuck to the viewport top while
/// the container spans the viewport, otherwise riding the container edge.
fn pinned_frame_rect(rect: ContainerRect, viewport_height: f32) -> (f32, f32) {
    if rect.height <= viewport_height {
        return (rect.top, rect.height);
    }
    (rect.top.max(0.0).min(rect.bottom() - viewport_height), viewport_height)
}

/// Largest rectangle with the texture's aspect ratio centred in the area.
fn fit_rect(texture: &Texture2D, x: f32, y: f32, w: f32, h: f32) -> Rectangle {
    let tw = (texture.width as f32).max(1.0);
    let th = (texture.height as f32).max(1.0);
    let scale = (w / tw).min(h / th);
    let dw = tw * scale;
    let dh = th * scale;
    Rectangle::new(x + (w - dw) * 0.5, y + (h - dh) * 0.5, dw, dh)
}

fn render_page(world: &mut World, d: &mut RaylibDrawHandle, textures: &mut FrameTextures) {
    d.clear_background(BACKGROUND);
    let viewport = *world.resource::<Viewport>();
    let debug = world.contains_resource::<DebugMode>();

    let mut q = world.query::<(Entity, &ScrollContainer, &FrameImage, &ScrollSequence)>();
    for (entity, container, image, sequence) in q.iter(world) {
        let rect = viewport.rect_of(container);
        if !rect.intersects(viewport.height) {
            continue;
        }
        d.draw_rectangle(
            0,
            rect.top as i32,
            viewport.width as i32,
            rect.height as i32,
            CONTAINER,
        );

        let (y, h) = pinned_frame_rect(rect, viewport.height);
        let texture = if image.visible {
            textures.texture_for(entity, &image.path)
        } else {
            None
        };
        match texture {
            Some(texture) => {
                let src = Rectangle::new(0.0, 0.0, texture.width as f32, texture.height as f32);
                let dest = fit_rect(texture, 0.0, y, viewport.width, h);
                d.draw_texture_pro(texture, src, dest, Vector2::new(0.0, 0.0), 0.0, Color::WHITE);
            }
            None => {
                d.draw_rectangle(0, y as i32, viewport.width as i32, h as i32, PLACEHOLDER);
                if image.visible {
                    let label = format!("frame {}", image.frame);
                    d.draw_text(&label, 20, y as i32 + 20, 20, Color::GRAY);
                }
            }
        }

        d.draw_text(&container.name, 20, y as i32 + h as i32 - 30, 20, Color::RAYWHITE);
        if debug {
            let text = format!(
                "frame {}/{} | loaded {} | pending {} | {:.0}px/s",
                sequence.current_frame(),
                sequence.config().frame_count(),
                sequence.loaded_count(),
                sequence.pending_count(),
                sequence.last_velocity()
            );
            d.draw_text(&text, 20, y as i32 + 50, 10, Color::YELLOW);
        }
    }

    let loading = world.resource::<LoadingState>();
    if loading.is_loading() {
        let w = viewport.width as i32;
        let h = viewport.height as i32;
        d.draw_rectangle(0, 0, w, h, Color::BLACK);
        d.draw_text("Loading", w / 2 - 50, h / 2 - 40, 30, Color::RAYWHITE);
        let bar = (200.0 * loading.fraction()) as i32;
        d.draw_rectangle(w / 2 - 100, h / 2 + 10, bar, 6, Color::RAYWHITE);
        d.draw_rectangle_lines(w / 2 - 100, h / 2 + 10, 200, 6, Color::GRAY);
    }

    if debug {
        let text = format!(
            "DEBUG (F1) | FPS: {} | scroll {:.0}px",
            d.get_fps(),
            viewport.scroll_offset
        );
        d.draw_text(&text, 10, 10, 10, Color::YELLOW);
    }
}
