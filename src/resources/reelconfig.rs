//! Player configuration resource.
//!
//! Manages window, loading and page settings plus the list of animated
//! sections, loaded from an INI configuration file. Provides defaults for a
//! safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [window]
//! width = 1280
//! height = 720
//! target_fps = 60
//! vsync = true
//!
//! [loading]
//! delay_ms = 1500
//!
//! [page]
//! top_padding = 720
//! gap = 400
//!
//! [sequence.hero]
//! order = 0
//! frame_count = 120
//! frame_path = assets/frames/hero
//! speed_factor = 1.0
//! policy = linear
//! preload_radius = 5
//! height = 2400
//!
//! [sequence.vehicle]
//! order = 1
//! frame_count = 90
//! frame_path = assets/frames/vehicle
//! policy = mirror
//! distance = 1.5
//! height = 1600
//! ```
//!
//! Sections are laid out top to bottom by `order`, then by name. A section
//! that fails validation is logged and skipped; the others still load.

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{error, info};
use std::path::PathBuf;

use crate::components::scrollsequence::{
    DEFAULT_MIRROR_DISTANCE, DEFAULT_PRELOAD_RADIUS, DEFAULT_SPEED_FACTOR, FramePolicy,
    SequenceConfig,
};

/// Default safe values for startup
const DEFAULT_WINDOW_WIDTH: u32 = 1280;
const DEFAULT_WINDOW_HEIGHT: u32 = 720;
const DEFAULT_TARGET_FPS: u32 = 60;
const DEFAULT_VSYNC: bool = true;
const DEFAULT_LOADING_DELAY_MS: u64 = 1500;
const DEFAULT_TOP_PADDING: f32 = 720.0;
const DEFAULT_GAP: f32 = 400.0;
const DEFAULT_SECTION_HEIGHT: f32 = 2400.0;
const DEFAULT_CONFIG_PATH: &str = "./scrollreel.ini";
const SEQUENCE_PREFIX: &str = "sequence.";

/// One animated section of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSpec {
    pub name: String,
    pub order: i64,
    pub sequence: SequenceConfig,
    /// Container height in pixels.
    pub height: f32,
}

/// Player configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct ReelConfig {
    /// Window width in pixels.
    pub window_width: u32,
    /// Window height in pixels.
    pub window_height: u32,
    /// Target ticks per second.
    pub target_fps: u32,
    /// Enable vertical sync.
    pub vsync: bool,
    /// Upper bound of the loading phase, in milliseconds.
    pub loading_delay_ms: u64,
    /// Blank space above the first section, in pixels.
    pub top_padding: f32,
    /// Blank space between sections, in pixels.
    pub gap: f32,
    /// Animated sections in page order.
    pub sections: Vec<SectionSpec>,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for ReelConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ReelConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            target_fps: DEFAULT_TARGET_FPS,
            vsync: DEFAULT_VSYNC,
            loading_delay_ms: DEFAULT_LOADING_DELAY_MS,
            top_padding: DEFAULT_TOP_PADDING,
            gap: DEFAULT_GAP,
            sections: vec![default_section()],
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;
        self.apply(&config);
        info!("Loaded config from {:?}", self.config_path);
        Ok(())
    }

    /// Load configuration from INI text.
    pub fn load_from_str(&mut self, text: &str) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .read(text.to_string())
            .map_err(|e| format!("Failed to parse config: {}", e))?;
        self.apply(&config);
        Ok(())
    }

    fn apply(&mut self, config: &Ini) {
        // [window] section
        if let Some(width) = config.getuint("window", "width").ok().flatten() {
            self.window_width = width as u32;
        }
        if let Some(height) = config.getuint("window", "height").ok().flatten() {
            self.window_height = height as u32;
        }
        if let Some(fps) = config.getuint("window", "target_fps").ok().flatten() {
            self.target_fps = fps as u32;
        }
        if let Some(vsync) = config.getbool("window", "vsync").ok().flatten() {
            self.vsync = vsync;
        }

        // [loading] section
        if let Some(delay) = config.getuint("loading", "delay_ms").ok().flatten() {
            self.loading_delay_ms = delay;
        }

        // [page] section
        if let Some(padding) = config.getfloat("page", "top_padding").ok().flatten() {
            self.top_padding = (padding as f32).max(0.0);
        }
        if let Some(gap) = config.getfloat("page", "gap").ok().flatten() {
            self.gap = (gap as f32).max(0.0);
        }

        // [sequence.*] sections
        let mut sections: Vec<SectionSpec> = config
            .sections()
            .iter()
            .filter_map(|section| {
                let name = section.strip_prefix(SEQUENCE_PREFIX)?;
                match parse_section(config, section, name) {
                    Ok(spec) => Some(spec),
                    Err(e) => {
                        error!("Skipping [{}]: {}", section, e);
                        None
                    }
                }
            })
            .collect();
        sections.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        if !sections.is_empty() {
            self.sections = sections;
        }

        info!(
            "Config: {}x{} window, fps={}, vsync={}, loading={}ms, {} section(s)",
            self.window_width,
            self.window_height,
            self.target_fps,
            self.vsync,
            self.loading_delay_ms,
            self.sections.len()
        );
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let config = self.to_ini();
        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    fn to_ini(&self) -> Ini {
        let mut config = Ini::new();

        config.set("window", "width", Some(self.window_width.to_string()));
        config.set("window", "height", Some(self.window_height.to_string()));
        config.set("window", "target_fps", Some(self.target_fps.to_string()));
        config.set("window", "vsync", Some(self.vsync.to_string()));

        config.set("loading", "delay_ms", Some(self.loading_delay_ms.to_string()));

        config.set("page", "top_padding", Some(self.top_padding.to_string()));
        config.set("page", "gap", Some(self.gap.to_string()));

        for spec in &self.sections {
            let section = format!("{}{}", SEQUENCE_PREFIX, spec.name);
            let sequence = &spec.sequence;
            config.set(&section, "order", Some(spec.order.to_string()));
            config.set(&section, "frame_count", Some(sequence.frame_count().to_string()));
            config.set(&section, "frame_path", Some(sequence.frame_path().to_string()));
            config.set(&section, "speed_factor", Some(sequence.speed_factor().to_string()));
            config.set(&section, "policy", Some(sequence.policy().name().to_string()));
            if let FramePolicy::CenterMirror { distance } = sequence.policy() {
                config.set(&section, "distance", Some(distance.to_string()));
            }
            config.set(&section, "preload_radius", Some(sequence.preload_radius().to_string()));
            config.set(&section, "height", Some(spec.height.to_string()));
        }
        config
    }

    /// Loading delay in seconds.
    pub fn loading_delay_secs(&self) -> f32 {
        self.loading_delay_ms as f32 / 1000.0
    }

    pub fn section(&self, name: &str) -> Option<&SectionSpec> {
        self.sections.iter().find(|s| s.name == name)
    }
}

fn default_section() -> SectionSpec {
    SectionSpec {
        name: "hero".to_string(),
        order: 0,
        sequence: SequenceConfig::default(),
        height: DEFAULT_SECTION_HEIGHT,
    }
}

fn parse_section(config: &Ini, section: &str, name: &str) -> Result<SectionSpec, String> {
    let frame_count = config
        .getuint(section, "frame_count")?
        .ok_or_else(|| "missing frame_count".to_string())?;
    let frame_count = u32::try_from(frame_count).map_err(|_| "frame_count out of range")?;
    let frame_path = config
        .get(section, "frame_path")
        .ok_or_else(|| "missing frame_path".to_string())?;
    let speed_factor = config
        .getfloat(section, "speed_factor")?
        .map_or(DEFAULT_SPEED_FACTOR, |v| v as f32);
    let distance = config
        .getfloat(section, "distance")?
        .map_or(DEFAULT_MIRROR_DISTANCE, |v| v as f32);
    let policy_name = config
        .get(section, "policy")
        .unwrap_or_else(|| FramePolicy::EdgeLinear.name().to_string());
    let preload_radius = config
        .getuint(section, "preload_radius")?
        .map_or(DEFAULT_PRELOAD_RADIUS, |v| v.min(u32::MAX as u64) as u32);
    let height = config
        .getfloat(section, "height")?
        .map_or(DEFAULT_SECTION_HEIGHT, |v| (v as f32).max(0.0));
    let order = config.getint(section, "order")?.unwrap_or(0);

    let policy = FramePolicy::parse(&policy_name, distance).map_err(|e| e.to_string())?;
    let sequence = SequenceConfig::new(frame_count, frame_path, speed_factor)
        .and_then(|c| c.with_policy(policy))
        .map_err(|e| e.to_string())?
        .with_preload_radius(preload_radius);

    Ok(SectionSpec {
        name: name.to_string(),
        order,
        sequence,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[window]
width = 1024
height = 600
target_fps = 30
vsync = false

[loading]
delay_ms = 250

[page]
top_padding = 100
gap = 50

[sequence.vehicle]
order = 1
frame_count = 90
frame_path = assets/frames/vehicle
policy = mirror
distance = 2.0
height = 1600

[sequence.hero]
order = 0
frame_count = 120
frame_path = assets/frames/hero
speed_factor = 1.5
preload_radius = 3
height = 2000
";

    #[test]
    fn defaults_have_one_section() {
        let config = ReelConfig::new();
        assert_eq!(config.sections.len(), 1);
        assert_eq!(config.sections[0].sequence.frame_count(), 120);
        assert_eq!(config.loading_delay_secs(), 1.5);
    }

    #[test]
    fn parses_all_sections_in_order() {
        let mut config = ReelConfig::new();
        config.load_from_str(SAMPLE).unwrap();

        assert_eq!(config.window_width, 1024);
        assert_eq!(config.window_height, 600);
        assert_eq!(config.target_fps, 30);
        assert!(!config.vsync);
        assert_eq!(config.loading_delay_ms, 250);
        assert_eq!(config.top_padding, 100.0);
        assert_eq!(config.gap, 50.0);

        let names: Vec<&str> = config.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["hero", "vehicle"]);

        let hero = config.section("hero").unwrap();
        assert_eq!(hero.sequence.frame_path(), "assets/frames/hero");
        assert_eq!(hero.sequence.speed_factor(), 1.5);
        assert_eq!(hero.sequence.preload_radius(), 3);
        assert_eq!(hero.sequence.policy(), FramePolicy::EdgeLinear);
        assert_eq!(hero.height, 2000.0);

        let vehicle = config.section("vehicle").unwrap();
        assert_eq!(
            vehicle.sequence.policy(),
            FramePolicy::CenterMirror { distance: 2.0 }
        );
        assert_eq!(vehicle.sequence.preload_radius(), DEFAULT_PRELOAD_RADIUS);
    }

    #[test]
    fn invalid_section_is_skipped() {
        let mut config = ReelConfig::new();
        config
            .load_from_str(
                "[sequence.broken]\nframe_count = 0\nframe_path = x\n\n\
                 [sequence.nopath]\nframe_count = 10\n\n\
                 [sequence.ok]\nframe_count = 10\nframe_path = frames/ok\n",
            )
            .unwrap();
        assert_eq!(config.sections.len(), 1);
        assert_eq!(config.sections[0].name, "ok");
    }

    #[test]
    fn file_without_sequences_keeps_default_section() {
        let mut config = ReelConfig::new();
        config.load_from_str("[window]\nwidth = 800\n").unwrap();
        assert_eq!(config.window_width, 800);
        assert_eq!(config.sections.len(), 1);
        assert_eq!(config.sections[0].name, "hero");
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut config = ReelConfig::with_path("/definitely/not/here/scrollreel.ini");
        assert!(config.load_from_file().is_err());
        assert_eq!(config.window_width, DEFAULT_WINDOW_WIDTH);
    }

    #[test]
    fn save_then_load_keeps_sections() {
        let path = std::env::temp_dir().join(format!("scrollreel-config-{}.ini", std::process::id()));
        let mut original = ReelConfig::with_path(&path);
        original.load_from_str(SAMPLE).unwrap();
        original.save_to_file().unwrap();

        let mut reloaded = ReelConfig::with_path(&path);
        reloaded.load_from_file().unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(reloaded.window_width, 1024);
        assert_eq!(reloaded.sections, original.sections);
    }
}
