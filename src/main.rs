//! scrollreel entry point.
//!
//! Loads `scrollreel.ini` (or the file given with `--config`) and either runs
//! a scripted headless scroll, printing a JSON summary, or opens the raylib
//! viewer when built with the `viewer` feature.
//!
//! ```sh
//! cargo run --release --features viewer
//! cargo run --release -- --headless --seconds 12 --scroll-speed 600
//! ```

use std::path::PathBuf;

use clap::Parser;
use scrollreel::headless::{HeadlessOptions, run_headless};
use scrollreel::resources::frameloader::FsFetcher;
use scrollreel::resources::reelconfig::ReelConfig;

/// Scroll-driven image sequence player
#[derive(Parser)]
#[command(version, about = "Plays pre-rendered image sequences driven by page scroll.")]
struct Cli {
    /// INI configuration file.
    #[arg(long, value_name = "PATH", default_value = "./scrollreel.ini")]
    config: PathBuf,

    /// Run a scripted scroll without a window and print a summary.
    #[arg(long)]
    headless: bool,

    /// Length of the headless run in seconds.
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,

    /// Headless scroll speed in px/s.
    #[arg(long, default_value_t = 400.0)]
    scroll_speed: f32,

    /// Headless ticks per second.
    #[arg(long, default_value_t = 60)]
    tick_rate: u32,

    /// Random deviation of the headless scroll speed, in px/s.
    #[arg(long, default_value_t = 0.0)]
    jitter: f32,

    /// Seed for the headless jitter.
    #[arg(long)]
    seed: Option<u64>,

    /// Start with diagnostics enabled.
    #[arg(long)]
    debug: bool,

    /// Write the default configuration to PATH and exit.
    #[arg(long, value_name = "PATH")]
    write_default_config: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Early-exit: write defaults and quit
    if let Some(path) = cli.write_default_config {
        let config = ReelConfig::with_path(path.clone());
        if let Err(e) = config.save_to_file() {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
        println!("Default configuration written to {}", path.display());
        return;
    }

    let mut config = ReelConfig::with_path(cli.config.clone());
    if let Err(e) = config.load_from_file() {
        log::warn!("{e}; using defaults");
    }

    if cli.headless {
        let options = HeadlessOptions {
            seconds: cli.seconds,
            scroll_speed: cli.scroll_speed,
            tick_rate: cli.tick_rate,
            jitter: cli.jitter,
            seed: cli.seed,
            debug: cli.debug,
        };
        let summary = run_headless(&config, &options, FsFetcher);
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    run_window(&config, cli.debug);
}

#[cfg(feature = "viewer")]
fn run_window(config: &ReelConfig, debug: bool) {
    scrollreel::viewer::run_viewer(config, debug);
}

#[cfg(not(feature = "viewer"))]
fn run_window(_config: &ReelConfig, _debug: bool) {
    eprintln!("The viewer is not compiled in; rebuild with `--features viewer` or pass --headless.");
    std::process::exit(1);
}
