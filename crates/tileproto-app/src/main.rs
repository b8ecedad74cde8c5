//! tileproto: a scrolling 2D tile world that bakes each chunk's block grid
//! into a single texture once, then draws one quad per resident chunk per
//! frame.
//!
//! Run with `cargo run -p tileproto-app`. Window and world settings come
//! from `config.ron` in the platform config directory and can be overridden
//! on the CLI, e.g. `cargo run -p tileproto-app -- --width 1920 --seed 7`.

mod camera;
mod overlay;
mod ticker;
mod window;

use std::path::PathBuf;

use clap::Parser;
use tileproto_config::{CliArgs, Config};
use tracing::info;

fn main() {
    let args = CliArgs::parse();

    let config_dir = config_dir(&args);
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|err| {
        // Logging is not up yet, so this goes straight to stderr.
        eprintln!(
            "Failed to load config from {}: {err}; using defaults",
            config_dir.display()
        );
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = dirs::data_local_dir().map(|base| base.join("tileproto").join("logs"));
    tileproto_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));

    info!(
        "Starting tileproto: {}x{}, seed {}, generator {:?}, config dir {}",
        config.window.width,
        config.window.height,
        config.world.seed,
        config.world.generator,
        config_dir.display(),
    );

    window::run_with_config(config);
}

/// Explicit `--config` dir, else the platform config dir, else the CWD.
fn config_dir(args: &CliArgs) -> PathBuf {
    args.config
        .clone()
        .or_else(|| dirs::config_dir().map(|base| base.join("tileproto")))
        .unwrap_or_else(|| PathBuf::from("."))
}
