//! Command-line argument parsing for tileproto.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, GeneratorKind};

/// tileproto command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "tileproto", about = "Chunk-baking 2D tile world demo")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Window title.
    #[arg(long)]
    pub title: Option<String>,

    /// Start in fullscreen.
    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// World seed for the deterministic generator.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fill chunks from an unseeded uniform stream instead of the
    /// deterministic generator.
    #[arg(long)]
    pub uniform_world: bool,

    /// Log filter override (e.g. "debug", "info,wgpu=error").
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(ref title) = args.title {
            self.window.title = title.clone();
        }
        if let Some(fs) = args.fullscreen {
            self.window.fullscreen = fs;
        }
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if args.uniform_world {
            self.world.generator = GeneratorKind::Uniform;
        }
        if let Some(ref level) = args.log_level {
            self.log.level = level.clone();
        }
    }
}
