//! Configuration system for tileproto.
//!
//! Runtime-configurable settings persisted to disk as RON, with CLI overrides
//! via clap. Missing files are replaced by written-back defaults; unparseable
//! files fall back to defaults with a logged warning so a stale config never
//! blocks startup.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CameraConfig, Config, GeneratorKind, LogConfig, WindowConfig, WorldConfig};
pub use error::ConfigError;
