//! Configuration management for wavegraph.
//!
//! This module handles loading and saving the application configuration from a TOML file
//! in the user's config directory. Every field has a default, so the file is optional.

pub mod file;

pub use file::{ensure_config_file, HexColor, RenderConfig, WaveConfig, WaveGraphConfig, WindowMode};
