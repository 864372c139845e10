//! Application command handlers for wavegraph.
//!
//! This module organizes command handling into separate submodules, each responsible for a specific
//! application command.
//!
//! # Commands
//! - `watch`: Animated wave graph in the terminal (default)
//! - `export`: Headless rendering of the wave graph to SVG
//! - `config`: Open configuration file in user's preferred editor
//! - `logs`: Display recent log entries

pub mod config;
pub mod export;
pub mod logs;
pub mod watch;

pub use config::handle_config;
pub use export::{handle_export, ExportOptions};
pub use logs::handle_logs;
pub use watch::handle_watch;

use crate::config::{WaveGraphConfig, WindowMode};

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigOverrides {
    pub target_fps: Option<f64>,
    pub window_mode: Option<WindowMode>,
}

impl ConfigOverrides {
    /// Applies the overrides and re-validates the result.
    pub fn apply(&self, mut config: WaveGraphConfig) -> anyhow::Result<WaveGraphConfig> {
        if let Some(fps) = self.target_fps {
            config.wave.target_fps = fps;
        }
        if let Some(mode) = self.window_mode {
            config.wave.window_mode = mode;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Loads the user's configuration with command-line overrides applied.
pub fn load_config(overrides: &ConfigOverrides) -> anyhow::Result<WaveGraphConfig> {
    overrides.apply(WaveGraphConfig::load()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_file_values() {
        let overrides = ConfigOverrides {
            target_fps: Some(60.0),
            window_mode: Some(WindowMode::Reset),
        };
        let config = overrides.apply(WaveGraphConfig::default()).unwrap();
        assert_eq!(config.wave.target_fps, 60.0);
        assert_eq!(config.wave.window_mode, WindowMode::Reset);
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let overrides = ConfigOverrides {
            target_fps: Some(0.0),
            ..ConfigOverrides::default()
        };
        assert!(overrides.apply(WaveGraphConfig::default()).is_err());
    }

    #[test]
    fn test_tiny_fps_override_is_rejected() {
        let overrides = ConfigOverrides {
            target_fps: Some(1e-20),
            ..ConfigOverrides::default()
        };
        assert!(overrides.apply(WaveGraphConfig::default()).is_err());
    }
}
