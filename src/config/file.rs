//! Configuration file management for wavegraph.
//!
//! This module handles loading and saving the wave and render settings from TOML files.
//! Configuration is stored in the user's config directory; a missing file means defaults.

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How the history window makes room for new lines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowMode {
    /// Drop the oldest line every tick once the window is full
    #[default]
    Slide,
    /// Let the window fill up, then periodically truncate it
    Reset,
}

impl std::fmt::Display for WindowMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slide => write!(f, "slide"),
            Self::Reset => write!(f, "reset"),
        }
    }
}

/// How strongly the pointer lifts the sample beneath it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PointerIntensity {
    /// A quarter of `max_line_value`
    #[default]
    Strong,
    /// A fifth of `max_line_value`
    Subtle,
}

impl PointerIntensity {
    fn divisor(self) -> f64 {
        match self {
            Self::Strong => 4.0,
            Self::Subtle => 5.0,
        }
    }
}

/// An `#rrggbb` colour.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Mixes this colour over `background` at the given opacity.
    pub fn blend_over(self, background: HexColor, opacity: f64) -> HexColor {
        let alpha = opacity.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (fg as f64 * alpha + bg as f64 * (1.0 - alpha)).round() as u8;
        HexColor::new(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

impl std::str::FromStr for HexColor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
            .ok_or_else(|| anyhow!("Invalid colour '{s}': expected #rrggbb"))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|e| anyhow!("Invalid colour '{s}': {e}"))
        };
        Ok(HexColor::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for HexColor {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl std::fmt::Display for HexColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Wave generation and layout settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Samples in every generated line
    #[serde(default = "default_samples_per_line")]
    pub samples_per_line: usize,
    /// Maximum number of lines kept and drawn
    #[serde(default = "default_lines_in_window")]
    pub lines_in_window: usize,
    /// Floor for walked samples and upper bound of the value scale
    #[serde(default = "default_max_line_value")]
    pub max_line_value: f64,
    /// Logical ticks per second; display refresh runs independently
    #[serde(default = "default_target_fps")]
    pub target_fps: f64,
    /// "slide" (continuous) or "reset" (periodic truncation)
    #[serde(default)]
    pub window_mode: WindowMode,
    /// Ticks between truncations, only used by the reset window mode
    #[serde(default = "default_reset_interval")]
    pub reset_interval: usize,
    /// "strong" (max / 4) or "subtle" (max / 5)
    #[serde(default)]
    pub pointer_intensity: PointerIntensity,
    /// Share of the viewport height the value scale spans
    #[serde(default = "default_value_height_fraction")]
    pub value_height_fraction: f64,
}

fn default_samples_per_line() -> usize {
    12
}

fn default_lines_in_window() -> usize {
    8
}

fn default_max_line_value() -> f64 {
    33.0
}

fn default_target_fps() -> f64 {
    32.0
}

/// Slowest accepted tick rate: one tick every 100 seconds.
const MIN_TARGET_FPS: f64 = 0.01;

fn default_reset_interval() -> usize {
    2
}

fn default_value_height_fraction() -> f64 {
    0.8
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            samples_per_line: default_samples_per_line(),
            lines_in_window: default_lines_in_window(),
            max_line_value: default_max_line_value(),
            target_fps: default_target_fps(),
            window_mode: WindowMode::default(),
            reset_interval: default_reset_interval(),
            pointer_intensity: PointerIntensity::default(),
            value_height_fraction: default_value_height_fraction(),
        }
    }
}

impl WaveConfig {
    /// Minimum time between processed ticks.
    ///
    /// Rates too slow for a `Duration` saturate to `Duration::MAX`, which never ticks.
    pub fn frame_interval(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.target_fps).unwrap_or(Duration::MAX)
    }

    /// Amount added to the sample under the pointer.
    pub fn pointer_perturbation(&self) -> f64 {
        self.max_line_value / self.pointer_intensity.divisor()
    }

    /// Number of ticks a reset window survives before it is truncated.
    pub fn reset_after_steps(&self) -> usize {
        self.lines_in_window.div_ceil(self.reset_interval.max(1))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.samples_per_line == 0 {
            return Err(anyhow!("wave.samples_per_line must be at least 1"));
        }
        if self.lines_in_window == 0 {
            return Err(anyhow!("wave.lines_in_window must be at least 1"));
        }
        if !self.max_line_value.is_finite() || self.max_line_value <= 0.0 {
            return Err(anyhow!(
                "wave.max_line_value must be a positive number, got {}",
                self.max_line_value
            ));
        }
        if !self.target_fps.is_finite() || self.target_fps < MIN_TARGET_FPS {
            return Err(anyhow!(
                "wave.target_fps must be at least {MIN_TARGET_FPS}, got {}",
                self.target_fps
            ));
        }
        if self.reset_interval == 0 {
            return Err(anyhow!("wave.reset_interval must be at least 1"));
        }
        if !self.value_height_fraction.is_finite() || self.value_height_fraction <= 0.0 {
            return Err(anyhow!(
                "wave.value_height_fraction must be greater than 0, got {}",
                self.value_height_fraction
            ));
        }
        Ok(())
    }
}

/// Colours and stroke settings for drawn waves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Fill colour of the area under each wave
    #[serde(default = "default_fill")]
    pub fill: HexColor,
    /// Opacity of the area fill (0.0 - 1.0)
    #[serde(default = "default_fill_opacity")]
    pub fill_opacity: f64,
    /// Outline colour of each wave
    #[serde(default = "default_stroke")]
    pub stroke: HexColor,
    /// Outline width in pixels (SVG only)
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    /// Canvas background
    #[serde(default = "default_background")]
    pub background: HexColor,
}

fn default_fill() -> HexColor {
    HexColor::new(0x00, 0xdd, 0x00)
}

fn default_fill_opacity() -> f64 {
    0.1
}

fn default_stroke() -> HexColor {
    HexColor::new(0x00, 0x80, 0x00)
}

fn default_stroke_width() -> f64 {
    1.0
}

fn default_background() -> HexColor {
    HexColor::new(0x00, 0x00, 0x00)
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fill: default_fill(),
            fill_opacity: default_fill_opacity(),
            stroke: default_stroke(),
            stroke_width: default_stroke_width(),
            background: default_background(),
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> anyhow::Result<()> {
        if !(0.0..=1.0).contains(&self.fill_opacity) {
            return Err(anyhow!(
                "render.fill_opacity must be between 0 and 1, got {}",
                self.fill_opacity
            ));
        }
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(anyhow!(
                "render.stroke_width must not be negative, got {}",
                self.stroke_width
            ));
        }
        Ok(())
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaveGraphConfig {
    #[serde(default)]
    pub wave: WaveConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl WaveGraphConfig {
    /// Loads configuration from the user's config directory.
    ///
    /// Falls back to defaults when the file does not exist yet.
    ///
    /// # Errors
    /// - If the config directory cannot be determined
    /// - If the config file cannot be read
    /// - If the TOML is malformed or fails validation
    pub fn load() -> anyhow::Result<Self> {
        let config_path = get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from an explicit path.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let config_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&config_content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: WaveGraphConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges the TOML types cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.wave.validate()?;
        self.render.validate()
    }

    /// Saves configuration to an explicit path.
    ///
    /// # Errors
    /// - If the file cannot be written
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let config_content = toml::to_string_pretty(self)?;
        fs::write(path, config_content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// Retrieves the path to the config file, creating its directory if needed.
///
/// # Errors
/// - If the home directory cannot be determined
/// - If the config directory cannot be created
pub fn get_config_path() -> anyhow::Result<PathBuf> {
    let config_dir = dirs::home_dir()
        .ok_or_else(|| anyhow!("Could not determine home directory"))?
        .join(".config")
        .join("wavegraph");

    fs::create_dir_all(&config_dir)
        .map_err(|e| anyhow!("Failed to create config directory: {e}"))?;

    Ok(config_dir.join("wavegraph.toml"))
}

/// Writes the default configuration unless a config file already exists.
///
/// Returns the config file path.
pub fn ensure_config_file() -> anyhow::Result<PathBuf> {
    let config_path = get_config_path()?;
    if !config_path.exists() {
        WaveGraphConfig::default().save_to(&config_path)?;
    }
    Ok(config_path)
}
