//! Headless SVG export of the wave graph.
//!
//! Advances the generator a fixed number of ticks without a terminal and writes the
//! resulting scene as an SVG document. With a seed the output is reproducible.

use anyhow::{anyhow, Context};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::commands::{load_config, ConfigOverrides};
use crate::config::WaveGraphConfig;
use crate::wave::{Pointer, SimpleRng, ViewportSize, WaveGraph};

/// Settings for one export run.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Destination file; stdout when absent
    pub output: Option<PathBuf>,
    pub width: f64,
    pub height: f64,
    /// Ticks to run before capturing the scene
    pub ticks: usize,
    pub seed: Option<u64>,
    /// Pointer x held for every tick, in pixels
    pub pointer_x: Option<f64>,
}

/// Renders the wave graph headlessly and writes the SVG.
///
/// # Errors
/// - If the configuration is invalid
/// - If the output file cannot be written
pub fn handle_export(options: ExportOptions, overrides: ConfigOverrides) -> anyhow::Result<()> {
    let config = load_config(&overrides)?;
    let svg = render_svg(config, &options)?;

    match &options.output {
        Some(path) => {
            fs::write(path, &svg)
                .with_context(|| format!("Failed to write SVG to {}", path.display()))?;
            tracing::info!("Exported {} ticks to {}", options.ticks, path.display());
            eprintln!("Wrote {}", path.display());
        }
        None => {
            std::io::stdout()
                .write_all(svg.as_bytes())
                .map_err(|e| anyhow!("Failed to write SVG to stdout: {e}"))?;
        }
    }

    Ok(())
}

/// Runs `options.ticks` ticks on a fresh graph and returns its SVG.
pub fn render_svg(config: WaveGraphConfig, options: &ExportOptions) -> anyhow::Result<String> {
    if !(options.width.is_finite() && options.width >= 0.0)
        || !(options.height.is_finite() && options.height >= 0.0)
    {
        return Err(anyhow!(
            "Export size must be non-negative, got {}x{}",
            options.width,
            options.height
        ));
    }

    let rng = options
        .seed
        .map(SimpleRng::new)
        .unwrap_or_else(SimpleRng::from_clock);
    let mut graph = WaveGraph::new(config, Box::new(rng));
    graph.resize(ViewportSize::new(options.width, options.height));

    if let Some(x) = options.pointer_x {
        graph.set_pointer(Pointer::new(x, options.height / 2.0));
    }

    tracing::debug!(
        "Exporting {} ticks at {}x{} (seed {:?})",
        options.ticks,
        options.width,
        options.height,
        options.seed
    );

    for _ in 0..options.ticks {
        graph.tick();
    }

    Ok(graph.to_svg())
}
