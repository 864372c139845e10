//! Animated wave graph in the terminal.
//!
//! Runs the display loop: input polling, a throttled generation tick and a repaint per
//! frame. SIGTERM and SIGINT stop the loop and restore the terminal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::commands::{load_config, ConfigOverrides};
use crate::display::{StatusLine, WatchCommand, WaveTui};
use crate::ui::ErrorScreen;
use crate::wave::generator::affected_sample;
use crate::wave::{AnimationScheduler, PanicLogGuard, SimpleRng, WaveGraph};

/// Display refresh interval, roughly 60 Hz.
const DISPLAY_FRAME: Duration = Duration::from_millis(16);

/// Runs the animated wave graph until the user quits.
///
/// # Errors
/// - If the configuration is invalid
/// - If the terminal cannot be initialized or drawn to
/// - If the signal handlers cannot be registered
pub fn handle_watch(overrides: ConfigOverrides, seed: Option<u64>) -> anyhow::Result<()> {
    tracing::info!("=== wavegraph Started ===");

    let config = match load_config(&overrides) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Failed to load configuration: {err:#}");
            let error_message = format!(
                "Configuration Error:\n\n{err:#}\n\nPlease check your ~/.config/wavegraph/wavegraph.toml file and try again."
            );
            let mut error_screen = ErrorScreen::new()?;
            error_screen.show_error(&error_message)?;
            error_screen.cleanup()?;
            return Err(anyhow::anyhow!("Configuration error: {err:#}"));
        }
    };

    tracing::info!(
        "Configuration loaded: samples={}, window={}, max={}, fps={}, mode={}",
        config.wave.samples_per_line,
        config.wave.lines_in_window,
        config.wave.max_line_value,
        config.wave.target_fps,
        config.wave.window_mode
    );

    let rng = seed.map(SimpleRng::new).unwrap_or_else(SimpleRng::from_clock);
    let mut graph = WaveGraph::new(config, Box::new(rng));
    let mut scheduler = AnimationScheduler::new(graph.wave_config().frame_interval());

    let term = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGTERM, signal_hook::consts::SIGINT] {
        signal_hook::flag::register(signal, Arc::clone(&term))
            .map_err(|e| anyhow::anyhow!("Failed to register signal handler: {e}"))?;
    }

    // declared before the TUI so the hook outlives raw mode
    let _panic_log = PanicLogGuard::install();
    let mut tui = WaveTui::new()?;
    scheduler.start();

    loop {
        if term.load(Ordering::Relaxed) {
            tracing::info!("Received termination signal: stopping animation");
            break;
        }

        graph.resize(tui.measure()?);

        match tui.handle_input(DISPLAY_FRAME, &mut graph)? {
            WatchCommand::Continue => {}
            WatchCommand::Quit => break,
            WatchCommand::TogglePause => {
                if scheduler.is_running() {
                    scheduler.stop();
                } else {
                    scheduler.start();
                }
            }
            WatchCommand::Clear => graph.reset(),
        }

        scheduler.on_frame(Instant::now(), |_| {
            graph.tick();
            Ok(())
        });

        let status = StatusLine {
            running: scheduler.is_running(),
            ticks: graph.state().tick,
            lines: graph.scene().len(),
            pointer_sample: affected_sample(
                graph.pointer(),
                graph.viewport().width,
                graph.wave_config().samples_per_line,
            ),
        };
        tui.draw(graph.scene(), &graph.config().render, status)?;
    }

    scheduler.stop();
    tui.cleanup()?;

    tracing::info!(
        "=== wavegraph Exited Successfully ({} ticks, {} failed) ===",
        scheduler.ticks(),
        scheduler.failures()
    );
    Ok(())
}
