//! Application orchestration and command routing.
//!
//! Handles command-line argument parsing and delegates to appropriate command handlers.

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

use crate::commands::{self, ConfigOverrides, ExportOptions};
use crate::config::WindowMode;
use crate::logging;

/// A terminal waterfall of random-walk waves that follow the mouse
#[derive(Parser)]
#[command(name = "wavegraph")]
#[command(version)]
#[command(about = "A terminal waterfall of random-walk waves that follow the mouse")]
#[command(long_about = "A terminal waterfall of random-walk waves that follow the mouse.\n\nEvery tick a new line of samples is walked from the previous one and pushed onto a\nbounded window; older lines slide up and back. Moving the mouse over the canvas lifts\nthe sample underneath it.\n\nDEFAULT COMMAND:\n    If no command is specified, 'watch' is used by default.\n\nEXAMPLES:\n    # Animate at the configured rate\n    $ wavegraph\n\n    # Animate faster, truncating the window periodically\n    $ wavegraph --fps 60 --mode reset\n\n    # Render 40 ticks to an SVG file, reproducibly\n    $ wavegraph export --ticks 40 --seed 7 -o waves.svg\n\n    # Edit configuration file\n    $ wavegraph config")]
#[command(
    after_help = "CONFIGURATION:\n    Config file:        ~/.config/wavegraph/wavegraph.toml\n    Logs:               ~/.local/state/wavegraph/wavegraph.log.*"
)]
struct Cli {
    #[command(flatten)]
    tuning: TuningArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Overrides shared by the animated and headless commands.
#[derive(Args, Debug, Clone, Copy)]
struct TuningArgs {
    /// Logical ticks per second (overrides wave.target_fps)
    #[arg(long, global = true, value_name = "FPS")]
    fps: Option<f64>,

    /// History window behaviour (overrides wave.window_mode)
    #[arg(long, global = true, value_enum)]
    mode: Option<WindowMode>,

    /// Seed for the random walk; a clock-based seed is used when omitted
    #[arg(long, global = true)]
    seed: Option<u64>,
}

impl TuningArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            target_fps: self.fps,
            window_mode: self.mode,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Animate the wave graph in the terminal (default)
    ///
    /// Move the mouse over the canvas to lift the wave beneath it.
    /// Space pauses and resumes, 'r' clears, Escape/q quits.
    #[command(visible_alias = "w")]
    Watch,

    /// Render the wave graph to SVG without a terminal
    ///
    /// Runs a fixed number of ticks and writes the final scene.
    ///
    /// Examples:
    ///   wavegraph export > waves.svg
    ///   wavegraph export --ticks 100 --seed 3 -o waves.svg
    ///   wavegraph export --pointer-x 400 --width 800 --height 300
    #[command(visible_alias = "e")]
    Export {
        /// Write the SVG to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Canvas width in pixels
        #[arg(long, default_value_t = 800.0)]
        width: f64,

        /// Canvas height in pixels
        #[arg(long, default_value_t = 300.0)]
        height: f64,

        /// Ticks to run before capturing the scene
        #[arg(long, default_value_t = 24)]
        ticks: usize,

        /// Hold the pointer at this x position (pixels) for every tick
        #[arg(long, value_name = "X")]
        pointer_x: Option<f64>,
    },

    /// Open configuration file in your preferred editor
    ///
    /// Writes the defaults first if no configuration exists.
    /// Uses $EDITOR environment variable or falls back to nano/vi.
    #[command(visible_alias = "c")]
    Config,

    /// Show recent log entries from the application
    Logs {
        /// Number of lines to show
        #[arg(short = 'n', long, default_value_t = commands::logs::DEFAULT_LINES)]
        lines: usize,
    },

    /// Generate shell completion script
    ///
    /// Examples:
    ///   wavegraph completions bash > wavegraph.bash
    ///   wavegraph completions zsh > _wavegraph
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Runs the main application based on command-line arguments.
///
/// # Errors
/// - If logging initialization fails
/// - If command execution fails (e.g., invalid configuration, terminal errors)
pub fn run() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Handle commands that don't need logging
    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate(*shell, &mut Cli::command(), "wavegraph", &mut io::stdout());
            return Ok(());
        }
        Some(Commands::Logs { lines }) => {
            return commands::handle_logs(*lines);
        }
        _ => {}
    }

    logging::init_logging()?;

    let overrides = cli.tuning.overrides();
    let seed = cli.tuning.seed;

    match cli.command {
        None | Some(Commands::Watch) => {
            commands::handle_watch(overrides, seed)?;
        }
        Some(Commands::Export {
            output,
            width,
            height,
            ticks,
            pointer_x,
        }) => {
            let options = ExportOptions {
                output,
                width,
                height,
                ticks,
                seed,
                pointer_x,
            };
            commands::handle_export(options, overrides)?;
        }
        Some(Commands::Config) => {
            commands::handle_config()?;
        }
        Some(Commands::Completions { .. }) | Some(Commands::Logs { .. }) => {
            unreachable!("These commands are handled earlier")
        }
    }

    Ok(())
}
