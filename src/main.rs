mod app;
mod commands;
mod config;
mod display;
mod logging;
mod ui;
mod wave;

fn main() {
    if let Err(e) = app::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
