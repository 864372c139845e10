//! Terminal host for the wave graph.
//!
//! Provides the full-screen canvas, pointer tracking from mouse events and
//! the painter that turns scene shapes into braille strokes.

pub mod painter;
pub mod ui;

pub use ui::{StatusLine, WatchCommand, WaveTui};
