//! Wave generation, layout and drawing.
//!
//! - `scale`: viewport mappings for sample index, value and history position
//! - `generator`: random-walk line generation over a bounded history
//! - `curve`: smooth B-spline paths through sample points
//! - `scene`: per-line shapes reconciled against the history, plus SVG output
//! - `scheduler`: fixed-rate ticks on top of the display loop
//! - `graph`: the state object tying the pieces together

pub mod curve;
pub mod generator;
pub mod graph;
pub mod scale;
pub mod scene;
pub mod scheduler;

pub use generator::{Pointer, SimpleRng};
pub use graph::WaveGraph;
pub use scale::ViewportSize;
pub use scene::Scene;
pub use scheduler::{AnimationScheduler, PanicLogGuard};
