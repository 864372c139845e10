//! The wave graph as one explicit state object.
//!
//! [`WaveGraph`] owns everything the animation needs between frames: the latest generator
//! snapshot, pointer and viewport as reported by the host, memoized scales and the scene.
//! Hosts drive it with `tick` and read the result through `scene`.

use crate::config::{WaveConfig, WaveGraphConfig};
use crate::wave::generator::{Pointer, RandomSource, WaveState};
use crate::wave::scale::{ScaleCache, ViewportSize};
use crate::wave::scene::{Scene, SceneDiff, SceneRenderer};

pub struct WaveGraph {
    config: WaveGraphConfig,
    state: WaveState,
    pointer: Option<Pointer>,
    viewport: ViewportSize,
    scales: ScaleCache,
    renderer: SceneRenderer,
    rng: Box<dyn RandomSource>,
}

impl WaveGraph {
    pub fn new(config: WaveGraphConfig, rng: Box<dyn RandomSource>) -> Self {
        Self {
            config,
            state: WaveState::default(),
            pointer: None,
            viewport: ViewportSize::default(),
            scales: ScaleCache::default(),
            renderer: SceneRenderer::new(),
            rng,
        }
    }

    pub fn config(&self) -> &WaveGraphConfig {
        &self.config
    }

    pub fn wave_config(&self) -> &WaveConfig {
        &self.config.wave
    }

    /// Latest generator snapshot.
    pub fn state(&self) -> &WaveState {
        &self.state
    }

    pub fn pointer(&self) -> Option<Pointer> {
        self.pointer
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Records a new viewport size and repaints with matching scales.
    pub fn resize(&mut self, viewport: ViewportSize) {
        if viewport == self.viewport {
            return;
        }
        tracing::debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
        self.viewport = viewport;
        self.redraw();
    }

    /// Pointer entered or moved.
    pub fn set_pointer(&mut self, pointer: Pointer) {
        self.pointer = Some(pointer);
    }

    /// Pointer left the viewport or the touch ended.
    pub fn clear_pointer(&mut self) {
        self.pointer = None;
    }

    /// Generates the next line and repaints.
    pub fn tick(&mut self) -> SceneDiff {
        self.state = self.state.advance(
            self.pointer,
            self.viewport.width,
            &self.config.wave,
            self.rng.as_mut(),
        );
        self.redraw()
    }

    /// Repaints the current snapshot without generating anything.
    pub fn redraw(&mut self) -> SceneDiff {
        let scales = self.scales.get(self.viewport, &self.config.wave);
        self.renderer
            .render(&self.state.history, scales, self.viewport)
    }

    /// Drops all lines and starts over from an empty window.
    pub fn reset(&mut self) {
        self.state = WaveState::default();
        self.renderer.clear();
    }

    pub fn scene(&self) -> &Scene {
        self.renderer.scene()
    }

    /// Current scene as an SVG document.
    pub fn to_svg(&self) -> String {
        self.scene().to_svg(&self.config.render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wave::generator::{LineId, SimpleRng};
    use crate::wave::scheduler::{AnimationScheduler, FrameOutcome};
    use std::time::{Duration, Instant};

    fn graph() -> WaveGraph {
        let mut graph = WaveGraph::new(WaveGraphConfig::default(), Box::new(SimpleRng::new(8)));
        graph.resize(ViewportSize::new(240.0, 120.0));
        graph
    }

    #[test]
    fn test_tick_grows_scene_until_window_full() {
        let mut graph = graph();
        let window = graph.wave_config().lines_in_window;
        for expected in 1..=window + 3 {
            graph.tick();
            assert_eq!(graph.scene().len(), expected.min(window));
        }
        assert!(!graph.scene().contains(LineId(1)));
    }

    #[test]
    fn test_pointer_lifts_middle_sample() {
        let mut graph = graph();
        graph.set_pointer(Pointer::new(120.0, 60.0));
        graph.tick();
        let first = graph.state().history.latest().unwrap().samples().to_vec();
        assert!(first[6] > graph.wave_config().pointer_perturbation());
        graph.clear_pointer();
        assert_eq!(graph.pointer(), None);
    }

    #[test]
    fn test_resize_repaints_existing_lines() {
        let mut graph = graph();
        graph.tick();
        graph.tick();
        let before = graph.scene().clone();
        graph.resize(ViewportSize::new(480.0, 120.0));
        assert_eq!(graph.scene().len(), before.len());
        assert_ne!(graph.scene(), &before);
    }

    #[test]
    fn test_reset_empties_scene() {
        let mut graph = graph();
        graph.tick();
        graph.reset();
        assert!(graph.scene().is_empty());
        assert_eq!(graph.state().tick, 0);
    }

    #[test]
    fn test_history_freezes_after_scheduler_stops() {
        let mut graph = graph();
        let mut scheduler = AnimationScheduler::new(graph.wave_config().frame_interval());
        scheduler.start();
        let start = Instant::now();

        for i in 0..20 {
            let now = start + Duration::from_millis(i * 16);
            scheduler.on_frame(now, |_| {
                graph.tick();
                Ok(())
            });
        }
        let frozen = graph.state().clone();
        assert!(frozen.tick > 0);

        scheduler.stop();
        for i in 20..40 {
            let now = start + Duration::from_millis(i * 16);
            let outcome = scheduler.on_frame(now, |_| {
                graph.tick();
                Ok(())
            });
            assert_eq!(outcome, FrameOutcome::Stopped);
        }
        assert_eq!(graph.state(), &frozen);
    }
}
