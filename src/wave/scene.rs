//! Scene reconciliation and SVG output.
//!
//! The renderer keeps one shape per visible line, keyed by [`LineId`]. Each render pass
//! diffs the shape set against the current history: shapes for evicted lines leave the
//! scene, new lines enter, and survivors are rebuilt because their window position moved.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use crate::config::RenderConfig;
use crate::wave::curve::{basis_area, basis_line, Path};
use crate::wave::generator::{LineId, WaveHistory};
use crate::wave::scale::{Scales, ViewportSize};

/// Drawable form of one history line.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveShape {
    pub id: LineId,
    /// Position in the window, 0 = newest.
    pub index: usize,
    /// Vertical translation applied to both paths.
    pub offset: f64,
    /// Filled region under the curve, in line-local coordinates.
    pub area: Path,
    /// Stroked curve, in line-local coordinates.
    pub outline: Path,
}

/// Shapes ordered newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    viewport: ViewportSize,
    shapes: Vec<WaveShape>,
}

/// Changes applied by one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneDiff {
    pub entered: Vec<LineId>,
    pub updated: Vec<LineId>,
    pub exited: Vec<LineId>,
}

impl SceneDiff {
    /// True when no shape was added or removed.
    pub fn is_stable(&self) -> bool {
        self.entered.is_empty() && self.exited.is_empty()
    }
}

impl Scene {
    pub fn shapes(&self) -> &[WaveShape] {
        &self.shapes
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, id: LineId) -> bool {
        self.shapes.iter().any(|shape| shape.id == id)
    }

    /// Serializes the scene as a standalone SVG document.
    pub fn to_svg(&self, style: &RenderConfig) -> String {
        let width = self.viewport.width;
        let height = self.viewport.height;
        let mut svg = String::new();

        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
        );
        let _ = writeln!(
            svg,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            style.background
        );
        let _ = writeln!(svg, r#"  <g class="waves">"#);
        for shape in &self.shapes {
            let _ = writeln!(
                svg,
                r#"    <g class="wave" data-line="{}" transform="translate(0,{})">"#,
                shape.id.0, shape.offset
            );
            let _ = writeln!(
                svg,
                r#"      <path fill="{}" fill-opacity="{}" d="{}"/>"#,
                style.fill,
                style.fill_opacity,
                shape.area.to_svg_d()
            );
            let _ = writeln!(
                svg,
                r#"      <path fill="none" stroke="{}" stroke-width="{}" d="{}"/>"#,
                style.stroke,
                style.stroke_width,
                shape.outline.to_svg_d()
            );
            let _ = writeln!(svg, "    </g>");
        }
        let _ = writeln!(svg, "  </g>");
        svg.push_str("</svg>\n");
        svg
    }
}

/// Keeps the scene in step with the wave history.
#[derive(Debug, Default)]
pub struct SceneRenderer {
    scene: Scene,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Rebuilds the scene for `history` and reports what changed.
    ///
    /// Calling this again with the same history and scales leaves the scene unchanged.
    pub fn render(
        &mut self,
        history: &WaveHistory,
        scales: &Scales,
        viewport: ViewportSize,
    ) -> SceneDiff {
        let previous: HashMap<LineId, usize> = self
            .scene
            .shapes
            .iter()
            .map(|shape| (shape.id, shape.index))
            .collect();
        let live: HashSet<LineId> = history.iter().map(|line| line.id()).collect();

        let mut diff = SceneDiff {
            exited: self
                .scene
                .shapes
                .iter()
                .map(|shape| shape.id)
                .filter(|id| !live.contains(id))
                .collect(),
            ..SceneDiff::default()
        };

        let baseline = viewport.height + 1.0;
        let shapes: Vec<WaveShape> = history
            .iter()
            .enumerate()
            .map(|(index, line)| {
                if previous.contains_key(&line.id()) {
                    diff.updated.push(line.id());
                } else {
                    diff.entered.push(line.id());
                }

                let points: Vec<(f64, f64)> = line
                    .samples()
                    .iter()
                    .enumerate()
                    .map(|(i, &sample)| (scales.x.map(i as f64), -scales.y.map(sample)))
                    .collect();
                let stagger = scales.history.map(index).unwrap_or(viewport.height);

                WaveShape {
                    id: line.id(),
                    index,
                    offset: baseline - stagger,
                    area: basis_area(&points, 0.0),
                    outline: basis_line(&points),
                }
            })
            .collect();

        if !diff.is_stable() {
            tracing::trace!(
                "Scene reconciled: +{} ~{} -{}",
                diff.entered.len(),
                diff.updated.len(),
                diff.exited.len()
            );
        }

        self.scene = Scene { viewport, shapes };
        diff
    }

    /// Removes every shape.
    pub fn clear(&mut self) {
        self.scene.shapes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaveConfig;
    use crate::wave::generator::{SimpleRng, WaveState};

    fn setup(ticks: usize) -> (WaveConfig, WaveState, Scales, ViewportSize) {
        let config = WaveConfig::default();
        let viewport = ViewportSize::new(240.0, 120.0);
        let scales = Scales::new(viewport, &config);
        let mut rng = SimpleRng::new(11);
        let mut state = WaveState::default();
        for _ in 0..ticks {
            state = state.advance(None, viewport.width, &config, &mut rng);
        }
        (config, state, scales, viewport)
    }

    #[test]
    fn test_empty_history_renders_nothing() {
        let (_, state, scales, viewport) = setup(0);
        let mut renderer = SceneRenderer::new();
        let diff = renderer.render(&state.history, &scales, viewport);
        assert!(renderer.scene().is_empty());
        assert_eq!(diff, SceneDiff::default());
    }

    #[test]
    fn test_one_shape_per_line_with_both_paths() {
        let (_, state, scales, viewport) = setup(5);
        let mut renderer = SceneRenderer::new();
        let diff = renderer.render(&state.history, &scales, viewport);
        assert_eq!(renderer.scene().len(), 5);
        assert_eq!(diff.entered.len(), 5);
        for (index, shape) in renderer.scene().shapes().iter().enumerate() {
            assert_eq!(shape.index, index);
            assert!(!shape.area.is_empty());
            assert!(!shape.outline.is_empty());
        }
    }

    #[test]
    fn test_redraw_is_idempotent() {
        let (_, state, scales, viewport) = setup(12);
        let mut renderer = SceneRenderer::new();
        renderer.render(&state.history, &scales, viewport);
        let first = renderer.scene().clone();
        let diff = renderer.render(&state.history, &scales, viewport);
        assert_eq!(renderer.scene(), &first);
        assert!(diff.is_stable());
        assert_eq!(diff.updated.len(), first.len());
    }

    #[test]
    fn test_evicted_lines_leave_the_scene() {
        let (config, mut state, scales, viewport) = setup(0);
        let mut renderer = SceneRenderer::new();
        let mut rng = SimpleRng::new(2);
        let k = 2;
        for _ in 0..config.lines_in_window + k {
            state = state.advance(None, viewport.width, &config, &mut rng);
            renderer.render(&state.history, &scales, viewport);
        }
        let scene = renderer.scene();
        assert_eq!(scene.len(), config.lines_in_window);
        for tick in 1..=k as u64 {
            assert!(!scene.contains(LineId(tick)));
        }
        assert!(scene.contains(LineId(k as u64 + 1)));
        assert_eq!(
            scene.shapes().last().map(|shape| shape.id),
            Some(LineId(k as u64 + 1))
        );
    }

    #[test]
    fn test_diff_reports_entered_and_exited() {
        let (config, state, scales, viewport) = setup(8);
        let mut renderer = SceneRenderer::new();
        renderer.render(&state.history, &scales, viewport);
        let next = state.advance(None, viewport.width, &config, &mut SimpleRng::new(4));
        let diff = renderer.render(&next.history, &scales, viewport);
        assert_eq!(diff.entered, vec![LineId(9)]);
        assert_eq!(diff.exited, vec![LineId(1)]);
        assert_eq!(diff.updated.len(), 7);
    }

    #[test]
    fn test_older_lines_sit_higher() {
        let (_, state, scales, viewport) = setup(8);
        let mut renderer = SceneRenderer::new();
        renderer.render(&state.history, &scales, viewport);
        let offsets: Vec<f64> = renderer
            .scene()
            .shapes()
            .iter()
            .map(|shape| shape.offset)
            .collect();
        assert_eq!(offsets[0], viewport.height + 1.0);
        assert!(offsets.windows(2).all(|pair| pair[1] < pair[0]));
    }

    #[test]
    fn test_svg_has_group_per_line() {
        let (_, state, scales, viewport) = setup(3);
        let mut renderer = SceneRenderer::new();
        renderer.render(&state.history, &scales, viewport);
        let svg = renderer.scene().to_svg(&RenderConfig::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="240" height="120""#));
        assert_eq!(svg.matches(r#"class="wave""#).count(), 3);
        assert_eq!(svg.matches("<path").count(), 6);
        assert_eq!(svg.matches(r#"fill="none""#).count(), 3);
        assert!(svg.contains(r##"fill="#00dd00" fill-opacity="0.1""##));
        assert!(!svg.contains("NaN"));
    }

    #[test]
    fn test_zero_viewport_is_legal() {
        let config = WaveConfig::default();
        let viewport = ViewportSize::default();
        let scales = Scales::new(viewport, &config);
        let (_, state, _, _) = setup(3);
        let mut renderer = SceneRenderer::new();
        renderer.render(&state.history, &scales, viewport);
        assert_eq!(renderer.scene().len(), 3);
        let svg = renderer.scene().to_svg(&RenderConfig::default());
        assert!(!svg.contains("NaN"));
    }
}
