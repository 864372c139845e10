//! Paints a wave scene onto a ratatui canvas.
//!
//! Scene coordinates grow downwards from the top-left corner, canvas coordinates grow
//! upwards from the bottom-left, so every y is flipped against the viewport height.

use ratatui::style::Color;
use ratatui::widgets::canvas::{Context, Line as CanvasLine};

use crate::config::{HexColor, RenderConfig};
use crate::wave::{Scene, ViewportSize};

/// Straight pieces used per curve segment when flattening outlines.
const CURVE_STEPS: usize = 8;

pub fn to_color(color: HexColor) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// Outline of one shape in absolute scene coordinates.
struct PlacedOutline {
    polylines: Vec<Vec<(f64, f64)>>,
    offset: f64,
}

impl PlacedOutline {
    fn points(&self) -> impl Iterator<Item = &[(f64, f64)]> {
        self.polylines.iter().map(|p| p.as_slice())
    }
}

/// Draws fills first and outlines on a second layer, oldest line first so the newest
/// wave ends up in front.
pub fn paint_scene(ctx: &mut Context, scene: &Scene, style: &RenderConfig) {
    let viewport = scene.viewport();
    if viewport.is_empty() || scene.is_empty() {
        return;
    }

    let fill = to_color(style.fill.blend_over(style.background, style.fill_opacity));
    let stroke = to_color(style.stroke);

    let placed: Vec<PlacedOutline> = scene
        .shapes()
        .iter()
        .rev()
        .map(|shape| PlacedOutline {
            polylines: shape.outline.flatten(CURVE_STEPS),
            offset: shape.offset,
        })
        .collect();

    for outline in &placed {
        for polyline in outline.points() {
            paint_fill(ctx, polyline, outline.offset, viewport, fill);
        }
    }

    ctx.layer();

    for outline in &placed {
        for polyline in outline.points() {
            for pair in polyline.windows(2) {
                let (x1, y1) = pair[0];
                let (x2, y2) = pair[1];
                ctx.draw(&CanvasLine {
                    x1,
                    y1: flip(y1 + outline.offset, viewport),
                    x2,
                    y2: flip(y2 + outline.offset, viewport),
                    color: stroke,
                });
            }
        }
    }
}

/// Vertical strokes from the line baseline up to the curve, one per canvas column.
fn paint_fill(
    ctx: &mut Context,
    polyline: &[(f64, f64)],
    offset: f64,
    viewport: ViewportSize,
    color: Color,
) {
    let (Some(&(start, _)), Some(&(end, _))) = (polyline.first(), polyline.last()) else {
        return;
    };
    let mut x = start.max(0.0).ceil();
    let end = end.min(viewport.width);
    while x <= end {
        if let Some(y) = interpolate(polyline, x) {
            ctx.draw(&CanvasLine {
                x1: x,
                y1: flip(offset, viewport),
                x2: x,
                y2: flip(y + offset, viewport),
                color,
            });
        }
        x += 1.0;
    }
}

/// Linear interpolation of the polyline's y at `x`.
///
/// Expects points ordered by x, which holds for wave outlines.
pub fn interpolate(polyline: &[(f64, f64)], x: f64) -> Option<f64> {
    polyline.windows(2).find_map(|pair| {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if x < x0.min(x1) || x > x0.max(x1) {
            return None;
        }
        if (x1 - x0).abs() < f64::EPSILON {
            return Some(y0.min(y1));
        }
        Some(y0 + (x - x0) / (x1 - x0) * (y1 - y0))
    })
}

fn flip(y: f64, viewport: ViewportSize) -> f64 {
    viewport.height - y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_between_points() {
        let polyline = [(0.0, 0.0), (10.0, -10.0), (20.0, 0.0)];
        assert_eq!(interpolate(&polyline, 5.0), Some(-5.0));
        assert_eq!(interpolate(&polyline, 15.0), Some(-5.0));
        assert_eq!(interpolate(&polyline, 25.0), None);
    }

    #[test]
    fn test_flip_turns_top_into_canvas_top() {
        let viewport = ViewportSize::new(100.0, 40.0);
        assert_eq!(flip(0.0, viewport), 40.0);
        assert_eq!(flip(40.0, viewport), 0.0);
    }

    #[test]
    fn test_to_color() {
        assert_eq!(to_color(HexColor::new(1, 2, 3)), Color::Rgb(1, 2, 3));
    }
}
