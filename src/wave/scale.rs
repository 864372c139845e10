//! Scale mappers from sample space into viewport pixels.
//!
//! Three mappings drive the drawing: sample index to x, sample value to
//! height, and history position to the waterfall offset. They are cheap to
//! build and are recomputed whenever the viewport changes.

use crate::config::WaveConfig;

/// Default number of ticks used when widening a domain to round bounds.
const NICE_TICK_COUNT: usize = 10;

/// Continuous linear mapping from a domain onto a range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// Creates a linear scale.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Widens the domain so both ends land on round tick boundaries.
    ///
    /// `[0, 33]` becomes `[0, 35]` with the default tick count.
    pub fn nice(mut self) -> Self {
        let (mut start, mut stop) = self.domain;
        let reversed = stop < start;
        if reversed {
            std::mem::swap(&mut start, &mut stop);
        }

        let mut previous_step: Option<f64> = None;
        for _ in 0..10 {
            let step = tick_increment(start, stop, NICE_TICK_COUNT);
            if previous_step == Some(step) {
                break;
            }
            if step > 0.0 {
                start = (start / step).floor() * step;
                stop = (stop / step).ceil() * step;
            } else if step < 0.0 {
                start = (start * step).ceil() / step;
                stop = (stop * step).floor() / step;
            } else {
                break;
            }
            previous_step = Some(step);
        }

        self.domain = if reversed { (stop, start) } else { (start, stop) };
        self
    }

    #[cfg(test)]
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    #[cfg(test)]
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Maps a domain value into the range.
    ///
    /// A collapsed domain maps everything onto the middle of the range.
    pub fn map(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        let t = if span != 0.0 && span.is_finite() {
            (value - d0) / span
        } else if span.is_nan() {
            f64::NAN
        } else {
            0.5
        };
        r0 + t * (r1 - r0)
    }
}

/// Step between round ticks for `count` ticks over `[start, stop]`.
///
/// Positive results are the step itself; negative results encode the
/// inverse of a sub-unit step, which keeps decimal bounds exact.
fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let e10 = 50f64.sqrt();
    let e5 = 10f64.sqrt();
    let e2 = 2f64.sqrt();

    let step = (stop - start) / count.max(1) as f64;
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= e10 {
        10.0
    } else if error >= e5 {
        5.0
    } else if error >= e2 {
        2.0
    } else {
        1.0
    };

    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -10f64.powf(-power) / factor
    }
}

/// Evenly spaced positions for a discrete set of indices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointScale {
    count: usize,
    start: f64,
    step: f64,
}

impl PointScale {
    /// Places `count` points across `range` with no padding and centred alignment.
    pub fn new(count: usize, range: (f64, f64)) -> Self {
        let (r0, r1) = range;
        let step = (r1 - r0) / (count.saturating_sub(1)).max(1) as f64;
        let start = r0 + (r1 - r0 - step * count.saturating_sub(1) as f64) * 0.5;
        Self { count, start, step }
    }

    /// Position for `index`, or `None` when it is outside the domain.
    pub fn map(&self, index: usize) -> Option<f64> {
        (index < self.count).then(|| self.start + self.step * index as f64)
    }
}

/// Viewport size in pixels. Zero before the first layout.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize_extent(width),
            height: sanitize_extent(height),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

fn sanitize_extent(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// The three mappings used to place wave lines in the viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct Scales {
    /// Sample index to x pixel.
    pub x: LinearScale,
    /// Sample value to height above the line baseline.
    pub y: LinearScale,
    /// History position to vertical stagger.
    pub history: PointScale,
}

impl Scales {
    pub fn new(viewport: ViewportSize, config: &WaveConfig) -> Self {
        let last_sample = config.samples_per_line.saturating_sub(1) as f64;
        let x = LinearScale::new((0.0, last_sample), (0.0, viewport.width));
        let y = LinearScale::new(
            (0.0, config.max_line_value),
            (0.0, viewport.height * config.value_height_fraction),
        )
        .nice();
        let history = PointScale::new(config.lines_in_window, (0.0, viewport.height));

        Self { x, y, history }
    }
}

/// Keeps the last computed scales until the viewport changes.
#[derive(Debug, Default)]
pub struct ScaleCache {
    cached: Option<(ViewportSize, Scales)>,
}

impl ScaleCache {
    /// Returns scales for `viewport`, rebuilding them only when the size changed.
    pub fn get(&mut self, viewport: ViewportSize, config: &WaveConfig) -> &Scales {
        if !matches!(&self.cached, Some((size, _)) if *size == viewport) {
            self.cached = None;
        }
        &self
            .cached
            .get_or_insert_with(|| {
                tracing::debug!(
                    "Recomputing scales for {}x{} viewport",
                    viewport.width,
                    viewport.height
                );
                (viewport, Scales::new(viewport, config))
            })
            .1
    }
}
