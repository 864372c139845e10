//! Random-walk wave generation.
//!
//! Every tick produces one new line from the previous one and pushes it onto a bounded
//! history. State transitions are pure: `advance` takes a snapshot and returns the next one,
//! so the only source of variation is the injected [`RandomSource`].

use std::collections::VecDeque;
use std::sync::Arc;

use crate::config::{WaveConfig, WindowMode};

/// Source of uniformly distributed numbers in `[0, 1)`.
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

/// Small seedable xorshift64* generator.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    pub fn new(seed: u64) -> Self {
        // xorshift never leaves the all-zero state
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    /// Seeds from the system clock.
    pub fn from_clock() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(nanos)
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }
}

impl RandomSource for SimpleRng {
    fn next_unit(&mut self) -> f64 {
        // top 53 bits fill the f64 mantissa exactly
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Pointer position in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
}

impl Pointer {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Identity of a line: the 1-based tick that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LineId(pub u64);

/// One frame of the waveform. Immutable once generated.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    id: LineId,
    samples: Arc<[f64]>,
}

impl Line {
    pub fn new(id: LineId, samples: Vec<f64>) -> Self {
        Self {
            id,
            samples: samples.into(),
        }
    }

    pub fn id(&self) -> LineId {
        self.id
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }
}

/// Lines ordered newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveHistory {
    lines: VecDeque<Line>,
}

impl WaveHistory {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Most recent line.
    pub fn latest(&self) -> Option<&Line> {
        self.lines.front()
    }

    /// Oldest line still in the window.
    #[cfg(test)]
    pub fn oldest(&self) -> Option<&Line> {
        self.lines.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter()
    }

    fn push_latest(&mut self, line: Line) {
        self.lines.push_front(line);
    }

    fn truncate(&mut self, len: usize) {
        self.lines.truncate(len);
    }
}

impl FromIterator<Line> for WaveHistory {
    /// Collects lines given newest first.
    fn from_iter<I: IntoIterator<Item = Line>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

/// Snapshot of the generator between ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveState {
    pub history: WaveHistory,
    /// Ticks processed so far.
    pub tick: u64,
    /// Ticks since the last truncation in reset mode.
    pub steps_since_reset: usize,
}

impl WaveState {
    /// Produces the state after one more tick.
    ///
    /// `viewport_width` is only used to locate the sample under the pointer; a zero or
    /// non-finite width disables the pointer effect.
    pub fn advance<R: RandomSource + ?Sized>(
        &self,
        pointer: Option<Pointer>,
        viewport_width: f64,
        config: &WaveConfig,
        rng: &mut R,
    ) -> WaveState {
        let tick = self.tick + 1;
        let mut history = self.history.clone();
        let mut steps_since_reset = self.steps_since_reset;

        let produce = match config.window_mode {
            WindowMode::Slide => true,
            WindowMode::Reset => {
                if steps_since_reset > config.reset_after_steps() {
                    history.truncate(config.lines_in_window.saturating_sub(1));
                    steps_since_reset = 0;
                }
                history.len() < config.lines_in_window
            }
        };

        if produce {
            let affected = affected_sample(pointer, viewport_width, config.samples_per_line);
            let samples = next_samples(history.latest(), affected, config, rng);
            history.push_latest(Line::new(LineId(tick), samples));
            history.truncate(config.lines_in_window);
        }

        WaveState {
            history,
            tick,
            steps_since_reset: steps_since_reset + 1,
        }
    }
}

/// Index of the sample under the pointer, if any.
pub fn affected_sample(
    pointer: Option<Pointer>,
    viewport_width: f64,
    samples_per_line: usize,
) -> Option<usize> {
    let pointer = pointer?;
    if !(viewport_width.is_finite() && viewport_width > 0.0) {
        return None;
    }
    let position = (pointer.x / viewport_width * samples_per_line as f64).floor();
    if !position.is_finite() || position < 0.0 {
        return None;
    }
    let index = position as usize;
    (index < samples_per_line).then_some(index)
}

fn next_samples<R: RandomSource + ?Sized>(
    previous: Option<&Line>,
    affected: Option<usize>,
    config: &WaveConfig,
    rng: &mut R,
) -> Vec<f64> {
    let max = config.max_line_value;
    let perturbation = config.pointer_perturbation();

    (0..config.samples_per_line)
        .map(|i| {
            let lift = if affected == Some(i) { perturbation } else { 0.0 };
            match previous.and_then(|line| line.samples().get(i)) {
                None => fresh_sample(rng.next_unit(), max) + lift,
                Some(&prev) => walked_sample(prev, rng.next_unit(), max, lift),
            }
        })
        .collect()
}

/// First-line sample: an integer in `(0, max]`.
fn fresh_sample(unit: f64, max: f64) -> f64 {
    (unit * max).ceil().max(1.0).min(max)
}

/// Random walk from `prev`, clamped so it never drops below `max`.
///
/// The clamp makes `max` a floor even though the value scale treats it as a ceiling,
/// which flattens the tops of the waves. Kept as is for visual compatibility.
fn walked_sample(prev: f64, unit: f64, max: f64, lift: f64) -> f64 {
    let step = (unit * max / 2.0).ceil();
    let walked = (prev + step).abs() - max / 3.0 + lift;
    walked.max(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed list of values, cycling when exhausted.
    struct Sequence {
        values: Vec<f64>,
        pos: usize,
    }

    impl Sequence {
        fn new(values: &[f64]) -> Self {
            Self {
                values: values.to_vec(),
                pos: 0,
            }
        }
    }

    impl RandomSource for Sequence {
        fn next_unit(&mut self) -> f64 {
            let value = self.values[self.pos % self.values.len()];
            self.pos += 1;
            value
        }
    }

    fn run(config: &WaveConfig, ticks: usize, rng: &mut impl RandomSource) -> WaveState {
        let mut state = WaveState::default();
        for _ in 0..ticks {
            state = state.advance(None, 120.0, config, rng);
        }
        state
    }

    fn flat_state(value: f64, config: &WaveConfig) -> WaveState {
        WaveState {
            history: std::iter::once(Line::new(
                LineId(1),
                vec![value; config.samples_per_line],
            ))
            .collect(),
            tick: 1,
            steps_since_reset: 1,
        }
    }

    #[test]
    fn test_history_stays_bounded() {
        let config = WaveConfig::default();
        let mut rng = SimpleRng::new(7);
        let mut state = WaveState::default();
        for _ in 0..50 {
            state = state.advance(None, 120.0, &config, &mut rng);
            assert!(state.history.len() <= config.lines_in_window);
            for line in state.history.iter() {
                assert_eq!(line.samples().len(), config.samples_per_line);
            }
        }
    }

    #[test]
    fn test_first_line_within_bounds() {
        let config = WaveConfig::default();
        let mut rng = Sequence::new(&[0.0, 0.001, 0.5, 0.999_999]);
        let state = WaveState::default().advance(None, 120.0, &config, &mut rng);
        let line = state.history.latest().unwrap();
        for &sample in line.samples() {
            assert!(sample > 0.0 && sample <= config.max_line_value, "{sample}");
        }
    }

    #[test]
    fn test_walked_samples_respect_floor() {
        let config = WaveConfig::default();
        let mut rng = SimpleRng::new(42);
        let state = run(&config, 30, &mut rng);
        for line in state.history.iter().filter(|line| line.id() != LineId(1)) {
            for &sample in line.samples() {
                assert!(sample >= config.max_line_value, "{sample}");
            }
        }
    }

    #[test]
    fn test_walk_formula() {
        // prev 40, unit 0.5: step ceil(8.25) = 9, 49 - 11 = 38
        assert_eq!(walked_sample(40.0, 0.5, 33.0, 0.0), 38.0);
        // falls below the floor and is clamped back up
        assert_eq!(walked_sample(33.0, 0.01, 33.0, 0.0), 33.0);
    }

    #[test]
    fn test_sliding_window_evicts_oldest() {
        let config = WaveConfig::default();
        let k = 3;
        let mut rng = SimpleRng::new(1);
        let state = run(&config, config.lines_in_window + k, &mut rng);
        assert_eq!(state.history.len(), config.lines_in_window);
        assert_eq!(state.history.oldest().unwrap().id(), LineId(k as u64 + 1));
        assert_eq!(
            state.history.latest().unwrap().id(),
            LineId((config.lines_in_window + k) as u64)
        );
    }

    #[test]
    fn test_pointer_at_half_width_hits_middle_sample() {
        let config = WaveConfig::default();
        let width = 240.0;
        let pointer = Some(Pointer::new(width / 2.0, 10.0));
        assert_eq!(affected_sample(pointer, width, 12), Some(6));

        let previous = flat_state(100.0, &config);
        let plain = previous.advance(None, width, &config, &mut Sequence::new(&[0.25]));
        let lifted = previous.advance(pointer, width, &config, &mut Sequence::new(&[0.25]));

        let plain = plain.history.latest().unwrap().samples().to_vec();
        let lifted = lifted.history.latest().unwrap().samples().to_vec();
        assert_eq!(lifted[6] - plain[6], config.pointer_perturbation());
        for i in (0..12).filter(|&i| i != 6) {
            assert_eq!(lifted[i], plain[i]);
        }
    }

    #[test]
    fn test_pointer_ignored_without_width() {
        let pointer = Some(Pointer::new(50.0, 0.0));
        assert_eq!(affected_sample(pointer, 0.0, 12), None);
        assert_eq!(affected_sample(pointer, f64::NAN, 12), None);
        assert_eq!(affected_sample(Some(Pointer::new(f64::NAN, 0.0)), 100.0, 12), None);
        assert_eq!(affected_sample(Some(Pointer::new(-1.0, 0.0)), 100.0, 12), None);
        assert_eq!(affected_sample(Some(Pointer::new(100.0, 0.0)), 100.0, 12), None);
        assert_eq!(affected_sample(None, 100.0, 12), None);
    }

    #[test]
    fn test_zero_width_pointer_never_produces_nan() {
        let config = WaveConfig::default();
        let mut rng = SimpleRng::new(9);
        let mut state = WaveState::default();
        for _ in 0..5 {
            state = state.advance(Some(Pointer::new(3.0, 3.0)), 0.0, &config, &mut rng);
        }
        assert!(state
            .history
            .iter()
            .all(|line| line.samples().iter().all(|s| s.is_finite())));
    }

    #[test]
    fn test_same_seed_same_lines() {
        let config = WaveConfig::default();
        let previous = flat_state(50.0, &config);
        let a = previous.advance(None, 120.0, &config, &mut SimpleRng::new(1234));
        let b = previous.advance(None, 120.0, &config, &mut SimpleRng::new(1234));
        assert_eq!(a, b);
    }

    #[test]
    fn test_advance_leaves_input_untouched() {
        let config = WaveConfig::default();
        let previous = flat_state(50.0, &config);
        let before = previous.clone();
        let _ = previous.advance(None, 120.0, &config, &mut SimpleRng::new(5));
        assert_eq!(previous, before);
    }

    #[test]
    fn test_reset_mode_truncates_periodically() {
        let config = WaveConfig {
            lines_in_window: 4,
            window_mode: WindowMode::Reset,
            reset_interval: 2,
            ..WaveConfig::default()
        };
        let mut rng = SimpleRng::new(3);
        let mut state = WaveState::default();
        let mut lengths = Vec::new();
        for _ in 0..8 {
            state = state.advance(None, 120.0, &config, &mut rng);
            lengths.push(state.history.len());
        }
        assert_eq!(lengths, vec![1, 2, 3, 4, 4, 4, 4, 4]);

        // the full window freezes until more than ceil(4 / 2) steps pass, then the
        // oldest line is dropped to make room for tick 7
        let ids: Vec<u64> = state.history.iter().map(|line| line.id().0).collect();
        assert_eq!(ids, vec![7, 4, 3, 2]);
        assert_eq!(state.tick, 8);
    }

    #[test]
    fn test_simple_rng_unit_range() {
        let mut rng = SimpleRng::new(0);
        for _ in 0..1000 {
            let value = rng.next_unit();
            assert!((0.0..1.0).contains(&value));
        }
    }
}
