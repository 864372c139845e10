//! Fixed-rate tick scheduling on top of a faster display loop.
//!
//! The display loop calls [`AnimationScheduler::on_frame`] as often as it repaints. The
//! scheduler only runs the tick callback when the target interval has elapsed, and it
//! contains any failure inside the callback so one bad tick never ends the animation.

use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Decides which display frames become logical ticks.
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: Duration,
    last_tick: Option<Instant>,
}

impl FrameThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_tick: None,
        }
    }

    /// Returns the time since the last tick when a tick is due.
    ///
    /// The first frame only records its timestamp.
    pub fn poll(&mut self, now: Instant) -> Option<Duration> {
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return None;
        };
        let elapsed = now.saturating_duration_since(last);
        if elapsed > self.interval {
            self.last_tick = Some(now);
            Some(elapsed)
        } else {
            None
        }
    }

    pub fn reset(&mut self) {
        self.last_tick = None;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Sends panic messages to the log instead of stderr while alive.
///
/// Contained tick panics would otherwise print over a raw-mode terminal. Dropping the
/// guard puts the default hook back.
pub struct PanicLogGuard {
    _private: (),
}

impl PanicLogGuard {
    pub fn install() -> Self {
        panic::set_hook(Box::new(|info| {
            tracing::error!("Panic: {info}");
        }));
        Self { _private: () }
    }
}

impl Drop for PanicLogGuard {
    fn drop(&mut self) {
        // replaces the logging hook with the default one
        drop(panic::take_hook());
    }
}

/// What happened to one display frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Scheduler is not registered; nothing ran.
    Stopped,
    /// Too soon after the previous tick.
    Throttled,
    /// The tick callback ran and succeeded.
    Ticked,
    /// The tick callback failed; the failure was logged and dropped.
    Failed,
}

/// Registers a tick callback against the display loop.
#[derive(Debug)]
pub struct AnimationScheduler {
    throttle: FrameThrottle,
    running: bool,
    ticks: u64,
    failures: u64,
}

impl AnimationScheduler {
    /// Creates a stopped scheduler ticking at most once per `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            throttle: FrameThrottle::new(interval),
            running: false,
            ticks: 0,
            failures: 0,
        }
    }

    /// Starts ticking. Calling it on a running scheduler does nothing.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.throttle.reset();
        self.running = true;
        tracing::debug!(
            "Animation scheduler started ({:?} per tick)",
            self.throttle.interval()
        );
    }

    /// Stops ticking. No callback runs until the next `start`.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        tracing::debug!("Animation scheduler stopped after {} ticks", self.ticks);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Ticks that completed successfully.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Feeds one display frame to the scheduler.
    ///
    /// `tick` receives the time since the previous tick. Errors and panics raised by it are
    /// logged and discarded.
    pub fn on_frame<F>(&mut self, now: Instant, tick: F) -> FrameOutcome
    where
        F: FnOnce(Duration) -> anyhow::Result<()>,
    {
        if !self.running {
            return FrameOutcome::Stopped;
        }
        let Some(elapsed) = self.throttle.poll(now) else {
            return FrameOutcome::Throttled;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| tick(elapsed))) {
            Ok(Ok(())) => {
                self.ticks += 1;
                FrameOutcome::Ticked
            }
            Ok(Err(e)) => {
                self.failures += 1;
                tracing::warn!("Tick failed, keeping previous state: {e:#}");
                FrameOutcome::Failed
            }
            Err(payload) => {
                self.failures += 1;
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!("Tick panicked, keeping previous state: {message}");
                FrameOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    const INTERVAL: Duration = Duration::from_millis(31);

    fn frames(start: Instant, count: u64, spacing_ms: u64) -> impl Iterator<Item = Instant> {
        (0..count).map(move |i| start + Duration::from_millis(i * spacing_ms))
    }

    #[test]
    fn test_first_frame_only_primes() {
        let mut throttle = FrameThrottle::new(INTERVAL);
        let now = Instant::now();
        assert_eq!(throttle.poll(now), None);
        assert_eq!(throttle.poll(now + Duration::from_millis(10)), None);
        assert_eq!(
            throttle.poll(now + Duration::from_millis(40)),
            Some(Duration::from_millis(40))
        );
    }

    #[test]
    fn test_display_rate_is_throttled_to_tick_rate() {
        let mut scheduler = AnimationScheduler::new(INTERVAL);
        scheduler.start();
        let start = Instant::now();
        let mut ticks = 0;
        // one second of 60 Hz frames
        for now in frames(start, 60, 16) {
            if scheduler.on_frame(now, |_| Ok(())) == FrameOutcome::Ticked {
                ticks += 1;
            }
        }
        assert!(ticks > 0 && ticks < 60, "{ticks}");
        assert_eq!(scheduler.ticks(), ticks);
    }

    #[test]
    fn test_stopped_scheduler_never_ticks() {
        let mut scheduler = AnimationScheduler::new(INTERVAL);
        let start = Instant::now();
        let mut counter = 0;
        scheduler.start();
        for now in frames(start, 10, 40) {
            scheduler.on_frame(now, |_| {
                counter += 1;
                Ok(())
            });
        }
        let before = counter;
        assert!(before > 0);

        scheduler.stop();
        for now in frames(start + Duration::from_secs(1), 10, 40) {
            assert_eq!(
                scheduler.on_frame(now, |_| {
                    counter += 1;
                    Ok(())
                }),
                FrameOutcome::Stopped
            );
        }
        assert_eq!(counter, before);
    }

    #[test]
    fn test_restart_is_idempotent() {
        let mut scheduler = AnimationScheduler::new(INTERVAL);
        scheduler.start();
        scheduler.start();
        assert!(scheduler.is_running());
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_running());

        scheduler.start();
        let now = Instant::now();
        // restart primes again instead of firing on a stale timestamp
        assert_eq!(scheduler.on_frame(now, |_| Ok(())), FrameOutcome::Throttled);
        assert_eq!(
            scheduler.on_frame(now + Duration::from_millis(50), |_| Ok(())),
            FrameOutcome::Ticked
        );
    }

    /// Collects formatted log output for assertions.
    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tick_panic_goes_to_log() {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let _guard = PanicLogGuard::install();
            let mut scheduler = AnimationScheduler::new(INTERVAL);
            scheduler.start();
            let now = Instant::now();
            scheduler.on_frame(now, |_| Ok(()));
            let outcome =
                scheduler.on_frame(now + Duration::from_millis(40), |_| panic!("tick exploded"));
            assert_eq!(outcome, FrameOutcome::Failed);
        });

        let logged = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(logged.contains("Panic: "), "{logged}");
        assert!(logged.contains("tick exploded"), "{logged}");
    }

    #[test]
    fn test_errors_and_panics_are_contained() {
        let mut scheduler = AnimationScheduler::new(INTERVAL);
        scheduler.start();
        let now = Instant::now();
        scheduler.on_frame(now, |_| Ok(()));

        let outcome = scheduler.on_frame(now + Duration::from_millis(40), |_| {
            Err(anyhow::anyhow!("bad tick"))
        });
        assert_eq!(outcome, FrameOutcome::Failed);

        let outcome = scheduler.on_frame(now + Duration::from_millis(80), |_| panic!("boom"));
        assert_eq!(outcome, FrameOutcome::Failed);

        let outcome = scheduler.on_frame(now + Duration::from_millis(120), |_| Ok(()));
        assert_eq!(outcome, FrameOutcome::Ticked);
        assert_eq!(scheduler.failures(), 2);
        assert!(scheduler.is_running());
    }
}
