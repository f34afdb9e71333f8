//! Border scheduler.
//!
//! Shrinks the play area linearly in time. A background task recomputes
//! progress at a fixed cadence and reports it through a callback; the
//! engine turns those reports into diameter updates and milestone
//! broadcasts. Progress is monotonic, clamped to `[0, 1]`, and reaching
//! `1.0` ends the run.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Snapshot of the border for the current match.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BorderState {
    /// Diameter at progress 0.
    pub initial_size: f64,
    /// Diameter at progress 1.
    pub final_size: f64,
    /// Time from initial to final size.
    #[serde(with = "crate::config::schema::duration_format")]
    pub duration: Duration,
    /// Time since the shrink started, as of the last report.
    #[serde(with = "crate::config::schema::duration_format")]
    pub elapsed: Duration,
    /// Last reported progress in `[0, 1]`.
    pub progress: f64,
    /// Set once progress reaches 1.0; never cleared until reset.
    pub final_reached: bool,
    /// Whether the background task is running.
    pub active: bool,
}

impl BorderState {
    /// Diameter at the current progress.
    #[must_use]
    pub fn diameter(&self) -> f64 {
        self.diameter_at(self.progress)
    }

    /// Diameter at an arbitrary progress value.
    #[must_use]
    pub fn diameter_at(&self, progress: f64) -> f64 {
        let progress = progress.clamp(0.0, 1.0);
        (self.final_size - self.initial_size).mul_add(progress, self.initial_size)
    }
}

/// Fraction of `duration` covered by `elapsed`, clamped to `[0, 1]`.
///
/// A zero duration is complete immediately.
#[must_use]
pub fn progress_for(elapsed: Duration, duration: Duration) -> f64 {
    if duration.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0)
}

/// Drives a single border shrink at a time.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct BorderScheduler {
    poll_interval: Duration,
    state: Arc<Mutex<BorderState>>,
    parent: CancellationToken,
    run: Option<CancellationToken>,
}

impl BorderScheduler {
    /// Creates an idle scheduler.
    ///
    /// Runs are children of `parent`; cancelling it stops any shrink.
    #[must_use]
    pub fn new(poll_interval: Duration, parent: CancellationToken) -> Self {
        Self {
            poll_interval: poll_interval.max(Duration::from_millis(1)),
            state: Arc::new(Mutex::new(BorderState::default())),
            parent,
            run: None,
        }
    }

    /// Starts shrinking from `initial_size` to `final_size` over `duration`.
    ///
    /// A shrink already in progress is stopped first. `on_progress` is
    /// called from the background task: first with exactly `0.0` (or
    /// `1.0` for a zero duration), then once per poll interval with
    /// non-decreasing values, and last with `1.0`.
    pub fn start<F>(&mut self, initial_size: f64, final_size: f64, duration: Duration, on_progress: F)
    where
        F: Fn(f64) + Send + Sync + 'static,
    {
        self.stop();

        {
            let mut state = lock(&self.state);
            *state = BorderState {
                initial_size,
                final_size,
                duration,
                elapsed: Duration::ZERO,
                progress: 0.0,
                final_reached: false,
                active: true,
            };
        }

        let token = self.parent.child_token();
        self.run = Some(token.clone());

        let state = Arc::clone(&self.state);
        let poll_interval = self.poll_interval;

        tokio::spawn(async move {
            let started = Instant::now();
            let mut interval = tokio::time::interval(poll_interval);
            let mut first = true;

            loop {
                tokio::select! {
                    () = token.cancelled() => {
                        debug!("border task cancelled");
                        break;
                    }
                    _ = interval.tick() => {
                        let elapsed = started.elapsed();
                        let progress = if first && !duration.is_zero() {
                            0.0
                        } else {
                            progress_for(elapsed, duration)
                        };
                        first = false;

                        let (report, done) = {
                            let mut s = lock(&state);
                            // Runs overlap only if stop raced a tick.
                            if token.is_cancelled() {
                                break;
                            }
                            s.elapsed = elapsed;
                            s.progress = s.progress.max(progress);
                            if s.progress >= 1.0 {
                                s.progress = 1.0;
                                s.final_reached = true;
                                s.active = false;
                            }
                            (s.progress, s.final_reached)
                        };

                        on_progress(report);

                        if done {
                            debug!("border reached final size");
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Stops the running shrink, if any. Idempotent.
    pub fn stop(&mut self) {
        if let Some(token) = self.run.take() {
            token.cancel();
        }
        lock(&self.state).active = false;
    }

    /// Stops and clears state for a new match.
    pub fn reset(&mut self) {
        self.stop();
        *lock(&self.state) = BorderState::default();
    }

    /// Current snapshot.
    #[must_use]
    pub fn state(&self) -> BorderState {
        lock(&self.state).clone()
    }

    /// Whether a shrink is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        lock(&self.state).active
    }
}

impl Drop for BorderScheduler {
    fn drop(&mut self) {
        if let Some(token) = self.run.take() {
            token.cancel();
        }
    }
}

fn lock(state: &Mutex<BorderState>) -> std::sync::MutexGuard<'_, BorderState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<f64>>>, impl Fn(f64) + Send + Sync + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |p| sink.lock().unwrap().push(p))
    }

    #[test]
    fn progress_is_clamped() {
        let d = Duration::from_secs(100);
        assert!((progress_for(Duration::from_secs(50), d) - 0.5).abs() < f64::EPSILON);
        assert!((progress_for(Duration::from_secs(500), d) - 1.0).abs() < f64::EPSILON);
        assert!((progress_for(Duration::ZERO, Duration::ZERO) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn diameter_interpolates() {
        let state = BorderState {
            initial_size: 4000.0,
            final_size: 100.0,
            ..BorderState::default()
        };
        assert!((state.diameter_at(0.0) - 4000.0).abs() < 1e-9);
        assert!((state.diameter_at(0.5) - 2050.0).abs() < 1e-9);
        assert!((state.diameter_at(1.0) - 100.0).abs() < 1e-9);
        assert!((state.diameter_at(2.0) - 100.0).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn first_report_is_zero() {
        let mut border = BorderScheduler::new(Duration::from_secs(1), CancellationToken::new());
        let (seen, cb) = recorder();
        border.start(4000.0, 100.0, Duration::from_secs(1200), cb);

        tokio::time::sleep(Duration::from_millis(10)).await;
        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.first().copied(), Some(0.0));
        border.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn halfway_after_half_the_duration() {
        let mut border = BorderScheduler::new(Duration::from_secs(1), CancellationToken::new());
        let (seen, cb) = recorder();
        border.start(4000.0, 100.0, Duration::from_secs(1200), cb);

        tokio::time::sleep(Duration::from_millis(600_500)).await;
        let seen = seen.lock().unwrap().clone();
        assert!(seen.iter().all(|p| *p <= 0.5), "overshot: {:?}", seen.last());
        assert!((seen.last().copied().unwrap() - 0.5).abs() < f64::EPSILON);

        let state = border.state();
        assert!((state.progress - 0.5).abs() < f64::EPSILON, "progress {}", state.progress);
        assert!((state.diameter() - 2050.0).abs() < 1e-9, "diameter {}", state.diameter());
        assert!(!state.final_reached);
        assert!(state.active);
        border.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn reports_are_monotonic_and_end_at_one() {
        let mut border = BorderScheduler::new(Duration::from_secs(1), CancellationToken::new());
        let (seen, cb) = recorder();
        border.start(1000.0, 10.0, Duration::from_secs(20), cb);

        tokio::time::sleep(Duration::from_secs(30)).await;
        let seen = seen.lock().unwrap().clone();

        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
        assert!(seen.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(seen.last().copied(), Some(1.0));
        assert_eq!(seen.iter().filter(|p| **p >= 1.0).count(), 1);

        let state = border.state();
        assert!(state.final_reached);
        assert!(!state.active);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_duration_completes_immediately() {
        let mut border = BorderScheduler::new(Duration::from_secs(1), CancellationToken::new());
        let (seen, cb) = recorder();
        border.start(500.0, 50.0, Duration::ZERO, cb);

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(*seen.lock().unwrap(), vec![1.0]);
        assert!(border.state().final_reached);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent_and_halts_reports() {
        let mut border = BorderScheduler::new(Duration::from_secs(1), CancellationToken::new());
        let (seen, cb) = recorder();
        border.start(1000.0, 10.0, Duration::from_secs(100), cb);

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        border.stop();
        border.stop();
        let count = seen.lock().unwrap().len();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(seen.lock().unwrap().len(), count);
        assert!(!border.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_replaces_running_shrink() {
        let mut border = BorderScheduler::new(Duration::from_secs(1), CancellationToken::new());
        let (first, cb1) = recorder();
        border.start(1000.0, 10.0, Duration::from_secs(100), cb1);
        tokio::time::sleep(Duration::from_millis(3_500)).await;

        let (second, cb2) = recorder();
        border.start(2000.0, 20.0, Duration::from_secs(100), cb2);
        let frozen = first.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(3_500)).await;

        assert_eq!(first.lock().unwrap().len(), frozen);
        assert_eq!(second.lock().unwrap().first().copied(), Some(0.0));
        assert!((border.state().initial_size - 2000.0).abs() < f64::EPSILON);
        border.reset();
        assert_eq!(border.state(), BorderState::default());
    }

    #[tokio::test(start_paused = true)]
    async fn parent_cancellation_stops_shrink() {
        let parent = CancellationToken::new();
        let mut border = BorderScheduler::new(Duration::from_secs(1), parent.clone());
        let (seen, cb) = recorder();
        border.start(1000.0, 10.0, Duration::from_secs(100), cb);
        tokio::time::sleep(Duration::from_millis(2_500)).await;

        parent.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let count = seen.lock().unwrap().len();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(seen.lock().unwrap().len(), count);
    }
}
