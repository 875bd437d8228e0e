use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use log::debug;

/// Wall-clock recorder for named actions within one run.
#[derive(Debug)]
pub struct Timer {
    origin: Instant,
    running: HashMap<String, Instant>,
    recorded: HashMap<String, Vec<Duration>>,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            running: HashMap::new(),
            recorded: HashMap::new(),
        }
    }

    /// Starts timing `action`, restarting it if it was already running.
    pub fn start(&mut self, action: &str) {
        self.running.insert(action.to_string(), Instant::now());
    }

    /// Stops timing `action` and records the interval.
    ///
    /// # Returns
    /// The recorded duration, or `None` if `action` was never started.
    pub fn stop(&mut self, action: &str) -> Option<Duration> {
        let Some(started) = self.running.remove(action) else {
            debug!(action = action; "timer stopped for an action that was not running");
            return None;
        };

        let elapsed = started.elapsed();
        self.record(action, elapsed);
        Some(elapsed)
    }

    /// Runs `f` and records how long it took under `action`.
    pub fn time<T>(&mut self, action: &str, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let out = f();
        self.record(action, started.elapsed());
        out
    }

    /// Every recorded interval, keyed by action name, in recording order.
    pub fn recorded_durations(&self) -> &HashMap<String, Vec<Duration>> {
        &self.recorded
    }

    /// Sum of every interval recorded under `action`.
    pub fn total(&self, action: &str) -> Duration {
        self.recorded
            .get(action)
            .map(|durations| durations.iter().sum())
            .unwrap_or_default()
    }

    /// Time since the timer was created or last reset.
    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    /// Drops every recording and running interval.
    pub fn reset(&mut self) {
        self.origin = Instant::now();
        self.running.clear();
        self.recorded.clear();
    }

    fn record(&mut self, action: &str, elapsed: Duration) {
        self.recorded
            .entry(action.to_string())
            .or_default()
            .push(elapsed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_without_start_records_nothing() {
        let mut timer = Timer::new();
        assert_eq!(timer.stop("train_step"), None);
        assert!(timer.recorded_durations().is_empty());
    }

    #[test]
    fn start_stop_and_time_accumulate() {
        let mut timer = Timer::new();

        timer.start("train_step");
        let first = timer.stop("train_step").unwrap();
        let value = timer.time("train_step", || 7);

        assert_eq!(value, 7);
        assert_eq!(timer.recorded_durations()["train_step"].len(), 2);
        assert!(timer.total("train_step") >= first);
        assert_eq!(timer.total("eval_step"), Duration::ZERO);
    }

    #[test]
    fn reset_clears_running_and_recorded() {
        let mut timer = Timer::new();
        timer.start("a");
        timer.time("b", || ());
        timer.reset();

        assert!(timer.recorded_durations().is_empty());
        assert_eq!(timer.stop("a"), None);
    }
}
