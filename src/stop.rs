use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use log::warn;

use crate::entry_point::EntryPoint;

/// Receives an event every time a stop is requested on a run.
///
/// Implementations are called from whatever context invoked the stop, which may not be the
/// driver's thread.
pub trait StopObserver: Send + Sync {
    fn stop_requested(&self, entry_point: EntryPoint);
}

/// Reports stop requests through the `log` facade at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl StopObserver for LogObserver {
    fn stop_requested(&self, entry_point: EntryPoint) {
        warn!(entry_point = entry_point.as_str(); "received signal to stop");
    }
}

/// One-way stop flag shared between the driver and out-of-band callers.
///
/// Cloning yields another handle to the same flag. Once set, the flag never clears.
#[derive(Clone)]
pub struct StopSignal {
    entry_point: EntryPoint,
    flag: Arc<AtomicBool>,
    observer: Arc<dyn StopObserver>,
}

impl StopSignal {
    pub(crate) fn new(entry_point: EntryPoint, observer: Arc<dyn StopObserver>) -> Self {
        Self {
            entry_point,
            flag: Arc::new(AtomicBool::new(false)),
            observer,
        }
    }

    /// Requests the loop to end after the current step completes.
    ///
    /// Idempotent; the observer is notified on every call, after the flag is set.
    pub fn stop(&self) {
        self.flag.store(true, Ordering::Release);
        self.observer.stop_requested(self.entry_point);
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }

    pub(crate) fn set_observer(&mut self, observer: Arc<dyn StopObserver>) {
        self.observer = observer;
    }
}

impl fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StopSignal")
            .field("entry_point", &self.entry_point)
            .field("is_set", &self.is_set())
            .finish_non_exhaustive()
    }
}
