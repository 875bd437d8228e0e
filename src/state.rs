use std::sync::Arc;

use log::debug;

use crate::{
    entry_point::{EntryPoint, Phase},
    phase::PhaseState,
    stop::{LogObserver, StopObserver, StopSignal},
    timer::Timer,
};

/// Root state of one entry-point invocation.
///
/// Holds up to three `PhaseState`s, one per phase. A new `State` is created each time an
/// entry point is called and the previous one is dropped whole; nothing carries over.
///
/// The stop flag is the only part meant to be touched from outside the driver's thread:
/// hand out a `StopSignal` via [`State::stop_signal`] for that.
#[derive(Debug)]
pub struct State<D, O = ()> {
    entry_point: EntryPoint,
    pub timer: Timer,

    pub train_state: Option<PhaseState<D, O>>,
    pub eval_state: Option<PhaseState<D, O>>,
    pub predict_state: Option<PhaseState<D, O>>,

    stop: StopSignal,
}

impl<D, O> State<D, O> {
    /// Creates an empty state for `entry_point` with a fresh timer and a cleared stop flag.
    ///
    /// Stop requests are reported through `LogObserver` unless replaced with
    /// [`State::with_observer`].
    pub fn new(entry_point: EntryPoint) -> Self {
        debug!(entry_point = entry_point.as_str(); "creating runner state");

        Self {
            entry_point,
            timer: Timer::new(),
            train_state: None,
            eval_state: None,
            predict_state: None,
            stop: StopSignal::new(entry_point, Arc::new(LogObserver)),
        }
    }

    pub fn with_timer(mut self, timer: Timer) -> Self {
        self.timer = timer;
        self
    }

    pub fn with_train_state(mut self, train_state: PhaseState<D, O>) -> Self {
        self.train_state = Some(train_state);
        self
    }

    pub fn with_eval_state(mut self, eval_state: PhaseState<D, O>) -> Self {
        self.eval_state = Some(eval_state);
        self
    }

    pub fn with_predict_state(mut self, predict_state: PhaseState<D, O>) -> Self {
        self.predict_state = Some(predict_state);
        self
    }

    /// Replaces the observer notified on every stop request.
    ///
    /// Must be called before any `StopSignal` is handed out; earlier handles keep the old one.
    pub fn with_observer(mut self, observer: Arc<dyn StopObserver>) -> Self {
        self.stop.set_observer(observer);
        self
    }

    #[inline]
    pub fn entry_point(&self) -> EntryPoint {
        self.entry_point
    }

    /// Returns the slot for `phase`.
    pub fn phase(&self, phase: Phase) -> Option<&PhaseState<D, O>> {
        match phase {
            Phase::Train => self.train_state.as_ref(),
            Phase::Evaluate => self.eval_state.as_ref(),
            Phase::Predict => self.predict_state.as_ref(),
        }
    }

    pub fn phase_mut(&mut self, phase: Phase) -> Option<&mut PhaseState<D, O>> {
        match phase {
            Phase::Train => self.train_state.as_mut(),
            Phase::Evaluate => self.eval_state.as_mut(),
            Phase::Predict => self.predict_state.as_mut(),
        }
    }

    /// Signals the loop to end after the current step completes.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Whether the loop should terminate after the current step completes.
    ///
    /// Never resets within the lifetime of this state.
    #[inline]
    pub fn should_stop(&self) -> bool {
        self.stop.is_set()
    }

    /// Returns a `Send + Sync` handle that can stop this run from another thread.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }
}
