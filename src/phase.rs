use crate::{
    config::PhaseConfig,
    error::{Result, StateError},
    progress::Progress,
};

/// Rejects negative stopping or cadence limits.
///
/// # Args
/// * `name` - Field name reported in the error.
/// * `value` - The optional limit as supplied by the caller.
///
/// # Returns
/// The limit as an unsigned value, `None` meaning unbounded.
///
/// # Errors
/// Returns `StateError::InvalidArgument` naming `name` and `value` if `value` is negative.
fn check_loop_condition(name: &'static str, value: Option<i64>) -> Result<Option<u64>> {
    match value {
        None => Ok(None),
        Some(v) => u64::try_from(v)
            .map(Some)
            .map_err(|_| StateError::InvalidArgument { field: name, value: v }),
    }
}

/// Mutable state of one phase (train, evaluate or predict) for one run.
///
/// `max_epochs` and `max_steps` only matter for training; the `evaluate_every_*` cadences only
/// matter for an evaluate phase interleaved with training. The limits are validated once at
/// construction and are read-only afterwards.
#[derive(Debug)]
pub struct PhaseState<D, O = ()> {
    pub data_source: D,
    pub progress: Progress,

    /// Output of the last call to the user's step function.
    pub step_output: Option<O>,

    max_epochs: Option<u64>,
    max_steps: Option<u64>,
    max_steps_per_epoch: Option<u64>,
    evaluate_every_n_steps: Option<u64>,
    evaluate_every_n_epochs: Option<u64>,
}

impl<D, O> PhaseState<D, O> {
    /// Creates an unbounded phase state with fresh progress.
    pub fn new(data_source: D) -> Self {
        Self {
            data_source,
            progress: Progress::default(),
            step_output: None,
            max_epochs: None,
            max_steps: None,
            max_steps_per_epoch: None,
            evaluate_every_n_steps: None,
            evaluate_every_n_epochs: None,
        }
    }

    pub fn builder(data_source: D) -> PhaseStateBuilder<D, O> {
        PhaseStateBuilder::new(data_source)
    }

    /// Creates a phase state whose limits come from a parsed `PhaseConfig`.
    ///
    /// # Errors
    /// Returns `StateError::InvalidArgument` if any configured limit is negative.
    pub fn from_config(data_source: D, config: &PhaseConfig) -> Result<Self> {
        let mut builder = PhaseStateBuilder::new(data_source);
        builder.max_epochs = config.max_epochs;
        builder.max_steps = config.max_steps;
        builder.max_steps_per_epoch = config.max_steps_per_epoch;
        builder.evaluate_every_n_steps = config.evaluate_every_n_steps;
        builder.evaluate_every_n_epochs = config.evaluate_every_n_epochs;
        builder.build()
    }

    pub fn max_epochs(&self) -> Option<u64> {
        self.max_epochs
    }

    pub fn max_steps(&self) -> Option<u64> {
        self.max_steps
    }

    pub fn max_steps_per_epoch(&self) -> Option<u64> {
        self.max_steps_per_epoch
    }

    pub fn evaluate_every_n_steps(&self) -> Option<u64> {
        self.evaluate_every_n_steps
    }

    pub fn evaluate_every_n_epochs(&self) -> Option<u64> {
        self.evaluate_every_n_epochs
    }

    /// Returns true once `max_steps` or `max_epochs` has been reached.
    pub fn is_done(&self) -> bool {
        self.max_steps_reached()
            || self
                .max_epochs
                .is_some_and(|max| self.progress.num_epochs_completed() >= max)
    }

    /// Returns true once the current epoch hit `max_steps_per_epoch`, or `max_steps` overall.
    pub fn is_epoch_done(&self) -> bool {
        self.max_steps_reached()
            || self
                .max_steps_per_epoch
                .is_some_and(|max| self.progress.num_steps_completed_in_epoch() >= max)
    }

    /// Returns true if the step count of `train_progress` lands on this phase's step cadence.
    ///
    /// A cadence of zero never triggers.
    pub fn should_evaluate_after_step(&self, train_progress: &Progress) -> bool {
        on_cadence(
            self.evaluate_every_n_steps,
            train_progress.num_steps_completed(),
        )
    }

    /// Returns true if the epoch count of `train_progress` lands on this phase's epoch cadence.
    ///
    /// A cadence of zero never triggers.
    pub fn should_evaluate_after_epoch(&self, train_progress: &Progress) -> bool {
        on_cadence(
            self.evaluate_every_n_epochs,
            train_progress.num_epochs_completed(),
        )
    }

    fn max_steps_reached(&self) -> bool {
        self.max_steps
            .is_some_and(|max| self.progress.num_steps_completed() >= max)
    }
}

#[inline]
fn on_cadence(every: Option<u64>, completed: u64) -> bool {
    match every {
        Some(n) if n > 0 => completed > 0 && completed % n == 0,
        _ => false,
    }
}

/// Collects the optional fields of a `PhaseState` and validates them all at once.
#[derive(Debug)]
pub struct PhaseStateBuilder<D, O = ()> {
    data_source: D,
    progress: Progress,
    step_output: Option<O>,
    max_epochs: Option<i64>,
    max_steps: Option<i64>,
    max_steps_per_epoch: Option<i64>,
    evaluate_every_n_steps: Option<i64>,
    evaluate_every_n_epochs: Option<i64>,
}

impl<D, O> PhaseStateBuilder<D, O> {
    pub fn new(data_source: D) -> Self {
        Self {
            data_source,
            progress: Progress::default(),
            step_output: None,
            max_epochs: None,
            max_steps: None,
            max_steps_per_epoch: None,
            evaluate_every_n_steps: None,
            evaluate_every_n_epochs: None,
        }
    }

    pub fn progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn step_output(mut self, step_output: O) -> Self {
        self.step_output = Some(step_output);
        self
    }

    pub fn max_epochs(mut self, max_epochs: i64) -> Self {
        self.max_epochs = Some(max_epochs);
        self
    }

    pub fn max_steps(mut self, max_steps: i64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn max_steps_per_epoch(mut self, max_steps_per_epoch: i64) -> Self {
        self.max_steps_per_epoch = Some(max_steps_per_epoch);
        self
    }

    pub fn evaluate_every_n_steps(mut self, every: i64) -> Self {
        self.evaluate_every_n_steps = Some(every);
        self
    }

    pub fn evaluate_every_n_epochs(mut self, every: i64) -> Self {
        self.evaluate_every_n_epochs = Some(every);
        self
    }

    /// Validates every limit and builds the `PhaseState`.
    ///
    /// # Errors
    /// Returns `StateError::InvalidArgument` for the first negative limit, checked in the order
    /// `max_epochs`, `max_steps`, `max_steps_per_epoch`, `evaluate_every_n_steps`,
    /// `evaluate_every_n_epochs`. Nothing is built on failure.
    pub fn build(self) -> Result<PhaseState<D, O>> {
        let max_epochs = check_loop_condition("max_epochs", self.max_epochs)?;
        let max_steps = check_loop_condition("max_steps", self.max_steps)?;
        let max_steps_per_epoch =
            check_loop_condition("max_steps_per_epoch", self.max_steps_per_epoch)?;
        let evaluate_every_n_steps =
            check_loop_condition("evaluate_every_n_steps", self.evaluate_every_n_steps)?;
        let evaluate_every_n_epochs =
            check_loop_condition("evaluate_every_n_epochs", self.evaluate_every_n_epochs)?;

        Ok(PhaseState {
            data_source: self.data_source,
            progress: self.progress,
            step_output: self.step_output,
            max_epochs,
            max_steps,
            max_steps_per_epoch,
            evaluate_every_n_steps,
            evaluate_every_n_epochs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Setter = fn(PhaseStateBuilder<Vec<u32>>, i64) -> PhaseStateBuilder<Vec<u32>>;

    const SETTERS: [(&str, Setter); 5] = [
        ("max_epochs", PhaseStateBuilder::max_epochs),
        ("max_steps", PhaseStateBuilder::max_steps),
        ("max_steps_per_epoch", PhaseStateBuilder::max_steps_per_epoch),
        ("evaluate_every_n_steps", PhaseStateBuilder::evaluate_every_n_steps),
        ("evaluate_every_n_epochs", PhaseStateBuilder::evaluate_every_n_epochs),
    ];

    #[test]
    fn negative_limit_is_rejected_for_every_field() {
        for (name, set) in SETTERS {
            let err = set(PhaseState::builder(vec![1, 2, 3]), -1).build().unwrap_err();
            match err {
                StateError::InvalidArgument { field, value } => {
                    assert_eq!(field, name);
                    assert_eq!(value, -1);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn zero_and_positive_limits_are_accepted() {
        for (_, set) in SETTERS {
            assert!(set(PhaseState::builder(vec![1]), 0).build().is_ok());
            assert!(set(PhaseState::builder(vec![1]), 12).build().is_ok());
        }
    }

    #[test]
    fn error_message_names_field_and_value() {
        let err = PhaseState::<_>::builder(0..10)
            .max_epochs(-3)
            .build()
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("max_epochs"));
        assert!(msg.contains("-3"));
    }

    #[test]
    fn first_offending_field_is_reported() {
        let err = PhaseState::<_>::builder(())
            .evaluate_every_n_epochs(-2)
            .max_steps(-5)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            StateError::InvalidArgument { field: "max_steps", value: -5 }
        ));
    }

    #[test]
    fn done_when_either_train_limit_is_reached() {
        let mut by_steps = PhaseState::<_>::builder(()).max_steps(2).build().unwrap();
        assert!(!by_steps.is_done());
        by_steps.progress.increment_step();
        by_steps.progress.increment_step();
        assert!(by_steps.is_done());
        assert!(by_steps.is_epoch_done());

        let mut by_epochs = PhaseState::<_>::builder(()).max_epochs(1).build().unwrap();
        by_epochs.progress.increment_step();
        assert!(!by_epochs.is_done());
        by_epochs.progress.increment_epoch();
        assert!(by_epochs.is_done());
    }

    #[test]
    fn unbounded_phase_is_never_done() {
        let mut phase = PhaseState::<_, ()>::new(());
        for _ in 0..100 {
            phase.progress.increment_step();
        }
        phase.progress.increment_epoch();
        assert!(!phase.is_done());
        assert!(!phase.is_epoch_done());
    }

    #[test]
    fn epoch_done_follows_steps_per_epoch() {
        let mut phase = PhaseState::<_>::builder(())
            .max_steps_per_epoch(2)
            .build()
            .unwrap();
        phase.progress.increment_step();
        assert!(!phase.is_epoch_done());
        phase.progress.increment_step();
        assert!(phase.is_epoch_done());
        phase.progress.increment_epoch();
        assert!(!phase.is_epoch_done());
    }

    #[test]
    fn evaluation_cadence() {
        let eval = PhaseState::<_>::builder(())
            .evaluate_every_n_steps(3)
            .evaluate_every_n_epochs(0)
            .build()
            .unwrap();

        let mut train = Progress::new();
        assert!(!eval.should_evaluate_after_step(&train));

        let triggered: Vec<u64> = (1..=7)
            .filter(|_| {
                train.increment_step();
                eval.should_evaluate_after_step(&train)
            })
            .collect();
        assert_eq!(triggered, vec![3, 6]);

        train.increment_epoch();
        assert!(!eval.should_evaluate_after_epoch(&train));
    }

    #[test]
    fn step_output_is_overwritten() {
        let mut phase = PhaseState::<_, f32>::builder(vec![0.5_f32])
            .step_output(1.0)
            .build()
            .unwrap();
        assert_eq!(phase.step_output, Some(1.0));
        phase.step_output = Some(2.0);
        assert_eq!(phase.step_output, Some(2.0));
    }
}
