/// Step and epoch counters for a single phase.
///
/// Counters only move forward; a fresh `Progress` is created for every `PhaseState`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Progress {
    num_epochs_completed: u64,
    num_steps_completed: u64,
    num_steps_completed_in_epoch: u64,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn num_epochs_completed(&self) -> u64 {
        self.num_epochs_completed
    }

    #[inline]
    pub fn num_steps_completed(&self) -> u64 {
        self.num_steps_completed
    }

    #[inline]
    pub fn num_steps_completed_in_epoch(&self) -> u64 {
        self.num_steps_completed_in_epoch
    }

    /// Records one completed step, both overall and within the current epoch.
    #[inline]
    pub fn increment_step(&mut self) {
        self.num_steps_completed += 1;
        self.num_steps_completed_in_epoch += 1;
    }

    /// Records one completed epoch and starts counting steps for the next one.
    #[inline]
    pub fn increment_epoch(&mut self) {
        self.num_epochs_completed += 1;
        self.num_steps_completed_in_epoch = 0;
    }
}
