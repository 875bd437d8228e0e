use serde::{Deserialize, Serialize};

use crate::{
    entry_point::{EntryPoint, Phase},
    error::Result,
    phase::PhaseState,
    state::State,
};

/// Stopping and cadence limits for one phase, as read from a config document.
///
/// Values are signed so that a negative limit is reported by `PhaseState::from_config`
/// with the offending field, rather than as a parse failure.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhaseConfig {
    pub max_epochs: Option<i64>,
    pub max_steps: Option<i64>,
    pub max_steps_per_epoch: Option<i64>,
    pub evaluate_every_n_steps: Option<i64>,
    pub evaluate_every_n_epochs: Option<i64>,
}

/// Description of one entry-point invocation and the phases it populates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub entry_point: EntryPoint,
    #[serde(default)]
    pub train: Option<PhaseConfig>,
    #[serde(default)]
    pub eval: Option<PhaseConfig>,
    #[serde(default)]
    pub predict: Option<PhaseConfig>,
}

impl RunConfig {
    /// Parses a run configuration from JSON.
    ///
    /// # Errors
    /// Returns `StateError::Config` if the document is malformed or has unknown fields.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds a fresh `State` with one `PhaseState` per configured phase.
    ///
    /// # Args
    /// * `data` - Called once per configured phase to produce its data source.
    ///
    /// # Errors
    /// Returns `StateError::InvalidArgument` if any configured limit is negative; no state is
    /// returned in that case.
    pub fn into_state<D, O>(&self, mut data: impl FnMut(Phase) -> D) -> Result<State<D, O>> {
        let mut state = State::new(self.entry_point);

        let slots = [
            (Phase::Train, &self.train),
            (Phase::Evaluate, &self.eval),
            (Phase::Predict, &self.predict),
        ];

        for (phase, config) in slots {
            let Some(config) = config else { continue };
            let phase_state = PhaseState::from_config(data(phase), config)?;

            state = match phase {
                Phase::Train => state.with_train_state(phase_state),
                Phase::Evaluate => state.with_eval_state(phase_state),
                Phase::Predict => state.with_predict_state(phase_state),
            };
        }

        Ok(state)
    }
}
