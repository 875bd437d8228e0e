use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::StateError;

/// Top-level invocation mode of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryPoint {
    Fit,
    Train,
    Evaluate,
    Predict,
}

/// One of the execution contexts a `State` can hold progress for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Train,
    Evaluate,
    Predict,
}

impl EntryPoint {
    pub const ALL: [EntryPoint; 4] = [
        EntryPoint::Fit,
        EntryPoint::Train,
        EntryPoint::Evaluate,
        EntryPoint::Predict,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryPoint::Fit => "fit",
            EntryPoint::Train => "train",
            EntryPoint::Evaluate => "evaluate",
            EntryPoint::Predict => "predict",
        }
    }

    /// Returns the phase slots a driver is expected to populate for this entry point.
    ///
    /// Nothing in `State` enforces this; it only tells the driver which slots matter.
    pub fn phases(&self) -> &'static [Phase] {
        match self {
            EntryPoint::Fit => &[Phase::Train, Phase::Evaluate],
            EntryPoint::Train => &[Phase::Train],
            EntryPoint::Evaluate => &[Phase::Evaluate],
            EntryPoint::Predict => &[Phase::Predict],
        }
    }
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Train => "train",
            Phase::Evaluate => "evaluate",
            Phase::Predict => "predict",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryPoint {
    type Err = StateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryPoint::ALL
            .into_iter()
            .find(|entry_point| entry_point.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StateError::UnknownEntryPoint(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("fit".parse::<EntryPoint>().unwrap(), EntryPoint::Fit);
        assert_eq!(" Evaluate ".parse::<EntryPoint>().unwrap(), EntryPoint::Evaluate);
        assert!(matches!(
            "test".parse::<EntryPoint>(),
            Err(StateError::UnknownEntryPoint(name)) if name == "test"
        ));
    }

    #[test]
    fn display_matches_serde_name() {
        for entry_point in EntryPoint::ALL {
            let json = serde_json::to_string(&entry_point).unwrap();
            assert_eq!(json, format!("\"{entry_point}\""));
        }
    }

    #[test]
    fn fit_expects_train_and_evaluate() {
        assert_eq!(EntryPoint::Fit.phases(), &[Phase::Train, Phase::Evaluate]);
        assert_eq!(EntryPoint::Predict.phases(), &[Phase::Predict]);
    }
}
