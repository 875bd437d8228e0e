use std::{error::Error, fmt};

/// The runner state's result type.
pub type Result<T> = std::result::Result<T, StateError>;

/// Failures detected while building runner state.
#[derive(Debug)]
pub enum StateError {
    /// A stopping or cadence limit was given a negative value.
    InvalidArgument { field: &'static str, value: i64 },
    /// An entry point name did not match any known entry point.
    UnknownEntryPoint(String),
    /// A run configuration document could not be parsed.
    Config(serde_json::Error),
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateError::InvalidArgument { field, value } => write!(
                f,
                "invalid value provided for {field}: expected a non-negative integer or none, but received {value}"
            ),
            StateError::UnknownEntryPoint(name) => write!(f, "unknown entry point: {name}"),
            StateError::Config(e) => write!(f, "invalid run config: {e}"),
        }
    }
}

impl Error for StateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StateError::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for StateError {
    fn from(value: serde_json::Error) -> Self {
        Self::Config(value)
    }
}
