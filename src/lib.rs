//! Runtime state shared by a training-loop driver across the fit, train, evaluate and
//! predict entry points.

pub mod config;
pub mod entry_point;
pub mod error;
pub mod phase;
pub mod progress;
pub mod state;
pub mod stop;
pub mod timer;

pub use config::{PhaseConfig, RunConfig};
pub use entry_point::{EntryPoint, Phase};
pub use error::{Result, StateError};
pub use phase::{PhaseState, PhaseStateBuilder};
pub use progress::Progress;
pub use state::State;
pub use stop::{LogObserver, StopObserver, StopSignal};
pub use timer::Timer;
