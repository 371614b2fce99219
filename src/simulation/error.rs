//! Error types for the trip simulation

use super::engine::SimState;

/// Everything that can go wrong driving a run
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// `start()` or `reset()` was called before a route was configured.
    #[error("simulation has not been configured")]
    NotConfigured,

    /// The operation is not valid from the current state.
    #[error("cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: SimState },

    /// The route handed to `configure()` cannot be driven.
    #[error("malformed route: {0}")]
    MalformedRoute(String),

    /// No preset route matches the requested name.
    #[error("unknown route: {0}")]
    UnknownRoute(String),

    /// The battery ran out before the destination.
    #[error("battery depleted")]
    BatteryDepleted,

    /// The driver stopped the run.
    #[error("run aborted by driver")]
    ManualAbort,
}
