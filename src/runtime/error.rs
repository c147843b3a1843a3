use thiserror::Error;

use crate::color_pipeline::PipelineError;
use crate::led::ActuatorError;
use crate::runtime::supervisor::SupervisorState;

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Cannot {operation} while the supervisor is {state:?}")]
    InvalidState {
        operation: &'static str,
        state: SupervisorState,
    },

    #[error("Invalid loop settings: {0}")]
    InvalidSettings(String),

    #[error("Failed to spawn {worker} worker: {source}")]
    SpawnError {
        worker: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("The {0} worker panicked")]
    WorkerPanicked(&'static str),

    #[error("Color pipeline failed: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("LED actuator failed: {0}")]
    Actuator(#[from] ActuatorError),
}
