use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ActuatorError {
    #[error("Invalid actuator configuration: {0}")]
    InvalidConfig(String),

    #[error("PWM channel {channel} did not appear under {chip}")]
    ExportTimeout { chip: PathBuf, channel: u32 },

    #[error("Failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Actuator has already been released")]
    Released,
}
