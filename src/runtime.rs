//! Worker runtime module
//!
//! This module runs the controller: a sampling worker turns frames into colors
//! and publishes them into a single shared slot, an actuation worker drives the
//! LEDs toward whatever color is current, and a supervisor owns both workers
//! and the shutdown signal they poll.

mod actuation_loop;
pub mod error;
mod sampling_loop;
mod shared;
mod stats;
mod supervisor;


pub use actuation_loop::{ActuationExit, ActuationLoop};
pub use error::SupervisorError;
pub use sampling_loop::{CAPTURE_RETRY_DELAY, SamplingExit, SamplingLoop};
pub use shared::{ColorPublisher, CurrentColor, Published, ShutdownSignal, current_color};
pub use stats::{LoopStats, StepTiming, Timer};
pub use supervisor::{LoopSettings, RunReport, Supervisor, SupervisorState};
