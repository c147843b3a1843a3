//! LED output module
//!
//! This module defines the `LedActuator` capability the actuation loop drives,
//! together with a Linux sysfs PWM implementation and a dry-run implementation
//! that only logs.

mod actuator;
mod dry_run;
pub mod error;
mod sysfs_pwm;

pub use actuator::LedActuator;
pub use dry_run::DryRunActuator;
pub use error::ActuatorError;
pub use sysfs_pwm::{SysfsPwmActuator, SysfsPwmConfig};
