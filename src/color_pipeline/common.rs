//! Common utilities module
//!
//! This module contains shared types used across the color pipeline.

pub mod error;

pub use error::{CaptureError, OpenError, PipelineError, Result};
