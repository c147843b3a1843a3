//! Color sampling pipeline module
//!
//! This module turns camera frames into LED targets: a region of the frame is
//! averaged, balanced per channel and scaled into the PWM output range. It also
//! holds the frame sources feeding the pipeline and the snapshot writer used by
//! the self-test.

pub mod common;
pub mod config;
pub mod corrector;
pub mod frame;
pub mod pipeline;
pub mod sampler;
pub mod scaler;
pub mod snapshot;
pub mod types;

#[cfg(test)]
mod tests;

pub use common::{CaptureError, OpenError, PipelineError, Result};

pub use types::{PwmColor, RgbRatio, RgbSample};

pub use frame::{
    DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, Frame, FrameSource, SyntheticSource,
    TiffSequenceSource,
};

pub use sampler::{ColorSampler, SampleRegion, average_of_region};
pub use corrector::{BalanceFactors, ColorCorrector, balance};
pub use scaler::{DEFAULT_PWM_MAX, PwmScaler, scale_to_pwm};

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use pipeline::{ColorPipeline, process};

pub use snapshot::{SnapshotCompression, SnapshotWriter, TiffSnapshotWriter, save_snapshot};
