use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(
        "Invalid sample region: v_start={v_start}, v_end={v_end}, h_start={h_start}, h_end={h_end}"
    )]
    InvalidRegion {
        v_start: f64,
        v_end: f64,
        h_start: f64,
        h_end: f64,
    },

    #[error("Unsupported frame format: {channels} channels, only 3 channel BGR frames are supported")]
    UnsupportedFormat { channels: usize },

    #[error("Invalid {channel} balance factor {value}, must be within [0, 1]")]
    InvalidBalance { channel: &'static str, value: f64 },

    #[error("Degenerate color: cannot scale with max channel {max} to pwm_max {pwm_max}")]
    DegenerateColor { max: f64, pwm_max: f64 },

    #[error("Invalid pwm_max {0}, must be a finite value greater than 0")]
    InvalidPwmMax(f64),

    #[error("Invalid frame dimensions: height={height}, width={width}, channels={channels}, buffer={len}")]
    InvalidDimensions {
        height: usize,
        width: usize,
        channels: usize,
        len: usize,
    },

    #[error("Sample region covers no pixels of a {height}x{width} frame")]
    EmptySampleArea { height: usize, width: usize },

    #[error("Failed to encode snapshot: {0}")]
    EncodeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure to acquire a single frame. Transient: the caller keeps its last color.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Failed to decode frame {path}: {reason}")]
    Decode { path: PathBuf, reason: String },

    #[error("Frame source returned a malformed frame: {0}")]
    Malformed(#[source] PipelineError),

    #[error("Frame source is unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Failure to open a frame source. Fatal at startup.
#[derive(Error, Debug)]
pub enum OpenError {
    #[error("No frames found at {0}")]
    NoFrames(PathBuf),

    #[error("Synthetic source needs at least one palette color")]
    EmptyPalette,

    #[error("Invalid frame source configuration: {0}")]
    InvalidConfig(#[source] PipelineError),

    #[error("Failed to open {path}: {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
