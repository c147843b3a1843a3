//! Frame acquisition module
//!
//! This module defines the fixed-shape `Frame` handed over by a camera and the
//! `FrameSource` capability that produces frames.

mod source;
mod synthetic_source;
mod tiff_source;
pub mod types;

pub use source::FrameSource;
pub use synthetic_source::{DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH, SyntheticSource};
pub use tiff_source::TiffSequenceSource;
pub use types::{BGR_CHANNELS, Frame};
