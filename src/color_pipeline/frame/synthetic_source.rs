use std::time::{Duration, Instant};

use tracing::debug;

use crate::color_pipeline::common::error::{CaptureError, OpenError, PipelineError};
use crate::color_pipeline::frame::source::FrameSource;
use crate::color_pipeline::frame::types::{BGR_CHANNELS, Frame};

/// Default capture width, matching the camera mode the controller was tuned for.
pub const DEFAULT_FRAME_WIDTH: usize = 160;
/// Default capture height.
pub const DEFAULT_FRAME_HEIGHT: usize = 120;

/// Test-pattern camera producing solid frames that cycle through a palette.
///
/// Colors are given in frame storage order (blue, green, red). With a frame
/// interval set, `capture` blocks until the next frame is due, like a real
/// camera running at a fixed rate.
pub struct SyntheticSource {
    height: usize,
    width: usize,
    palette: Vec<[u8; 3]>,
    next: usize,
    frame_interval: Option<Duration>,
    last_capture: Option<Instant>,
}

impl SyntheticSource {
    pub fn open(height: usize, width: usize, palette: Vec<[u8; 3]>) -> Result<Self, OpenError> {
        if palette.is_empty() {
            return Err(OpenError::EmptyPalette);
        }
        if height == 0 || width == 0 {
            return Err(OpenError::InvalidConfig(PipelineError::InvalidDimensions {
                height,
                width,
                channels: BGR_CHANNELS,
                len: 0,
            }));
        }

        Ok(Self {
            height,
            width,
            palette,
            next: 0,
            frame_interval: None,
            last_capture: None,
        })
    }

    /// A red, green, blue, amber rotation.
    pub fn test_pattern(height: usize, width: usize) -> Result<Self, OpenError> {
        Self::open(
            height,
            width,
            vec![[40, 40, 220], [40, 200, 40], [220, 60, 30], [20, 160, 240]],
        )
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = Some(interval);
        self
    }

    fn wait_for_next_frame(&mut self) {
        if let (Some(interval), Some(last)) = (self.frame_interval, self.last_capture) {
            let elapsed = last.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }
        self.last_capture = Some(Instant::now());
    }
}

impl FrameSource for SyntheticSource {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        self.wait_for_next_frame();

        let bgr = self.palette[self.next];
        self.next = (self.next + 1) % self.palette.len();
        debug!(?bgr, "Generating synthetic frame");

        Frame::filled(self.height, self.width, bgr).map_err(CaptureError::Malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_through_palette() {
        let mut source = SyntheticSource::open(2, 3, vec![[1, 2, 3], [4, 5, 6]]).unwrap();

        let first = source.capture().unwrap();
        let second = source.capture().unwrap();
        let third = source.capture().unwrap();

        assert_eq!(first.shape(), (2, 3, 3));
        assert_eq!(first.pixel(1, 2), &[1, 2, 3]);
        assert_eq!(second.pixel(0, 0), &[4, 5, 6]);
        assert_eq!(third, first);
    }

    #[test]
    fn test_open_rejects_empty_palette() {
        assert!(matches!(
            SyntheticSource::open(2, 2, Vec::new()),
            Err(OpenError::EmptyPalette)
        ));
    }

    #[test]
    fn test_open_rejects_zero_size() {
        assert!(matches!(
            SyntheticSource::open(0, 2, vec![[1, 2, 3]]),
            Err(OpenError::InvalidConfig(PipelineError::InvalidDimensions {
                height: 0,
                width: 2,
                channels: 3,
                ..
            }))
        ));
    }
}
