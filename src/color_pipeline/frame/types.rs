//! Frame data types

use crate::color_pipeline::common::error::{PipelineError, Result};

/// Number of channels in a camera frame (blue, green, red).
pub const BGR_CHANNELS: usize = 3;

/// A captured camera frame
///
/// Pixels are stored row-major with interleaved channels. Three channel frames
/// use the camera's storage order: channel 0 is blue, 1 is green, 2 is red.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    height: usize,
    width: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Frame {
    pub fn new(height: usize, width: usize, channels: usize, data: Vec<u8>) -> Result<Self> {
        let expected = height
            .checked_mul(width)
            .and_then(|pixels| pixels.checked_mul(channels));
        if height == 0 || width == 0 || channels == 0 || expected != Some(data.len()) {
            return Err(PipelineError::InvalidDimensions {
                height,
                width,
                channels,
                len: data.len(),
            });
        }

        Ok(Self {
            height,
            width,
            channels,
            data,
        })
    }

    /// Builds a three channel frame where every pixel is `bgr`.
    pub fn filled(height: usize, width: usize, bgr: [u8; 3]) -> Result<Self> {
        let data = bgr.repeat(height.saturating_mul(width));
        Self::new(height, width, BGR_CHANNELS, data)
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// `(height, width, channels)`, rows first.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.channels)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Channel values of the pixel at `row`, `col`.
    ///
    /// Panics if the coordinates are outside the frame.
    pub fn pixel(&self, row: usize, col: usize) -> &[u8] {
        assert!(row < self.height && col < self.width, "pixel ({row}, {col}) out of bounds");
        let start = (row * self.width + col) * self.channels;
        &self.data[start..start + self.channels]
    }

    /// One row of interleaved pixel data.
    pub fn row(&self, row: usize) -> &[u8] {
        let stride = self.width * self.channels;
        &self.data[row * stride..(row + 1) * stride]
    }

    /// Overwrites the pixel at `row`, `col`.
    ///
    /// Panics if the coordinates are outside the frame or `value` does not
    /// hold exactly one value per channel.
    pub fn set_pixel(&mut self, row: usize, col: usize, value: &[u8]) {
        assert!(row < self.height && col < self.width, "pixel ({row}, {col}) out of bounds");
        assert_eq!(value.len(), self.channels, "pixel value has the wrong channel count");
        let start = (row * self.width + col) * self.channels;
        self.data[start..start + self.channels].copy_from_slice(value);
    }

    /// Pixel data with the channel order reversed (BGR storage to RGB).
    pub fn to_rgb_bytes(&self) -> Result<Vec<u8>> {
        if self.channels != BGR_CHANNELS {
            return Err(PipelineError::UnsupportedFormat {
                channels: self.channels,
            });
        }
        Ok(self
            .data
            .chunks_exact(BGR_CHANNELS)
            .flat_map(|bgr| [bgr[2], bgr[1], bgr[0]])
            .collect())
    }
}
