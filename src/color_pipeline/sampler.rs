//! Region averaging over a captured frame

use tracing::trace;

use crate::color_pipeline::common::error::{PipelineError, Result};
use crate::color_pipeline::frame::{BGR_CHANNELS, Frame};
use crate::color_pipeline::types::RgbSample;

/// Rectangle of a frame in normalized coordinates.
///
/// `v_*` fractions run down the rows, `h_*` fractions across the columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleRegion {
    pub v_start: f64,
    pub v_end: f64,
    pub h_start: f64,
    pub h_end: f64,
}

impl Default for SampleRegion {
    /// The central half of the frame on both axes.
    fn default() -> Self {
        Self {
            v_start: 0.25,
            v_end: 0.75,
            h_start: 0.25,
            h_end: 0.75,
        }
    }
}

impl SampleRegion {
    pub fn new(v_start: f64, v_end: f64, h_start: f64, h_end: f64) -> Result<Self> {
        let region = Self {
            v_start,
            v_end,
            h_start,
            h_end,
        };
        region.validate()?;
        Ok(region)
    }

    pub fn validate(&self) -> Result<()> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        let valid = [self.v_start, self.v_end, self.h_start, self.h_end]
            .into_iter()
            .all(in_unit)
            && self.v_start < self.v_end
            && self.h_start < self.h_end;

        if valid {
            Ok(())
        } else {
            Err(PipelineError::InvalidRegion {
                v_start: self.v_start,
                v_end: self.v_end,
                h_start: self.h_start,
                h_end: self.h_end,
            })
        }
    }

    /// Pixel bounds `(rows, cols)` as half-open ranges for a frame of the given size.
    pub fn pixel_bounds(
        &self,
        height: usize,
        width: usize,
    ) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let edge = |dimension: usize, fraction: f64| (dimension as f64 * fraction).round() as usize;
        (
            edge(height, self.v_start)..edge(height, self.v_end),
            edge(width, self.h_start)..edge(width, self.h_end),
        )
    }
}

/// Averages every pixel of `region` in `frame`.
///
/// Channel 0 of the frame is read as blue, 1 as green and 2 as red. Averages
/// use integer division, truncating toward zero.
pub fn average_of_region(frame: &Frame, region: &SampleRegion) -> Result<RgbSample> {
    region.validate()?;

    let (height, width, channels) = frame.shape();
    if channels != BGR_CHANNELS {
        return Err(PipelineError::UnsupportedFormat { channels });
    }

    let (rows, cols) = region.pixel_bounds(height, width);
    let count = (rows.len() * cols.len()) as u64;
    if count == 0 {
        return Err(PipelineError::EmptySampleArea { height, width });
    }

    let mut sum = RgbSample::default();
    for row in rows {
        let line = frame.row(row);
        for bgr in line[cols.start * BGR_CHANNELS..cols.end * BGR_CHANNELS].chunks_exact(BGR_CHANNELS)
        {
            sum.b += u64::from(bgr[0]);
            sum.g += u64::from(bgr[1]);
            sum.r += u64::from(bgr[2]);
        }
    }

    trace!(
        r_sum = sum.r,
        g_sum = sum.g,
        b_sum = sum.b,
        count,
        "Summed sample region of {}x{} frame",
        width,
        height
    );

    Ok(RgbSample {
        r: sum.r / count,
        g: sum.g / count,
        b: sum.b / count,
    })
}

/// Sampler bound to a validated region.
#[derive(Debug, Clone, Copy)]
pub struct ColorSampler {
    region: SampleRegion,
}

impl ColorSampler {
    pub fn new(region: SampleRegion) -> Result<Self> {
        region.validate()?;
        Ok(Self { region })
    }

    pub fn region(&self) -> &SampleRegion {
        &self.region
    }

    pub fn sample(&self, frame: &Frame) -> Result<RgbSample> {
        average_of_region(frame, &self.region)
    }
}
