//! Frame source replaying TIFF images from disk.
//!
//! This module lets the controller run against recorded captures instead of a
//! live camera. It accepts either a single TIFF file or a directory of them and
//! loops over the files forever, decoding one file per capture with the `tiff`
//! library.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tracing::debug;

use crate::color_pipeline::common::error::{CaptureError, OpenError};
use crate::color_pipeline::frame::source::FrameSource;
use crate::color_pipeline::frame::types::{BGR_CHANNELS, Frame};

/// Replays a sorted list of TIFF files as camera frames.
///
/// Supported encodings:
/// - 8-bit RGB
/// - 8-bit RGBA (alpha is dropped)
/// - 8-bit grayscale (replicated into all three channels)
pub struct TiffSequenceSource {
    files: Vec<PathBuf>,
    next: usize,
}

impl TiffSequenceSource {
    /// Opens a TIFF file, or every `.tif`/`.tiff` file in a directory.
    ///
    /// # Arguments
    ///
    /// * `path` - A TIFF file or a directory containing TIFF files
    ///
    /// # Returns
    ///
    /// * `Ok(TiffSequenceSource)` - Source replaying the files in name order
    /// * `Err(OpenError)` - The path cannot be read or holds no TIFF files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use ledcam_rs::color_pipeline::{FrameSource, TiffSequenceSource};
    ///
    /// let mut source = TiffSequenceSource::open("captures").unwrap();
    /// let frame = source.capture().unwrap();
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OpenError> {
        let path = path.as_ref();
        let io_error = |source| OpenError::IoError {
            path: path.to_path_buf(),
            source,
        };

        let metadata = std::fs::metadata(path).map_err(io_error)?;
        let mut files = if metadata.is_dir() {
            std::fs::read_dir(path)
                .map_err(io_error)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_tiff(p))
                .collect::<Vec<_>>()
        } else {
            vec![path.to_path_buf()]
        };
        files.sort();

        if files.is_empty() {
            return Err(OpenError::NoFrames(path.to_path_buf()));
        }

        debug!("Opened TIFF frame source with {} files", files.len());
        Ok(Self { files, next: 0 })
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"))
}

fn decode_error(path: &Path, reason: impl ToString) -> CaptureError {
    CaptureError::Decode {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Decodes one TIFF file into a BGR frame.
fn decode_frame(path: &Path) -> Result<Frame, CaptureError> {
    let file = File::open(path)?;
    let mut decoder = Decoder::new(BufReader::new(file)).map_err(|e| decode_error(path, e))?;

    let (width, height) = decoder.dimensions().map_err(|e| decode_error(path, e))?;
    let color_type = decoder.colortype().map_err(|e| decode_error(path, e))?;
    let image = decoder.read_image().map_err(|e| decode_error(path, e))?;

    let DecodingResult::U8(pixels) = image else {
        return Err(decode_error(path, "only 8-bit samples are supported"));
    };

    // The camera convention stores channels blue first, so reverse RGB here
    let data: Vec<u8> = match color_type {
        ColorType::RGB(8) => pixels
            .chunks_exact(3)
            .flat_map(|rgb| [rgb[2], rgb[1], rgb[0]])
            .collect(),
        ColorType::RGBA(8) => pixels
            .chunks_exact(4)
            .flat_map(|rgba| [rgba[2], rgba[1], rgba[0]])
            .collect(),
        ColorType::Gray(8) => pixels.iter().flat_map(|&v| [v, v, v]).collect(),
        other => {
            return Err(decode_error(path, format!("unsupported color type {other:?}")));
        }
    };

    debug!("Decoded frame {}: {}x{} {:?}", path.display(), width, height, color_type);

    Frame::new(height as usize, width as usize, BGR_CHANNELS, data).map_err(CaptureError::Malformed)
}

impl FrameSource for TiffSequenceSource {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        let path = &self.files[self.next];
        self.next = (self.next + 1) % self.files.len();
        decode_frame(path)
    }
}
