use std::io::Write;

use tiff::encoder::compression::DeflateLevel;
use tiff::encoder::{Compression, TiffEncoder, colortype};
use tracing::debug;

use crate::color_pipeline::common::error::{PipelineError, Result};
use crate::color_pipeline::frame::Frame;
use crate::color_pipeline::snapshot::SnapshotCompression;
use crate::color_pipeline::snapshot::writer::SnapshotWriter;

/// Encodes three channel frames as 8-bit RGB TIFF images.
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffSnapshotWriter {
    compression: SnapshotCompression,
}

impl TiffSnapshotWriter {
    pub fn new(compression: SnapshotCompression) -> Self {
        Self { compression }
    }
}

impl SnapshotWriter for TiffSnapshotWriter {
    fn write_snapshot(&self, frame: &Frame, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding snapshot: {}x{}", frame.width(), frame.height());

        let rgb = frame.to_rgb_bytes()?;
        let mut buffer = Vec::new();

        let compression = match self.compression {
            SnapshotCompression::None => Compression::Uncompressed,
            SnapshotCompression::Lzw => Compression::Lzw,
            SnapshotCompression::Deflate => Compression::Deflate(DeflateLevel::Balanced),
        };

        let mut encoder = TiffEncoder::new(std::io::Cursor::new(&mut buffer))
            .map_err(|e| PipelineError::EncodeError(e.to_string()))?
            .with_compression(compression);

        encoder
            .write_image::<colortype::RGB8>(frame.width() as u32, frame.height() as u32, &rgb)
            .map_err(|e| PipelineError::EncodeError(e.to_string()))?;

        output.write_all(&buffer)?;

        debug!("Snapshot encoding complete, {} bytes", buffer.len());
        Ok(())
    }
}
