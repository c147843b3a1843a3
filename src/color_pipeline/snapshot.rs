//! Diagnostic snapshot module
//!
//! This module saves a captured frame to disk so the camera framing can be
//! checked by eye when running the self-test.

mod tiff_snapshot_writer;
mod writer;

pub use tiff_snapshot_writer::TiffSnapshotWriter;
pub use writer::{SnapshotWriter, save_snapshot};

/// TIFF compression methods for snapshots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SnapshotCompression {
    /// No compression (fastest, largest file)
    #[default]
    None,
    /// LZW compression
    Lzw,
    /// Deflate compression at the balanced level
    Deflate,
}
