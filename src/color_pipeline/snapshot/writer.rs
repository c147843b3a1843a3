use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::color_pipeline::common::error::{PipelineError, Result};
use crate::color_pipeline::frame::Frame;

pub trait SnapshotWriter {
    fn write_snapshot(&self, frame: &Frame, output: &mut dyn Write) -> Result<()>;
}

/// Writes `frame` to a new file at `path`.
pub fn save_snapshot<W: SnapshotWriter + ?Sized, P: AsRef<Path>>(
    writer: &W,
    frame: &Frame,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path).map_err(PipelineError::IoError)?;
    writer.write_snapshot(frame, &mut file)?;
    info!(path = %path.display(), "Saved camera snapshot");
    Ok(())
}
