use crate::color_pipeline::common::error::CaptureError;
use crate::color_pipeline::frame::types::Frame;

pub trait FrameSource: Send {
    fn capture(&mut self) -> Result<Frame, CaptureError>;
}

impl<S: FrameSource + ?Sized> FrameSource for Box<S> {
    fn capture(&mut self) -> Result<Frame, CaptureError> {
        (**self).capture()
    }
}
