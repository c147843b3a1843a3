use std::time::Duration;

use tracing::{error, info, warn};

use crate::color_pipeline::{ColorPipeline, FrameSource, PipelineError, PwmColor};
use crate::runtime::shared::{ColorPublisher, ShutdownSignal};
use crate::runtime::stats::{LoopStats, Timer};

/// Pause after a failed capture so a dead camera does not spin the loop.
pub const CAPTURE_RETRY_DELAY: Duration = Duration::from_millis(50);

/// What the sampling worker hands back when it stops.
pub struct SamplingExit<S> {
    pub source: S,
    pub stats: LoopStats,
    /// `Err` when a frame could not be turned into a color.
    pub result: Result<(), PipelineError>,
}

/// Producer worker: capture, process, publish.
pub struct SamplingLoop<S: FrameSource> {
    source: S,
    pipeline: ColorPipeline,
    publisher: ColorPublisher,
    shutdown: ShutdownSignal,
    stats: LoopStats,
}

impl<S: FrameSource> SamplingLoop<S> {
    pub fn new(
        source: S,
        pipeline: ColorPipeline,
        publisher: ColorPublisher,
        shutdown: ShutdownSignal,
    ) -> Self {
        Self {
            source,
            pipeline,
            publisher,
            shutdown,
            stats: LoopStats::new(),
        }
    }

    /// Runs one capture and publish cycle.
    ///
    /// Returns `Ok(None)` when the capture failed; the previously published
    /// color stays current.
    pub fn tick(&mut self) -> Result<Option<PwmColor>, PipelineError> {
        self.stats.record_tick();

        let timer = Timer::start("capture");
        let frame = match self.source.capture() {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.record_failure();
                warn!(error = %e, "Failed to read from camera, keeping previous color");
                return Ok(None);
            }
        };
        let (name, duration) = timer.stop();
        self.stats.add_step(name, duration);

        let timer = Timer::start("process");
        let color = self.pipeline.process(&frame)?;
        let (name, duration) = timer.stop();
        self.stats.add_step(name, duration);

        self.publisher.publish(color);
        self.stats.record_completed();
        Ok(Some(color))
    }

    pub fn run(mut self) -> SamplingExit<S> {
        info!("Sampling loop started");

        let result = loop {
            if self.shutdown.is_triggered() {
                break Ok(());
            }
            match self.tick() {
                Ok(Some(_)) => {}
                Ok(None) => {
                    self.shutdown.wait_timeout(CAPTURE_RETRY_DELAY);
                }
                Err(e) => {
                    error!(error = %e, "Color pipeline failed, stopping");
                    self.shutdown.trigger();
                    break Err(e);
                }
            }
        };

        info!("Sampling loop stopped");
        self.stats.log_summary("sampling");
        SamplingExit {
            source: self.source,
            stats: self.stats,
            result,
        }
    }
}
