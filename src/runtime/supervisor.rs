use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{Dispatch, debug, error, info, instrument, warn};

use crate::color_pipeline::{ColorPipeline, FrameSource, PwmColor, SnapshotWriter, save_snapshot};
use crate::led::LedActuator;
use crate::runtime::actuation_loop::{ActuationExit, ActuationLoop};
use crate::runtime::error::SupervisorError;
use crate::runtime::sampling_loop::{SamplingExit, SamplingLoop};
use crate::runtime::shared::{
    CurrentColor, ExitGuard, ExitLatch, Published, ShutdownSignal, current_color,
};
use crate::runtime::stats::LoopStats;

/// Timing and fade behavior of the worker loops
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSettings {
    /// Fraction of `pwm_max` each channel may move per actuation tick; `None` sets colors directly
    pub fade_step: Option<f64>,
    /// Pause between actuator updates
    pub actuation_tick: Duration,
    /// How often the supervisor wakes while waiting for the workers
    pub shutdown_poll: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            fade_step: None,
            actuation_tick: Duration::from_millis(10),
            shutdown_poll: Duration::from_millis(500),
        }
    }
}

impl LoopSettings {
    pub fn validate(&self) -> Result<(), SupervisorError> {
        if let Some(step) = self.fade_step {
            if !(step > 0.0 && step <= 1.0) {
                return Err(SupervisorError::InvalidSettings(format!(
                    "fade step must be within (0, 1], got {step}"
                )));
            }
        }
        if self.shutdown_poll.is_zero() {
            return Err(SupervisorError::InvalidSettings(
                "shutdown poll interval must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Running,
    ShuttingDown,
    Stopped,
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub sampling: LoopStats,
    pub actuation: LoopStats,
    /// Last color the sampling loop published
    pub last_published: Published,
}

struct Workers<S, A> {
    sampling: JoinHandle<SamplingExit<S>>,
    actuation: JoinHandle<ActuationExit<A>>,
    latch: Arc<ExitLatch>,
    current: CurrentColor,
}

/// Owns the frame source, the actuator and both worker loops.
///
/// `Idle -> Running -> ShuttingDown -> Stopped`, or `Idle -> Stopped` through
/// the self-test. The actuator is released exactly once, after both workers
/// have exited.
pub struct Supervisor<S: FrameSource + 'static, A: LedActuator + 'static> {
    state: SupervisorState,
    pipeline: ColorPipeline,
    settings: LoopSettings,
    source: Option<S>,
    actuator: Option<A>,
    released: bool,
    shutdown: ShutdownSignal,
    current: Option<CurrentColor>,
    dispatch: Dispatch,
    workers: Option<Workers<S, A>>,
}

impl<S: FrameSource + 'static, A: LedActuator + 'static> Supervisor<S, A> {
    /// Workers log through the dispatcher that is current on the calling thread.
    pub fn new(
        pipeline: ColorPipeline,
        source: S,
        actuator: A,
        settings: LoopSettings,
    ) -> Result<Self, SupervisorError> {
        settings.validate()?;
        Ok(Self {
            state: SupervisorState::Idle,
            pipeline,
            settings,
            source: Some(source),
            actuator: Some(actuator),
            released: false,
            shutdown: ShutdownSignal::new(),
            current: None,
            dispatch: tracing::dispatcher::get_default(Dispatch::clone),
            workers: None,
        })
    }

    /// Routes worker logging to `dispatch` instead.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Handle for requesting shutdown from elsewhere, such as an interrupt handler.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Latest published color, once the loops have been started.
    pub fn current_color(&self) -> Option<Published> {
        self.current.as_ref().map(CurrentColor::latest)
    }

    pub fn actuator(&self) -> Option<&A> {
        self.actuator.as_ref()
    }

    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    fn expect_state(
        &self,
        operation: &'static str,
        allowed: &[SupervisorState],
    ) -> Result<(), SupervisorError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SupervisorError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Starts the sampling and actuation workers.
    #[instrument(skip(self))]
    pub fn start(&mut self) -> Result<(), SupervisorError> {
        self.expect_state("start", &[SupervisorState::Idle])?;
        let (Some(source), Some(actuator)) = (self.source.take(), self.actuator.take()) else {
            return Err(SupervisorError::InvalidState {
                operation: "start",
                state: self.state,
            });
        };

        let (publisher, current) = current_color(PwmColor::OFF);
        let latch = ExitLatch::new(2);

        let sampling = SamplingLoop::new(
            source,
            self.pipeline.clone(),
            publisher,
            self.shutdown.clone(),
        );
        let actuation = ActuationLoop::new(
            actuator,
            current.clone(),
            self.shutdown.clone(),
            self.settings.fade_step,
            self.settings.actuation_tick,
        );

        let sampling = match self.spawn_worker("sampling", &latch, move || sampling.run()) {
            Ok(handle) => handle,
            Err(e) => {
                self.actuator = Some(actuation.into_actuator());
                if let Err(release) = self.release_actuator() {
                    warn!(error = %release, "Actuator release after failed start failed");
                }
                self.state = SupervisorState::Stopped;
                return Err(e);
            }
        };
        let actuation = match self.spawn_worker("actuation", &latch, move || actuation.run()) {
            Ok(handle) => handle,
            Err(e) => {
                // The actuator went down with the unspawned closure
                self.shutdown.trigger();
                if let Ok(exit) = sampling.join() {
                    self.source = Some(exit.source);
                }
                self.released = true;
                self.state = SupervisorState::Stopped;
                return Err(e);
            }
        };

        self.current = Some(current.clone());
        self.workers = Some(Workers {
            sampling,
            actuation,
            latch,
            current,
        });
        self.state = SupervisorState::Running;
        info!("Supervisor running");
        Ok(())
    }

    fn spawn_worker<T, F>(
        &self,
        worker: &'static str,
        latch: &Arc<ExitLatch>,
        body: F,
    ) -> Result<JoinHandle<T>, SupervisorError>
    where
        T: Send + 'static,
        F: FnOnce() -> T + Send + 'static,
    {
        let dispatch = self.dispatch.clone();
        let guard = ExitGuard(Arc::clone(latch));
        thread::Builder::new()
            .name(worker.to_string())
            .spawn(move || {
                let _guard = guard;
                tracing::dispatcher::with_default(&dispatch, body)
            })
            .map_err(|source| SupervisorError::SpawnError { worker, source })
    }

    /// Asks both workers to stop. Safe to call any number of times.
    pub fn request_stop(&self) {
        if self.shutdown.trigger() {
            info!("Shutdown requested");
        }
    }

    /// Blocks until both workers have exited, then releases the actuator.
    ///
    /// A worker that stops on its own takes the other one down with it and the
    /// failure is returned after cleanup.
    pub fn wait(&mut self) -> Result<RunReport, SupervisorError> {
        self.expect_state(
            "wait",
            &[SupervisorState::Running, SupervisorState::ShuttingDown],
        )?;
        let Some(workers) = self.workers.take() else {
            return Err(SupervisorError::InvalidState {
                operation: "wait",
                state: self.state,
            });
        };

        loop {
            if self.shutdown.is_triggered() && self.state == SupervisorState::Running {
                self.state = SupervisorState::ShuttingDown;
                info!("Supervisor shutting down");
            }
            if workers.latch.wait_timeout(self.settings.shutdown_poll) {
                break;
            }
            if !self.shutdown.is_triggered() && workers.latch.remaining() < 2 {
                warn!("A worker stopped unexpectedly, shutting down");
                self.shutdown.trigger();
            }
            debug!(remaining = workers.latch.remaining(), "Waiting for workers");
        }
        self.state = SupervisorState::ShuttingDown;

        let sampling = workers.sampling.join();
        let actuation = workers.actuation.join();

        let mut outcome = Ok(());
        let mut sampling_stats = LoopStats::new();
        let mut actuation_stats = LoopStats::new();

        match sampling {
            Ok(exit) => {
                self.source = Some(exit.source);
                sampling_stats = exit.stats;
                if let Err(e) = exit.result {
                    outcome = Err(SupervisorError::Pipeline(e));
                }
            }
            Err(_) => {
                error!("Sampling worker panicked");
                outcome = Err(SupervisorError::WorkerPanicked("sampling"));
            }
        }

        match actuation {
            Ok(exit) => {
                self.actuator = Some(exit.actuator);
                actuation_stats = exit.stats;
            }
            Err(_) => {
                error!("Actuation worker panicked");
                // Unwinding dropped the actuator
                self.released = true;
                if outcome.is_ok() {
                    outcome = Err(SupervisorError::WorkerPanicked("actuation"));
                }
            }
        }

        let released = self.release_actuator();
        self.state = SupervisorState::Stopped;
        info!("Supervisor stopped");

        outcome?;
        released?;
        Ok(RunReport {
            sampling: sampling_stats,
            actuation: actuation_stats,
            last_published: workers.current.latest(),
        })
    }

    /// Starts the workers and blocks until they stop.
    pub fn run(&mut self) -> Result<RunReport, SupervisorError> {
        self.start()?;
        self.wait()
    }

    /// Captures one frame to a snapshot file and plays the actuator test sequence.
    ///
    /// The worker loops are never started. A failed capture only skips the
    /// snapshot.
    #[instrument(skip(self, writer, path), fields(snapshot = %path.as_ref().display()))]
    pub fn run_test_mode<W: SnapshotWriter + ?Sized, P: AsRef<Path>>(
        &mut self,
        writer: &W,
        path: P,
        hold: Duration,
    ) -> Result<(), SupervisorError> {
        self.expect_state("run the self-test", &[SupervisorState::Idle])?;
        let (Some(source), Some(actuator)) = (self.source.as_mut(), self.actuator.as_mut()) else {
            return Err(SupervisorError::InvalidState {
                operation: "run the self-test",
                state: self.state,
            });
        };

        let snapshot = match source.capture() {
            Ok(frame) => save_snapshot(writer, &frame, path).map_err(SupervisorError::from),
            Err(e) => {
                warn!(error = %e, "Failed to read from camera, skipping snapshot");
                Ok(())
            }
        };

        info!("Running LED test sequence");
        let sequence = actuator.test_sequence(hold);

        self.shutdown.trigger();
        let released = self.release_actuator();
        self.state = SupervisorState::Stopped;

        snapshot?;
        sequence?;
        released?;
        Ok(())
    }

    fn release_actuator(&mut self) -> Result<(), SupervisorError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        if let Some(actuator) = self.actuator.as_mut() {
            actuator.release()?;
            info!("LED actuator released");
        }
        Ok(())
    }
}

impl<S: FrameSource + 'static, A: LedActuator + 'static> Drop for Supervisor<S, A> {
    fn drop(&mut self) {
        if self.workers.is_some() {
            self.shutdown.trigger();
            if let Err(e) = self.wait() {
                warn!(error = %e, "Worker shutdown on drop failed");
            }
        } else if let Err(e) = self.release_actuator() {
            warn!(error = %e, "Actuator release on drop failed");
        }
    }
}
