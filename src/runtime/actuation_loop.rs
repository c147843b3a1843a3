use std::time::Duration;

use tracing::{info, warn};

use crate::color_pipeline::PwmColor;
use crate::led::{ActuatorError, LedActuator};
use crate::runtime::shared::{CurrentColor, ShutdownSignal};
use crate::runtime::stats::{LoopStats, Timer};

/// What the actuation worker hands back when it stops.
pub struct ActuationExit<A> {
    pub actuator: A,
    pub stats: LoopStats,
}

/// Consumer worker: drives the actuator toward the latest published color.
///
/// Never waits for a new color. Each tick re-applies, or keeps fading toward,
/// whatever is current.
pub struct ActuationLoop<A: LedActuator> {
    actuator: A,
    current: CurrentColor,
    shutdown: ShutdownSignal,
    fade_step: Option<f64>,
    tick_interval: Duration,
    stats: LoopStats,
}

impl<A: LedActuator> ActuationLoop<A> {
    pub fn new(
        actuator: A,
        current: CurrentColor,
        shutdown: ShutdownSignal,
        fade_step: Option<f64>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            actuator,
            current,
            shutdown,
            fade_step,
            tick_interval,
            stats: LoopStats::new(),
        }
    }

    pub fn into_actuator(self) -> A {
        self.actuator
    }

    /// Commands the actuator once and returns the color it was given.
    pub fn tick(&mut self) -> Result<PwmColor, ActuatorError> {
        self.stats.record_tick();
        let target = self.current.color();

        let timer = Timer::start("actuate");
        let commanded = match self.fade_step {
            Some(step) => self.actuator.fade(target, step)?,
            None => {
                self.actuator.set(target)?;
                target
            }
        };
        let (name, duration) = timer.stop();
        self.stats.add_step(name, duration);

        self.stats.record_completed();
        Ok(commanded)
    }

    pub fn run(mut self) -> ActuationExit<A> {
        info!(fade_step = ?self.fade_step, "Actuation loop started");

        while !self.shutdown.is_triggered() {
            if let Err(e) = self.tick() {
                self.stats.record_failure();
                warn!(error = %e, "Failed to drive LEDs");
            }
            if self.shutdown.wait_timeout(self.tick_interval) {
                break;
            }
        }

        info!("Actuation loop stopped");
        self.stats.log_summary("actuation");
        ActuationExit {
            actuator: self.actuator,
            stats: self.stats,
        }
    }
}
