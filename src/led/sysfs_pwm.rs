//! LED output through the Linux sysfs PWM interface.
//!
//! Each color channel is one PWM output of a `pwmchip` device. Outputs are
//! exported on open when they are not already present, programmed with a fixed
//! period and driven by rewriting `duty_cycle`.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::color_pipeline::PwmColor;
use crate::led::actuator::LedActuator;
use crate::led::error::ActuatorError;

const EXPORT_POLL_INTERVAL: Duration = Duration::from_millis(5);
const EXPORT_POLL_ATTEMPTS: u32 = 100;

/// Channel assignment of a sysfs PWM chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SysfsPwmConfig {
    /// The `pwmchipN` directory, usually under `/sys/class/pwm`
    pub chip: PathBuf,
    /// Output index for red, green and blue
    pub channels: [u32; 3],
    /// PWM period in nanoseconds
    pub period_ns: u64,
}

impl Default for SysfsPwmConfig {
    fn default() -> Self {
        Self {
            chip: PathBuf::from("/sys/class/pwm/pwmchip0"),
            channels: [0, 1, 2],
            period_ns: 1_000_000,
        }
    }
}

#[derive(Debug)]
struct PwmOutput {
    index: u32,
    dir: PathBuf,
    exported_here: bool,
    duty_ns: Option<u64>,
}

impl PwmOutput {
    fn write_duty(&mut self, duty_ns: u64) -> Result<(), ActuatorError> {
        if self.duty_ns != Some(duty_ns) {
            write_attribute(&self.dir.join("duty_cycle"), duty_ns)?;
            self.duty_ns = Some(duty_ns);
        }
        Ok(())
    }
}

fn write_attribute(path: &Path, value: impl Display) -> Result<(), ActuatorError> {
    std::fs::write(path, value.to_string()).map_err(|source| ActuatorError::WriteError {
        path: path.to_path_buf(),
        source,
    })
}

pub struct SysfsPwmActuator {
    config: SysfsPwmConfig,
    pwm_max: f64,
    outputs: Vec<PwmOutput>,
    current: PwmColor,
    released: bool,
}

impl SysfsPwmActuator {
    /// Exports, programs and enables the three outputs, starting dark.
    pub fn open(config: SysfsPwmConfig, pwm_max: f64) -> Result<Self, ActuatorError> {
        if !(pwm_max.is_finite() && pwm_max > 0.0) {
            return Err(ActuatorError::InvalidConfig(format!(
                "pwm_max must be greater than 0, got {pwm_max}"
            )));
        }
        if config.period_ns == 0 {
            return Err(ActuatorError::InvalidConfig("PWM period must be non-zero".into()));
        }
        let [r, g, b] = config.channels;
        if r == g || g == b || r == b {
            return Err(ActuatorError::InvalidConfig(format!(
                "PWM channels must be distinct, got {:?}",
                config.channels
            )));
        }

        let mut actuator = Self {
            pwm_max,
            outputs: Vec::with_capacity(3),
            current: PwmColor::OFF,
            released: false,
            config,
        };

        // Outputs already exported are kept in the list so a failure halfway
        // through still unexports them on drop
        let period_ns = actuator.config.period_ns;
        for index in actuator.config.channels {
            let mut output = actuator.export(index)?;
            let setup = output
                .write_duty(0)
                .and_then(|_| write_attribute(&output.dir.join("period"), period_ns))
                .and_then(|_| write_attribute(&output.dir.join("enable"), 1));
            actuator.outputs.push(output);
            setup?;
        }

        info!(
            chip = %actuator.config.chip.display(),
            channels = ?actuator.config.channels,
            period_ns = actuator.config.period_ns,
            "Opened sysfs PWM outputs"
        );
        Ok(actuator)
    }

    fn export(&self, index: u32) -> Result<PwmOutput, ActuatorError> {
        let dir = self.config.chip.join(format!("pwm{index}"));
        let mut exported_here = false;

        if !dir.is_dir() {
            debug!(index, "Exporting PWM output");
            write_attribute(&self.config.chip.join("export"), index)?;
            exported_here = true;

            let mut attempts = 0;
            while !dir.is_dir() {
                if attempts == EXPORT_POLL_ATTEMPTS {
                    return Err(ActuatorError::ExportTimeout {
                        chip: self.config.chip.clone(),
                        channel: index,
                    });
                }
                std::thread::sleep(EXPORT_POLL_INTERVAL);
                attempts += 1;
            }
        }

        Ok(PwmOutput {
            index,
            dir,
            exported_here,
            duty_ns: None,
        })
    }

    fn duty_for(&self, value: f64) -> u64 {
        (value / self.pwm_max * self.config.period_ns as f64).round() as u64
    }

    pub fn config(&self) -> &SysfsPwmConfig {
        &self.config
    }
}

impl LedActuator for SysfsPwmActuator {
    fn set(&mut self, color: PwmColor) -> Result<(), ActuatorError> {
        if self.released {
            return Err(ActuatorError::Released);
        }
        let color = color.clamp(self.pwm_max);
        let duties = [
            self.duty_for(color.r),
            self.duty_for(color.g),
            self.duty_for(color.b),
        ];

        // Channels already written stay applied when a later write fails
        for (channel, (output, duty)) in self.outputs.iter_mut().zip(duties).enumerate() {
            output.write_duty(duty)?;
            match channel {
                0 => self.current.r = color.r,
                1 => self.current.g = color.g,
                _ => self.current.b = color.b,
            }
        }
        Ok(())
    }

    fn current(&self) -> PwmColor {
        self.current
    }

    fn pwm_max(&self) -> f64 {
        self.pwm_max
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        if self.released {
            return Ok(());
        }
        self.released = true;
        self.current = PwmColor::OFF;

        // Every output is shut down even if an earlier one fails
        let mut first_error = None;
        for output in &mut self.outputs {
            let result = output
                .write_duty(0)
                .and_then(|_| write_attribute(&output.dir.join("enable"), 0))
                .and_then(|_| {
                    if output.exported_here {
                        write_attribute(&self.config.chip.join("unexport"), output.index)
                    } else {
                        Ok(())
                    }
                });
            if let Err(e) = result {
                warn!(index = output.index, error = %e, "Failed to release PWM output");
                first_error.get_or_insert(e);
            }
        }

        info!(chip = %self.config.chip.display(), "Released sysfs PWM outputs");
        first_error.map_or(Ok(()), Err)
    }
}

impl Drop for SysfsPwmActuator {
    fn drop(&mut self) {
        if let Err(e) = self.release() {
            warn!(error = %e, "PWM release on drop failed");
        }
    }
}
