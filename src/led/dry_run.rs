use tracing::{debug, info};

use crate::color_pipeline::PwmColor;
use crate::led::actuator::LedActuator;
use crate::led::error::ActuatorError;

/// Actuator for running without LED hardware; commanded colors are logged.
#[derive(Debug)]
pub struct DryRunActuator {
    pwm_max: f64,
    current: PwmColor,
    writes: u64,
    released: bool,
}

impl DryRunActuator {
    pub fn new(pwm_max: f64) -> Result<Self, ActuatorError> {
        if !(pwm_max.is_finite() && pwm_max > 0.0) {
            return Err(ActuatorError::InvalidConfig(format!(
                "pwm_max must be greater than 0, got {pwm_max}"
            )));
        }
        Ok(Self {
            pwm_max,
            current: PwmColor::OFF,
            writes: 0,
            released: false,
        })
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl LedActuator for DryRunActuator {
    fn set(&mut self, color: PwmColor) -> Result<(), ActuatorError> {
        if self.released {
            return Err(ActuatorError::Released);
        }
        let color = color.clamp(self.pwm_max);
        if color != self.current {
            debug!(r = color.r, g = color.g, b = color.b, "Dry run LED output");
        }
        self.current = color;
        self.writes += 1;
        Ok(())
    }

    fn current(&self) -> PwmColor {
        self.current
    }

    fn pwm_max(&self) -> f64 {
        self.pwm_max
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        if !self.released {
            info!(writes = self.writes, "Releasing dry run LED output");
            self.current = PwmColor::OFF;
            self.released = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_set_clamps_to_range() {
        let mut actuator = DryRunActuator::new(100.0).unwrap();

        actuator.set(PwmColor::new(150.0, -3.0, 50.0)).unwrap();

        assert_eq!(actuator.current(), PwmColor::new(100.0, 0.0, 50.0));
    }

    #[test]
    fn test_fade_steps_toward_target() {
        let mut actuator = DryRunActuator::new(100.0).unwrap();
        let target = PwmColor::new(100.0, 25.0, 0.0);

        let first = actuator.fade(target, 0.1).unwrap();
        assert_eq!(first, PwmColor::new(10.0, 10.0, 0.0));

        let mut steps = 1;
        while actuator.current() != target {
            actuator.fade(target, 0.1).unwrap();
            steps += 1;
        }
        assert_eq!(steps, 10);
    }

    #[test]
    fn test_sequence_ends_off() {
        let mut actuator = DryRunActuator::new(255.0).unwrap();

        actuator.test_sequence(Duration::ZERO).unwrap();

        assert_eq!(actuator.writes(), 5);
        assert_eq!(actuator.current(), PwmColor::OFF);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut actuator = DryRunActuator::new(100.0).unwrap();
        actuator.set(PwmColor::uniform(40.0)).unwrap();

        actuator.release().unwrap();
        actuator.release().unwrap();

        assert!(actuator.is_released());
        assert_eq!(actuator.current(), PwmColor::OFF);
        assert!(matches!(
            actuator.set(PwmColor::uniform(1.0)),
            Err(ActuatorError::Released)
        ));
    }

    #[test]
    fn test_rejects_non_positive_pwm_max() {
        assert!(DryRunActuator::new(0.0).is_err());
    }
}
