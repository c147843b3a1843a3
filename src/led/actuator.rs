use std::time::Duration;

use tracing::info;

use crate::color_pipeline::PwmColor;
use crate::led::error::ActuatorError;

/// Three channel PWM output.
///
/// Implementations clamp commanded colors to `[0, pwm_max]` and must accept
/// `release` any number of times.
pub trait LedActuator: Send {
    fn set(&mut self, color: PwmColor) -> Result<(), ActuatorError>;

    /// Last commanded color.
    fn current(&self) -> PwmColor;

    fn pwm_max(&self) -> f64;

    /// Turns the outputs off and gives the hardware back. Idempotent.
    fn release(&mut self) -> Result<(), ActuatorError>;

    /// Takes one fade step toward `target` and returns the commanded color.
    ///
    /// Each channel moves by at most `step * pwm_max`, so a step of 0.1 crosses
    /// the full range in ten calls.
    fn fade(&mut self, target: PwmColor, step: f64) -> Result<PwmColor, ActuatorError> {
        let next = self
            .current()
            .step_toward(target, step * self.pwm_max());
        self.set(next)?;
        Ok(next)
    }

    /// Shows red, green, blue, white and off, holding each for `hold`.
    fn test_sequence(&mut self, hold: Duration) -> Result<(), ActuatorError> {
        let max = self.pwm_max();
        let steps = [
            ("red", PwmColor::new(max, 0.0, 0.0)),
            ("green", PwmColor::new(0.0, max, 0.0)),
            ("blue", PwmColor::new(0.0, 0.0, max)),
            ("white", PwmColor::uniform(max)),
            ("off", PwmColor::OFF),
        ];

        for (name, color) in steps {
            info!(color = name, "LED test sequence");
            self.set(color)?;
            std::thread::sleep(hold);
        }
        Ok(())
    }
}

impl<A: LedActuator + ?Sized> LedActuator for Box<A> {
    fn set(&mut self, color: PwmColor) -> Result<(), ActuatorError> {
        (**self).set(color)
    }

    fn current(&self) -> PwmColor {
        (**self).current()
    }

    fn pwm_max(&self) -> f64 {
        (**self).pwm_max()
    }

    fn release(&mut self) -> Result<(), ActuatorError> {
        (**self).release()
    }

    fn fade(&mut self, target: PwmColor, step: f64) -> Result<PwmColor, ActuatorError> {
        (**self).fade(target, step)
    }

    fn test_sequence(&mut self, hold: Duration) -> Result<(), ActuatorError> {
        (**self).test_sequence(hold)
    }
}
