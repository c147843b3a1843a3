//! Scaling a balanced color into the PWM output range
//!
//! Scaling widens the color first: the smallest channel is subtracted from
//! every channel and 1 added back, so every channel is at least 1 and the
//! differences between channels dominate. The result is then normalized so
//! the brightest channel lands exactly on `pwm_max`.

use tracing::trace;

use crate::color_pipeline::common::error::{PipelineError, Result};
use crate::color_pipeline::types::{PwmColor, RgbRatio};

/// Default upper bound accepted by the PWM driver.
pub const DEFAULT_PWM_MAX: f64 = 100.0;

pub fn validate_pwm_max(pwm_max: f64) -> Result<()> {
    if pwm_max.is_finite() && pwm_max > 0.0 {
        Ok(())
    } else {
        Err(PipelineError::InvalidPwmMax(pwm_max))
    }
}

/// Widens and normalizes `ratio` so its brightest channel equals `pwm_max`.
pub fn scale_to_pwm(ratio: RgbRatio, pwm_max: f64) -> Result<PwmColor> {
    let min = ratio.min_channel();
    let widened = RgbRatio {
        r: ratio.r - min + 1.0,
        g: ratio.g - min + 1.0,
        b: ratio.b - min + 1.0,
    };

    let max = widened.max_channel();
    let finite = [widened.r, widened.g, widened.b]
        .iter()
        .all(|channel| channel.is_finite());
    if !(finite && max > 0.0 && pwm_max > 0.0 && pwm_max.is_finite()) {
        return Err(PipelineError::DegenerateColor { max, pwm_max });
    }

    let scale_factor = pwm_max / max;
    trace!(max, pwm_max, scale_factor, "Scaling widened color");

    // The brightest channel is pinned so rounding cannot leave it off pwm_max
    let scale = |channel: f64| {
        if channel >= max {
            pwm_max
        } else {
            (channel * scale_factor).clamp(0.0, pwm_max)
        }
    };

    Ok(PwmColor {
        r: scale(widened.r),
        g: scale(widened.g),
        b: scale(widened.b),
    })
}

#[derive(Debug, Clone, Copy)]
pub struct PwmScaler {
    pwm_max: f64,
}

impl Default for PwmScaler {
    fn default() -> Self {
        Self {
            pwm_max: DEFAULT_PWM_MAX,
        }
    }
}

impl PwmScaler {
    pub fn new(pwm_max: f64) -> Result<Self> {
        validate_pwm_max(pwm_max)?;
        Ok(Self { pwm_max })
    }

    pub fn pwm_max(&self) -> f64 {
        self.pwm_max
    }

    pub fn scale(&self, ratio: RgbRatio) -> Result<PwmColor> {
        scale_to_pwm(ratio, self.pwm_max)
    }
}
