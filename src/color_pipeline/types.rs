//! Color value types flowing through the pipeline

/// Raw per-channel intensities averaged over a frame region.
///
/// Channels are 64-bit so that sums over full frames cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RgbSample {
    pub r: u64,
    pub g: u64,
    pub b: u64,
}

impl RgbSample {
    pub const fn new(r: u64, g: u64, b: u64) -> Self {
        Self { r, g, b }
    }
}

/// Channel values after balancing; fractional, never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RgbRatio {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl RgbRatio {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn min_channel(&self) -> f64 {
        self.r.min(self.g).min(self.b)
    }

    pub fn max_channel(&self) -> f64 {
        self.r.max(self.g).max(self.b)
    }
}

impl From<RgbSample> for RgbRatio {
    fn from(sample: RgbSample) -> Self {
        Self {
            r: sample.r as f64,
            g: sample.g as f64,
            b: sample.b as f64,
        }
    }
}

/// Actuation target, each channel within `[0, pwm_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PwmColor {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl PwmColor {
    /// All channels off; the neutral value an actuator starts from.
    pub const OFF: PwmColor = PwmColor::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value)
    }

    pub fn max_channel(&self) -> f64 {
        self.r.max(self.g).max(self.b)
    }

    pub fn clamp(self, pwm_max: f64) -> Self {
        Self {
            r: self.r.clamp(0.0, pwm_max),
            g: self.g.clamp(0.0, pwm_max),
            b: self.b.clamp(0.0, pwm_max),
        }
    }

    /// Moves every channel toward `target` by at most `max_delta`.
    ///
    /// Channels never overshoot and land exactly on the target once they are
    /// within `max_delta` of it. A non-positive `max_delta` jumps straight to
    /// the target.
    pub fn step_toward(self, target: PwmColor, max_delta: f64) -> Self {
        if !(max_delta > 0.0) {
            return target;
        }
        let step = |from: f64, to: f64| {
            let delta = to - from;
            if delta.abs() <= max_delta {
                to
            } else {
                from + max_delta.copysign(delta)
            }
        };
        Self {
            r: step(self.r, target.r),
            g: step(self.g, target.g),
            b: step(self.b, target.b),
        }
    }
}
