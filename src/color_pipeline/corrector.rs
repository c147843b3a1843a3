//! Per-channel color balance

use crate::color_pipeline::common::error::{PipelineError, Result};
use crate::color_pipeline::types::{RgbRatio, RgbSample};

/// Per-channel multipliers, each within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceFactors {
    r: f64,
    g: f64,
    b: f64,
}

impl Default for BalanceFactors {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl BalanceFactors {
    pub const IDENTITY: BalanceFactors = BalanceFactors {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn new(r: f64, g: f64, b: f64) -> Result<Self> {
        for (channel, value) in [("red", r), ("green", g), ("blue", b)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PipelineError::InvalidBalance { channel, value });
            }
        }
        Ok(Self { r, g, b })
    }

    pub fn r(&self) -> f64 {
        self.r
    }

    pub fn g(&self) -> f64 {
        self.g
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Multiplies each channel by its factor. No clamping or rounding.
pub fn balance(sample: RgbSample, factors: &BalanceFactors) -> RgbRatio {
    RgbRatio {
        r: sample.r as f64 * factors.r,
        g: sample.g as f64 * factors.g,
        b: sample.b as f64 * factors.b,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ColorCorrector {
    factors: BalanceFactors,
}

impl ColorCorrector {
    pub fn new(factors: BalanceFactors) -> Self {
        Self { factors }
    }

    pub fn factors(&self) -> &BalanceFactors {
        &self.factors
    }

    pub fn balance(&self, sample: RgbSample) -> RgbRatio {
        balance(sample, &self.factors)
    }
}
