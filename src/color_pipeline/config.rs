//! Color pipeline configuration types

use crate::color_pipeline::common::error::Result;
use crate::color_pipeline::corrector::BalanceFactors;
use crate::color_pipeline::sampler::SampleRegion;
use crate::color_pipeline::scaler::{DEFAULT_PWM_MAX, validate_pwm_max};

/// Configuration for turning frames into PWM colors
///
/// Fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Part of the frame that is averaged
    pub region: SampleRegion,
    /// Per-channel balance applied to the average
    pub balance: BalanceFactors,
    /// Value the brightest channel is scaled to
    pub pwm_max: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            region: SampleRegion::default(),
            balance: BalanceFactors::default(),
            pwm_max: DEFAULT_PWM_MAX,
        }
    }
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        self.region.validate()?;
        BalanceFactors::new(self.balance.r(), self.balance.g(), self.balance.b())?;
        validate_pwm_max(self.pwm_max)
    }
}

/// Builder for PipelineConfig
#[derive(Default)]
pub struct PipelineConfigBuilder {
    region: Option<SampleRegion>,
    balance: Option<(f64, f64, f64)>,
    pwm_max: Option<f64>,
}

impl PipelineConfigBuilder {
    pub fn region(mut self, region: SampleRegion) -> Self {
        self.region = Some(region);
        self
    }

    pub fn balance(mut self, r: f64, g: f64, b: f64) -> Self {
        self.balance = Some((r, g, b));
        self
    }

    pub fn pwm_max(mut self, pwm_max: f64) -> Self {
        self.pwm_max = Some(pwm_max);
        self
    }

    pub fn build(self) -> Result<PipelineConfig> {
        let default = PipelineConfig::default();
        let balance = match self.balance {
            Some((r, g, b)) => BalanceFactors::new(r, g, b)?,
            None => default.balance,
        };
        let config = PipelineConfig {
            region: self.region.unwrap_or(default.region),
            balance,
            pwm_max: self.pwm_max.unwrap_or(default.pwm_max),
        };
        config.validate()?;
        Ok(config)
    }
}
