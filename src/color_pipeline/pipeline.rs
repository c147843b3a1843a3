//! Frame to LED color composition
//!
//! Runs sampling, balancing and scaling in order. A failing stage ends the
//! call with its own error.

use tracing::{debug, instrument};

use crate::color_pipeline::{
    common::error::Result,
    config::PipelineConfig,
    corrector::{BalanceFactors, ColorCorrector, balance},
    frame::Frame,
    sampler::{ColorSampler, SampleRegion, average_of_region},
    scaler::{PwmScaler, scale_to_pwm},
    types::PwmColor,
};

/// Samples, balances and scales one frame. Errors from any stage are returned as is.
pub fn process(
    frame: &Frame,
    region: &SampleRegion,
    factors: &BalanceFactors,
    pwm_max: f64,
) -> Result<PwmColor> {
    let sample = average_of_region(frame, region)?;
    let ratio = balance(sample, factors);
    scale_to_pwm(ratio, pwm_max)
}

/// Sampler, corrector and scaler built from one validated configuration.
#[derive(Debug, Clone)]
pub struct ColorPipeline {
    sampler: ColorSampler,
    corrector: ColorCorrector,
    scaler: PwmScaler,
    config: PipelineConfig,
}

impl ColorPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            sampler: ColorSampler::new(config.region)?,
            corrector: ColorCorrector::new(config.balance),
            scaler: PwmScaler::new(config.pwm_max)?,
            config,
        })
    }

    #[instrument(level = "trace", skip(self, frame), fields(height = frame.height(), width = frame.width()))]
    pub fn process(&self, frame: &Frame) -> Result<PwmColor> {
        let sample = {
            let _span = tracing::trace_span!("sample_region").entered();
            self.sampler.sample(frame)?
        };

        let ratio = {
            let _span = tracing::trace_span!("balance").entered();
            self.corrector.balance(sample)
        };

        let color = {
            let _span = tracing::trace_span!("scale_to_pwm").entered();
            self.scaler.scale(ratio)?
        };

        debug!(
            r_avg = sample.r,
            g_avg = sample.g,
            b_avg = sample.b,
            r = color.r,
            g = color.g,
            b = color.b,
            "Processed frame"
        );
        Ok(color)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn pwm_max(&self) -> f64 {
        self.scaler.pwm_max()
    }
}
