//! Exploration noise.
use crate::{context::LearningContext, error::LinconError, schedule::Schedule};
use anyhow::Result;
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Configuration of [`GaussianNoise`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct GaussianNoiseConfig {
    /// Standard deviation of the unscaled noise.
    pub sigma: f64,

    /// Low-pass filter gain; `1.0` gives white noise.
    pub alpha: f64,

    /// Scale applied to the filtered noise.
    pub scale: Schedule,

    /// Seed of the random generator.
    pub seed: u64,
}

impl Default for GaussianNoiseConfig {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            alpha: 1.0,
            scale: Schedule::Constant(1.0),
            seed: 42,
        }
    }
}

impl GaussianNoiseConfig {
    /// Sets the standard deviation.
    pub fn sigma(mut self, v: f64) -> Self {
        self.sigma = v;
        self
    }

    /// Sets the low-pass filter gain.
    pub fn alpha(mut self, v: f64) -> Self {
        self.alpha = v;
        self
    }

    /// Sets the scale.
    pub fn scale(mut self, v: Schedule) -> Self {
        self.scale = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }
}

/// Low-pass filtered Gaussian noise with a scheduled scale.
#[derive(Debug, Clone)]
pub struct GaussianNoise {
    sigma: f64,
    alpha: f64,
    scale: Schedule,
    normal: Normal<f64>,
    last_value: f64,
    rng: StdRng,
}

impl GaussianNoise {
    /// Creates the noise. Fails if `sigma` is negative or not finite.
    pub fn build(config: &GaussianNoiseConfig) -> Result<Self> {
        if !(config.sigma >= 0.0 && config.sigma.is_finite()) {
            return Err(LinconError::InvalidParameter(format!(
                "noise sigma must be finite and non-negative, got {}",
                config.sigma
            ))
            .into());
        }

        Ok(Self {
            sigma: config.sigma,
            alpha: config.alpha,
            scale: config.scale.clone(),
            normal: Normal::new(0.0, config.sigma)?,
            last_value: 0.0,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Draws the next sample.
    pub fn sample(&mut self, ctx: &LearningContext) -> f64 {
        let value = if self.sigma != 0.0 {
            self.normal.sample(&mut self.rng)
        } else {
            0.0
        };
        self.last_value = self.alpha * value + (1.0 - self.alpha) * self.last_value;
        self.last_value * self.scale.get(ctx)
    }

    /// Removes the current scale from a scaled sample.
    pub fn unscale(&self, noise: f64, ctx: &LearningContext) -> f64 {
        let scale = self.scale.get(ctx);
        if scale != 0.0 {
            noise / scale
        } else {
            noise
        }
    }

    /// Standard deviation of the unscaled noise.
    pub fn variance(&self) -> f64 {
        self.sigma
    }

    /// Density of the unscaled distribution at the unscaled `noise`.
    pub fn sample_probability(&self, noise: f64, ctx: &LearningContext) -> f64 {
        let x = self.unscale(noise, ctx);
        if self.sigma == 0.0 {
            return if x == 0.0 { 1.0 } else { 0.0 };
        }
        let z = x / self.sigma;
        (-0.5 * z * z).exp() / (self.sigma * (2.0 * PI).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_and_probability() -> Result<()> {
        let config = GaussianNoiseConfig::default()
            .sigma(0.5)
            .scale(Schedule::Constant(2.0));
        let mut noise = GaussianNoise::build(&config)?;
        let ctx = LearningContext::default();

        let n = noise.sample(&ctx);
        assert_eq!(noise.unscale(n, &ctx), n / 2.0);
        let peak = 1.0 / (0.5 * (2.0 * PI).sqrt());
        assert!((noise.sample_probability(0.0, &ctx) - peak).abs() < 1e-12);
        assert!(noise.sample_probability(1.0, &ctx) < peak);
        Ok(())
    }

    #[test]
    fn test_sample_statistics() -> Result<()> {
        let mut noise = GaussianNoise::build(&GaussianNoiseConfig::default().sigma(0.3))?;
        let ctx = LearningContext::default();
        let samples: Vec<f64> = (0..20000).map(|_| noise.sample(&ctx)).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.02);
        assert!((var.sqrt() - 0.3).abs() < 0.02);
        Ok(())
    }

    #[test]
    fn test_invalid_sigma() {
        for sigma in [-1.0, f64::NAN, f64::INFINITY].iter() {
            let err = GaussianNoise::build(&GaussianNoiseConfig::default().sigma(*sigma))
                .unwrap_err();
            assert!(matches!(
                err.downcast_ref::<LinconError>(),
                Some(LinconError::InvalidParameter(_))
            ));
        }
        assert!(GaussianNoise::build(&GaussianNoiseConfig::default().sigma(0.0)).is_ok());
    }
}
