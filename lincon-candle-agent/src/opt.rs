//! Optimizers of the candle networks.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Update rule of an [`Optimizer`].
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
pub enum OptimizerKind {
    /// Adam with decoupled weight decay.
    AdamW,

    /// Adam.
    Adam,
}

/// Configuration of the optimizer of an [`MlpNetwork`](crate::mlp::MlpNetwork).
///
/// Moment decays and the stabilizer keep the defaults of candle.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct OptimizerConfig {
    /// Update rule.
    pub kind: OptimizerKind,

    /// Learning rate.
    pub lr: f64,

    /// Weight decay. Only [`OptimizerKind::AdamW`] reads it.
    #[serde(default)]
    pub weight_decay: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        let params = ParamsAdamW::default();
        Self {
            kind: OptimizerKind::AdamW,
            lr: params.lr,
            weight_decay: params.weight_decay,
        }
    }
}

impl OptimizerConfig {
    /// Sets the update rule.
    pub fn kind(mut self, v: OptimizerKind) -> Self {
        self.kind = v;
        self
    }

    /// Sets the learning rate.
    pub fn lr(mut self, v: f64) -> Self {
        self.lr = v;
        self
    }

    /// Sets the weight decay.
    pub fn weight_decay(mut self, v: f64) -> Self {
        self.weight_decay = v;
        self
    }

    /// Constructs the optimizer of `vars`.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        match self.kind {
            OptimizerKind::AdamW => {
                let params = ParamsAdamW {
                    lr: self.lr,
                    weight_decay: self.weight_decay,
                    ..ParamsAdamW::default()
                };
                Ok(Optimizer::AdamW(AdamW::new(vars, params)?))
            }
            OptimizerKind::Adam => {
                let params = ParamsAdam {
                    lr: self.lr,
                    ..ParamsAdam::default()
                };
                Ok(Optimizer::Adam(Adam::new(vars, params)?))
            }
        }
    }
}

/// Optimizers.
pub enum Optimizer {
    /// AdamW optimizer.
    AdamW(AdamW),

    /// Adam optimizer.
    Adam(Adam),
}

impl Optimizer {
    /// Computes the gradients of `loss` and updates the variables.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::AdamW(opt) => Ok(opt.backward_step(loss)?),
            Self::Adam(opt) => Ok(opt.backward_step(loss)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use candle_core::Device;

    #[test]
    fn test_serde_defaults() -> Result<()> {
        let config: OptimizerConfig = serde_yaml::from_str("kind: Adam\nlr: 0.01\n")?;
        assert_eq!(
            config,
            OptimizerConfig::default()
                .kind(OptimizerKind::Adam)
                .lr(0.01)
                .weight_decay(0.0)
        );
        Ok(())
    }

    #[test]
    fn test_step_descends() -> Result<()> {
        for kind in [OptimizerKind::AdamW, OptimizerKind::Adam].iter() {
            let x = Var::new(&[2f32], &Device::Cpu)?;
            let config = OptimizerConfig::default().kind(*kind).lr(0.1);
            let mut opt = config.build(vec![x.clone()])?;
            let loss = x.as_tensor().sqr()?.sum_all()?;
            opt.backward_step(&loss)?;
            let v = x.as_tensor().to_vec1::<f32>()?[0];
            assert!(v < 2.0, "{:?}: {}", kind, v);
        }
        Ok(())
    }
}
