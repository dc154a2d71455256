use super::MlpNetworkConfig;
use crate::{
    network::{Minibatch, Network},
    opt::Optimizer,
    util::{rows_to_tensor, track},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor, Var};
use candle_nn::{linear, loss::mse, Linear, Module, VarBuilder, VarMap};
use lincon_core::error::LinconError;
use log::{info, trace};
use std::convert::TryFrom;

/// Returns the linear layers from the input to the output of [`MlpNetworkConfig`].
fn create_linear_layers(
    prefix: &str,
    vs: VarBuilder,
    config: &MlpNetworkConfig,
) -> Result<Vec<Linear>> {
    let mut dims = vec![config.in_dim()];
    dims.extend(config.units.iter());
    dims.push(config.out_dim);
    let vs = vs.pp(prefix);

    dims.windows(2)
        .enumerate()
        .map(|(i, d)| -> Result<Linear> {
            Ok(linear(d[0], d[1], vs.pp(format!("ln{}", i)))?)
        })
        .collect()
}

fn to_f64(xs: &Tensor) -> Result<Vec<f64>> {
    Ok(xs
        .flatten_all()?
        .to_vec1::<f32>()?
        .into_iter()
        .map(|x| x as f64)
        .collect())
}

/// Multilayer perceptron with ReLU activation functions in the hidden layers.
///
/// The input is the concatenation of the state and the action.
pub struct MlpNetwork {
    config: MlpNetworkConfig,
    device: Device,
    varmap: VarMap,
    layers: Vec<Linear>,
    opt: Optimizer,
    tau: f64,
}

impl MlpNetwork {
    /// Constructs [`MlpNetwork`] with randomly initialized parameters.
    pub fn build(config: MlpNetworkConfig) -> Result<Self> {
        let device = Device::try_from(config.device)?;
        let varmap = VarMap::new();
        let layers = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            create_linear_layers("mlp", vb, &config)?
        };
        let opt = config.opt_config.build(varmap.all_vars())?;
        info!(
            "MLP {} -> {:?} -> {}",
            config.in_dim(),
            config.units,
            config.out_dim
        );

        Ok(Self {
            config,
            device,
            varmap,
            layers,
            opt,
            tau: 1.0,
        })
    }

    /// Configuration of the network.
    pub fn config(&self) -> &MlpNetworkConfig {
        &self.config
    }

    /// Parameters of the network.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let n_layers = self.layers.len();
        let mut xs = xs.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            xs = layer.forward(&xs)?;
            if i + 1 < n_layers {
                xs = xs.relu()?;
            }
        }
        self.config.activation_out.forward(&xs)
    }

    fn input(&self, s: &[f64], a: &[f64]) -> Result<Tensor> {
        if s.len() != self.config.state_dim {
            return Err(LinconError::DimensionMismatch(format!(
                "{} state inputs, {} expected",
                s.len(),
                self.config.state_dim
            ))
            .into());
        }
        let a: &[f64] = if self.config.action_dim == 0 { &[] } else { a };
        if a.len() != self.config.action_dim {
            return Err(LinconError::DimensionMismatch(format!(
                "{} action inputs, {} expected",
                a.len(),
                self.config.action_dim
            ))
            .into());
        }
        let data: Vec<f32> = s.iter().chain(a.iter()).map(|&x| x as f32).collect();
        Ok(Tensor::from_vec(data, (1, self.config.in_dim()), &self.device)?)
    }

    fn batch_input(&self, minibatch: &Minibatch) -> Result<Tensor> {
        if self.config.action_dim == 0 {
            rows_to_tensor(&[minibatch.states()], self.config.in_dim(), &self.device)
        } else {
            rows_to_tensor(
                &[minibatch.states(), minibatch.actions()],
                self.config.in_dim(),
                &self.device,
            )
        }
    }
}

impl Network for MlpNetwork {
    fn evaluate(&self, s: &[f64], a: &[f64]) -> Result<Vec<f64>> {
        let xs = self.input(s, a)?;
        to_f64(&self.forward(&xs)?)
    }

    fn train(&mut self, minibatch: &mut Minibatch) -> Result<()> {
        if minibatch.is_empty() {
            return Ok(());
        }
        let xs = self.batch_input(minibatch)?;
        let ys = rows_to_tensor(&[minibatch.targets()], self.config.out_dim, &self.device)?;
        let loss = mse(&self.forward(&xs)?, &ys)?;
        self.opt.backward_step(&loss)?;
        trace!("loss = {}", loss.to_scalar::<f32>()?);
        minibatch.clear();
        Ok(())
    }

    fn apply_gradient(&mut self, minibatch: &mut Minibatch) -> Result<()> {
        if minibatch.is_empty() {
            return Ok(());
        }
        let xs = self.batch_input(minibatch)?;
        let grads = rows_to_tensor(&[minibatch.targets()], self.config.out_dim, &self.device)?;
        let loss = (self.forward(&xs)? * grads)?.sum(1)?.mean(0)?;
        self.opt.backward_step(&loss)?;
        minibatch.clear();
        Ok(())
    }

    fn gradient_wrt_action(&self, s: &[f64], a: &[f64]) -> Result<Vec<f64>> {
        let xs = self.input(s, a)?;
        let s_t = xs.narrow(1, 0, self.config.state_dim)?;
        let a_t = Var::from_tensor(&xs.narrow(1, self.config.state_dim, self.config.action_dim)?)?;
        let xs = Tensor::cat(&[&s_t, a_t.as_tensor()], 1)?;
        let q = self.forward(&xs)?.narrow(1, 0, 1)?.sum_all()?;
        let grads = q.backward()?;
        let g = grads
            .get(a_t.as_tensor())
            .context("No gradient with respect to the action")?;
        to_f64(g)
    }

    fn clone_network(&self) -> Result<Self> {
        let mut network = Self::build(self.config.clone())?;
        track(&network.varmap, &self.varmap, 1.0)?;
        network.tau = self.tau;
        Ok(network)
    }

    fn init_soft_update(&mut self, tau: f64, source: &Self) -> Result<()> {
        self.tau = tau;
        track(&self.varmap, &source.varmap, 1.0)
    }

    fn soft_update(&mut self, source: &Self) -> Result<()> {
        track(&self.varmap, &source.varmap, self.tau)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opt::{OptimizerConfig, OptimizerKind};

    fn critic() -> Result<MlpNetwork> {
        MlpNetwork::build(
            MlpNetworkConfig::critic(2, 1, vec![16])
                .opt_config(OptimizerConfig::default().kind(OptimizerKind::Adam).lr(0.01)),
        )
    }

    #[test]
    fn test_evaluate_checks_dimensions() -> Result<()> {
        let q = critic()?;
        assert_eq!(q.evaluate(&[0.1, 0.2], &[0.3])?.len(), 1);
        assert!(q.evaluate(&[0.1], &[0.3]).is_err());
        assert!(q.evaluate(&[0.1, 0.2], &[]).is_err());

        let mu = MlpNetwork::build(MlpNetworkConfig::actor(2, 3, vec![8]))?;
        let out = mu.evaluate(&[0.1, 0.2], &[])?;
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|x| x.abs() <= 1.0));
        Ok(())
    }

    #[test]
    fn test_train_fits_targets() -> Result<()> {
        let mut q = critic()?;
        let inputs = [([0.0, 1.0], 0.5, 1.0), ([1.0, 0.0], -0.5, -1.0)];
        let error = |q: &MlpNetwork| -> Result<f64> {
            let mut e = 0.0;
            for (s, a, y) in inputs.iter() {
                e += (q.evaluate(s, &[*a])?[0] - y).powi(2);
            }
            Ok(e)
        };
        let before = error(&q)?;

        let mut mb = Minibatch::new(2);
        for _ in 0..200 {
            for (s, a, y) in inputs.iter() {
                mb.add_tuple(s, &[*a], &[*y])?;
            }
            q.train(&mut mb)?;
            assert!(mb.is_empty());
        }
        assert!(error(&q)? < before);
        assert!(error(&q)? < 0.05);
        Ok(())
    }

    #[test]
    fn test_gradient_wrt_action() -> Result<()> {
        let q = critic()?;
        let (s, a, h) = ([0.3, -0.2], 0.1, 1e-2);
        let g = q.gradient_wrt_action(&s, &[a])?;
        let fd = (q.evaluate(&s, &[a + h])?[0] - q.evaluate(&s, &[a - h])?[0]) / (2.0 * h);
        assert_eq!(g.len(), 1);
        assert!((g[0] - fd).abs() < 1e-2, "{} != {}", g[0], fd);
        Ok(())
    }

    #[test]
    fn test_clone_and_soft_update() -> Result<()> {
        let mut online = critic()?;
        let mut target = online.clone_network()?;
        let (s, a) = ([0.5, 0.5], [0.0]);
        assert_eq!(online.evaluate(&s, &a)?, target.evaluate(&s, &a)?);

        target.init_soft_update(0.5, &online)?;
        let mut mb = Minibatch::new(1);
        mb.add_tuple(&s, &a, &[10.0])?;
        online.train(&mut mb)?;
        // the clone does not share parameters
        let (q_online, q_target) = (online.evaluate(&s, &a)?[0], target.evaluate(&s, &a)?[0]);
        assert!(q_online != q_target);

        for _ in 0..20 {
            target.soft_update(&online)?;
        }
        assert!((target.evaluate(&s, &a)?[0] - q_online).abs() < 1e-3);
        Ok(())
    }
}
