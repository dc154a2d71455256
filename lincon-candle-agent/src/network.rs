//! Interface of the function approximators used by [`Ddpg`](crate::Ddpg).
use anyhow::Result;
use lincon_core::error::LinconError;

/// Tuples accumulated for one training step of a [`Network`].
///
/// For a critic the target of a tuple is the regression target of `Q(s, a)`; for an
/// actor it is the gradient to be applied to the output `mu(s)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Minibatch {
    capacity: usize,
    states: Vec<Vec<f64>>,
    actions: Vec<Vec<f64>>,
    targets: Vec<Vec<f64>>,
}

impl Minibatch {
    /// Creates an empty minibatch.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            states: Vec::with_capacity(capacity),
            actions: Vec::with_capacity(capacity),
            targets: Vec::with_capacity(capacity),
        }
    }

    /// Appends a tuple. Fails if the minibatch is full.
    pub fn add_tuple(&mut self, s: &[f64], a: &[f64], target: &[f64]) -> Result<()> {
        if self.is_full() {
            return Err(LinconError::MinibatchFull(self.capacity).into());
        }
        self.states.push(s.to_vec());
        self.actions.push(a.to_vec());
        self.targets.push(target.to_vec());
        Ok(())
    }

    /// Maximum number of tuples.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of tuples.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if there is no tuple.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Returns `true` if no more tuple can be added.
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// Removes every tuple.
    pub fn clear(&mut self) {
        self.states.clear();
        self.actions.clear();
        self.targets.clear();
    }

    /// States of the tuples.
    pub fn states(&self) -> &[Vec<f64>] {
        &self.states
    }

    /// Actions of the tuples.
    pub fn actions(&self) -> &[Vec<f64>] {
        &self.actions
    }

    /// Targets of the tuples.
    pub fn targets(&self) -> &[Vec<f64>] {
        &self.targets
    }
}

/// A trainable function of a state and an action.
///
/// Critics output a single value `Q(s, a)`. Actors ignore the action input and output
/// one value per action variable.
pub trait Network {
    /// Output of the network for one input.
    fn evaluate(&self, s: &[f64], a: &[f64]) -> Result<Vec<f64>>;

    /// Regresses the output towards the targets of the minibatch, then clears it.
    fn train(&mut self, minibatch: &mut Minibatch) -> Result<()>;

    /// Moves the output along the gradients stored as targets, then clears the
    /// minibatch.
    fn apply_gradient(&mut self, minibatch: &mut Minibatch) -> Result<()>;

    /// Gradient of the first output with respect to the action input.
    fn gradient_wrt_action(&self, s: &[f64], a: &[f64]) -> Result<Vec<f64>>;

    /// Returns an independent copy with the same parameters.
    fn clone_network(&self) -> Result<Self>
    where
        Self: Sized;

    /// Sets the rate of [`Network::soft_update`] and copies the parameters of
    /// `source`.
    fn init_soft_update(&mut self, tau: f64, source: &Self) -> Result<()>
    where
        Self: Sized;

    /// Moves the parameters towards those of `source`,
    /// `self = tau * source + (1 - tau) * self`.
    fn soft_update(&mut self, source: &Self) -> Result<()>
    where
        Self: Sized;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minibatch_capacity() -> Result<()> {
        let mut mb = Minibatch::new(2);
        assert!(mb.is_empty());
        mb.add_tuple(&[0.0, 1.0], &[0.5], &[1.0])?;
        mb.add_tuple(&[1.0, 1.0], &[0.2], &[0.0])?;
        assert!(mb.is_full());
        assert_eq!(mb.len(), 2);
        assert!(mb.add_tuple(&[0.0, 0.0], &[0.0], &[0.0]).is_err());
        assert_eq!(mb.states()[1], vec![1.0, 1.0]);
        assert_eq!(mb.actions()[0], vec![0.5]);

        mb.clear();
        assert!(mb.is_empty());
        assert_eq!(mb.capacity(), 2);
        Ok(())
    }
}
