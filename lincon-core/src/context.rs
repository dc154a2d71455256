//! Experiment state seen by learners on every call.

/// Discount factor and experiment progress passed to every `update`/`select_action`.
#[derive(Debug, Clone, PartialEq)]
pub struct LearningContext {
    /// Discount factor.
    pub gamma: f64,

    /// `true` while running an evaluation episode, where no exploration or learning
    /// gain applies.
    pub evaluation_episode: bool,

    /// `true` on the first step of an episode.
    pub first_step: bool,

    /// Step within the current episode, starting at 1.
    pub step: usize,

    /// Step counted over the whole experiment, starting at 1.
    pub experiment_step: usize,

    /// Current episode, starting at 1.
    pub episode_index: usize,

    /// Number of steps per episode.
    pub num_steps: usize,

    /// Normalized progress of the training, in `[0, 1]`.
    pub training_progress: f64,

    /// Normalized progress of the current episode, in `[0, 1]`.
    pub episode_progress: f64,

    /// `true` while transitions from experience replay are being processed.
    pub replaying_experience: bool,
}

impl Default for LearningContext {
    fn default() -> Self {
        Self {
            gamma: 0.9,
            evaluation_episode: false,
            first_step: true,
            step: 1,
            experiment_step: 1,
            episode_index: 1,
            num_steps: 1,
            training_progress: 0.0,
            episode_progress: 0.0,
            replaying_experience: false,
        }
    }
}

impl LearningContext {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the evaluation flag.
    pub fn evaluation_episode(mut self, v: bool) -> Self {
        self.evaluation_episode = v;
        self
    }

    /// Sets the first step flag.
    pub fn first_step(mut self, v: bool) -> Self {
        self.first_step = v;
        self
    }

    /// Sets the step within the episode.
    pub fn step(mut self, v: usize) -> Self {
        self.step = v;
        self
    }

    /// Sets the experiment step.
    pub fn experiment_step(mut self, v: usize) -> Self {
        self.experiment_step = v;
        self
    }

    /// Sets the episode index.
    pub fn episode_index(mut self, v: usize) -> Self {
        self.episode_index = v;
        self
    }

    /// Sets the number of steps per episode.
    pub fn num_steps(mut self, v: usize) -> Self {
        self.num_steps = v;
        self
    }

    /// Sets the training progress.
    pub fn training_progress(mut self, v: f64) -> Self {
        self.training_progress = v;
        self
    }

    /// Sets the episode progress.
    pub fn episode_progress(mut self, v: f64) -> Self {
        self.episode_progress = v;
        self
    }

    /// Sets the experience replay flag.
    pub fn replaying_experience(mut self, v: bool) -> Self {
        self.replaying_experience = v;
        self
    }

    /// Moves to the next step of the current episode.
    pub fn advance(&mut self) {
        self.first_step = false;
        self.step += 1;
        self.experiment_step += 1;
        if self.num_steps > 0 {
            self.episode_progress = (self.step as f64 / self.num_steps as f64).min(1.0);
        }
    }

    /// Starts the next episode.
    pub fn next_episode(&mut self) {
        self.first_step = true;
        self.step = 1;
        self.episode_index += 1;
        self.episode_progress = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance() {
        let mut ctx = LearningContext::default().num_steps(4);
        ctx.advance();
        ctx.advance();
        assert!(!ctx.first_step);
        assert_eq!(ctx.step, 3);
        assert_eq!(ctx.experiment_step, 3);
        assert_eq!(ctx.episode_progress, 0.75);

        ctx.next_episode();
        assert!(ctx.first_step);
        assert_eq!((ctx.step, ctx.experiment_step, ctx.episode_index), (1, 3, 2));
    }
}
