//! Numeric values that change over the course of an experiment.
use crate::context::LearningContext;
use serde::{Deserialize, Serialize};

/// Shape of an [`Schedule::Interpolated`] value.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum Interpolation {
    /// Linear.
    Linear,

    /// Quadratic.
    Quadratic,

    /// Cubic.
    Cubic,
}

/// Time scale a schedule progresses on.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum TimeReference {
    /// The whole training.
    Experiment,

    /// The current episode.
    Episode,
}

/// A numeric parameter, such as a learning gain, evaluated on every use.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum Schedule {
    /// A fixed value.
    Constant(f64),

    /// Moves linearly from `start` to `end` with the training progress. Zero in
    /// evaluation episodes.
    SimpleLinearDecay {
        /// Value at the start of the training.
        start: f64,

        /// Value at the end of the training.
        end: f64,
    },

    /// Interpolates from `start` to `end` between two normalized times.
    Interpolated {
        /// Normalized time at which the interpolation starts.
        start_offset: f64,

        /// Normalized time at which the interpolation ends.
        end_offset: f64,

        /// Value before `start_offset`.
        pre_offset_value: f64,

        /// Value at `start_offset`.
        start: f64,

        /// Value at `end_offset`.
        end: f64,

        /// Value in evaluation episodes.
        evaluation_value: f64,

        /// Shape of the interpolation.
        interpolation: Interpolation,

        /// Time scale.
        time_reference: TimeReference,
    },

    /// Stochastic approximation gain `alpha_0 * alpha_c / (alpha_c + t^t_exp)`.
    Bhatnagar {
        /// Gain scale.
        alpha_0: f64,

        /// Decay offset.
        alpha_c: f64,

        /// Exponent of the time.
        t_exp: f64,

        /// Value in evaluation episodes.
        evaluation_value: f64,

        /// Time scale.
        time_reference: TimeReference,
    },
}

impl Default for Schedule {
    fn default() -> Self {
        Self::Constant(0.0)
    }
}

impl Schedule {
    /// Current value.
    pub fn get(&self, ctx: &LearningContext) -> f64 {
        match self {
            Self::Constant(v) => *v,
            Self::SimpleLinearDecay { start, end } => {
                if ctx.evaluation_episode {
                    0.0
                } else {
                    start + (end - start) * ctx.training_progress
                }
            }
            Self::Interpolated {
                start_offset,
                end_offset,
                pre_offset_value,
                start,
                end,
                evaluation_value,
                interpolation,
                time_reference,
            } => {
                if ctx.evaluation_episode {
                    return *evaluation_value;
                }
                let mut progress = match time_reference {
                    TimeReference::Experiment => ctx.training_progress,
                    TimeReference::Episode => ctx.episode_progress,
                };
                if *start_offset != 0.0 {
                    if progress < *start_offset {
                        return *pre_offset_value;
                    }
                    progress = (progress - start_offset) / (end_offset - start_offset);
                }
                match interpolation {
                    Interpolation::Linear => start + (end - start) * progress,
                    Interpolation::Quadratic => {
                        start + (1.0 - (1.0 - progress).powi(2)) * (end - start) * progress
                    }
                    Interpolation::Cubic => {
                        start + (1.0 - (1.0 - progress).powi(3)) * (end - start) * progress
                    }
                }
            }
            Self::Bhatnagar {
                alpha_0,
                alpha_c,
                t_exp,
                evaluation_value,
                time_reference,
            } => {
                if ctx.evaluation_episode {
                    return *evaluation_value;
                }
                let t = match time_reference {
                    TimeReference::Experiment => {
                        ctx.step + (ctx.episode_index.max(1) - 1) * ctx.num_steps
                    }
                    TimeReference::Episode => ctx.step,
                } as f64;
                alpha_0 * alpha_c / (alpha_c + t.powf(*t_exp))
            }
        }
    }
}

impl From<f64> for Schedule {
    fn from(v: f64) -> Self {
        Self::Constant(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_decay() {
        let s = Schedule::SimpleLinearDecay {
            start: 1.0,
            end: 0.0,
        };
        let ctx = LearningContext::default().training_progress(0.25);
        assert_eq!(s.get(&ctx), 0.75);
        assert_eq!(s.get(&ctx.evaluation_episode(true)), 0.0);
    }

    #[test]
    fn test_interpolated() {
        let s = Schedule::Interpolated {
            start_offset: 0.5,
            end_offset: 1.0,
            pre_offset_value: 2.0,
            start: 1.0,
            end: 0.0,
            evaluation_value: 0.0,
            interpolation: Interpolation::Linear,
            time_reference: TimeReference::Experiment,
        };
        let ctx = LearningContext::default();
        assert_eq!(s.get(&ctx.clone().training_progress(0.25)), 2.0);
        assert_eq!(s.get(&ctx.clone().training_progress(0.75)), 0.5);
        assert_eq!(s.get(&ctx.evaluation_episode(true)), 0.0);
    }

    #[test]
    fn test_bhatnagar() {
        let s = Schedule::Bhatnagar {
            alpha_0: 1.0,
            alpha_c: 10.0,
            t_exp: 1.0,
            evaluation_value: 0.0,
            time_reference: TimeReference::Experiment,
        };
        // t = 5 + (2 - 1) * 15
        let ctx = LearningContext::default()
            .step(5)
            .episode_index(2)
            .num_steps(15);
        assert!((s.get(&ctx) - 10.0 / 30.0).abs() < 1e-12);
    }
}
