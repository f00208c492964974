use std::{num::NonZeroUsize, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::SdaErr;

/// The corruption level of every layer whose level isn't given.
pub const DEFAULT_CORRUPTION_LEVEL: f32 = 0.1;

/// The specification for the `StackedAutoencoderNetwork`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub n_ins: usize,
    pub hidden_layers_sizes: Vec<usize>,
    pub n_outs: usize,
    /// One level per hidden layer, `DEFAULT_CORRUPTION_LEVEL` for all of them if absent.
    #[serde(default)]
    pub corruption_levels: Option<Vec<f32>>,
    /// Seeds the weights and every draw made during training, taken from the OS if absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl NetworkSpec {
    /// The corruption level of every hidden layer, from the bottom up.
    pub fn corruption_levels(&self) -> Vec<f32> {
        match &self.corruption_levels {
            Some(levels) => levels.clone(),
            None => vec![DEFAULT_CORRUPTION_LEVEL; self.hidden_layers_sizes.len()],
        }
    }
}

/// The specification for one of the training phases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseSpec {
    pub epochs: usize,
    pub learning_rate: f32,
    pub batch_size: NonZeroUsize,
}

impl PhaseSpec {
    /// 15 epochs at a learning rate of 0.001, one example per batch.
    pub fn pretraining() -> Self {
        Self {
            epochs: 15,
            learning_rate: 0.001,
            batch_size: NonZeroUsize::MIN,
        }
    }

    /// 1000 epochs at a learning rate of 0.1, one example per batch.
    pub fn finetuning() -> Self {
        Self {
            epochs: 1000,
            learning_rate: 0.1,
            batch_size: NonZeroUsize::MIN,
        }
    }
}

/// The specification for a whole training run.
///
/// ```json
/// {
///     "network": { "n_ins": 784, "hidden_layers_sizes": [500, 500], "n_outs": 10, "seed": 89677 },
///     "pretraining": { "epochs": 15, "learning_rate": 0.001, "batch_size": 1 },
///     "shuffle": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSpec {
    pub network: NetworkSpec,
    #[serde(default = "PhaseSpec::pretraining")]
    pub pretraining: PhaseSpec,
    #[serde(default = "PhaseSpec::finetuning")]
    pub finetuning: PhaseSpec,
    /// Whether to reshuffle the training set before every epoch.
    #[serde(default)]
    pub shuffle: bool,
}

impl TrainingSpec {
    /// A spec for `network` with the default phases.
    pub fn new(network: NetworkSpec) -> Self {
        Self {
            network,
            pretraining: PhaseSpec::pretraining(),
            finetuning: PhaseSpec::finetuning(),
            shuffle: false,
        }
    }
}

impl FromStr for TrainingSpec {
    type Err = SdaErr;

    /// Parses a JSON spec.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map_err(|e| SdaErr::InvalidConfiguration(e.to_string()))
    }
}
