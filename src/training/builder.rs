use rand::{rngs::StdRng, SeedableRng};

use super::{PhaseSpec, SdaTrainer, TrainingSpec};
use crate::{arch::StackedAutoencoderNetwork, Result, SdaErr};

/// Builds `SdaTrainer`s given a specification.
#[derive(Default)]
pub struct SdaBuilder;

impl SdaBuilder {
    /// Creates a new `SdaBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `SdaTrainer` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification for the network and its training.
    ///
    /// # Returns
    /// A trainer at the start of pretraining or an error if the spec can't describe a network.
    pub fn build(&self, spec: &TrainingSpec) -> Result<SdaTrainer<StdRng>> {
        self.check_phase("pretraining", &spec.pretraining)?;
        self.check_phase("finetuning", &spec.finetuning)?;

        let net_spec = &spec.network;
        let mut rng = self.generate_rng(net_spec.seed);
        let network = StackedAutoencoderNetwork::with_rng(
            net_spec.n_ins,
            &net_spec.hidden_layers_sizes,
            net_spec.n_outs,
            &mut rng,
        )?
        .with_corruption_levels(&net_spec.corruption_levels())?;

        Ok(SdaTrainer::new(
            network,
            spec.pretraining,
            spec.finetuning,
            spec.shuffle,
            rng,
        ))
    }

    fn check_phase(&self, name: &str, spec: &PhaseSpec) -> Result<()> {
        if !spec.learning_rate.is_finite() || spec.learning_rate <= 0. {
            return Err(SdaErr::InvalidConfiguration(format!(
                "{name} learning rate must be positive, got {}",
                spec.learning_rate
            )));
        }

        Ok(())
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
