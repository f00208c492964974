use log::{debug, info};
use rand::Rng;

use super::{Phase, PhaseReport, PhaseSpec};
use crate::{
    arch::StackedAutoencoderNetwork,
    dataset::Dataset,
    optimization::GradientDescent,
    Result, SdaErr,
};

/// Drives a `StackedAutoencoderNetwork` through its training phases.
///
/// Every call to `step` runs the current phase for its fixed amount of epochs and moves on to the
/// next one.
#[derive(Debug)]
pub struct SdaTrainer<R: Rng> {
    network: StackedAutoencoderNetwork,
    pretraining: PhaseSpec,
    finetuning: PhaseSpec,
    shuffle: bool,
    phase: Phase,
    rng: R,
}

impl<R: Rng> SdaTrainer<R> {
    /// Creates a new `SdaTrainer`.
    ///
    /// # Arguments
    /// * `network` - The network to train.
    /// * `pretraining` - The spec used for every layer's pretraining.
    /// * `finetuning` - The spec used for fine-tuning.
    /// * `shuffle` - Whether to reshuffle the training set before every epoch.
    /// * `rng` - The generator used for shuffling.
    pub fn new(
        network: StackedAutoencoderNetwork,
        pretraining: PhaseSpec,
        finetuning: PhaseSpec,
        shuffle: bool,
        rng: R,
    ) -> Self {
        Self {
            network,
            pretraining,
            finetuning,
            shuffle,
            phase: Phase::first(),
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase.is_done()
    }

    pub fn network(&self) -> &StackedAutoencoderNetwork {
        &self.network
    }

    pub fn into_network(self) -> StackedAutoencoderNetwork {
        self.network
    }

    /// Runs the current phase to completion and advances to the next one.
    ///
    /// # Arguments
    /// * `train` - The training set, it must be labeled once fine-tuning starts.
    /// * `valid` - An optional labeled validation set, evaluated after every fine-tuning epoch.
    ///
    /// # Returns
    /// The report of the phase that ran, `TrainingFinished` if there was nothing left to run or
    /// `MissingLabels` if fine-tuning was given unlabeled data.
    pub fn step(&mut self, train: &mut Dataset, valid: Option<&Dataset>) -> Result<PhaseReport> {
        let report = match self.phase {
            Phase::Pretraining { layer } => self.pretrain(layer, train)?,
            Phase::FineTuning => self.finetune(train, valid)?,
            Phase::Done => return Err(SdaErr::TrainingFinished),
        };

        self.phase = self.phase.next(self.network.n_layers());
        info!(phase:% = self.phase; "advanced training phase");

        Ok(report)
    }

    /// Runs every remaining phase.
    ///
    /// # Returns
    /// The report of every phase that ran, in order.
    pub fn run(&mut self, train: &mut Dataset, valid: Option<&Dataset>) -> Result<Vec<PhaseReport>> {
        let mut reports = Vec::new();
        while !self.is_done() {
            reports.push(self.step(train, valid)?);
        }

        Ok(reports)
    }

    fn pretrain(&mut self, layer: usize, train: &mut Dataset) -> Result<PhaseReport> {
        let PhaseSpec {
            epochs,
            learning_rate,
            batch_size,
        } = self.pretraining;

        let mut optimizer = GradientDescent::new(learning_rate);
        let mut report = PhaseReport::new(Phase::Pretraining { layer });

        for epoch in 0..epochs {
            if self.shuffle {
                train.shuffle(&mut self.rng);
            }

            let mut total = 0.;
            let mut batches = 0;
            for batch in train.batches(batch_size) {
                total += self
                    .network
                    .pretrain_step_with(layer, batch.x.view(), &mut optimizer)?;
                batches += 1;
            }

            let cost = total / batches as f32;
            debug!(layer = layer, epoch = epoch, cost = cost; "pretraining epoch");
            report.epoch_costs.push(cost);
        }

        Ok(report)
    }

    fn finetune(&mut self, train: &mut Dataset, valid: Option<&Dataset>) -> Result<PhaseReport> {
        if !train.is_labeled() || valid.is_some_and(|valid| !valid.is_labeled()) {
            return Err(SdaErr::MissingLabels);
        }

        let PhaseSpec {
            epochs,
            learning_rate,
            batch_size,
        } = self.finetuning;

        let mut optimizers = vec![GradientDescent::new(learning_rate); self.network.n_layers() + 1];
        let mut report = PhaseReport::new(Phase::FineTuning);

        for epoch in 0..epochs {
            if self.shuffle {
                train.shuffle(&mut self.rng);
            }

            let mut total = 0.;
            let mut batches = 0;
            for batch in train.batches(batch_size) {
                let y = batch.y.ok_or(SdaErr::MissingLabels)?;
                total += self
                    .network
                    .finetune_step_with(batch.x.view(), y.view(), &mut optimizers)?;
                batches += 1;
            }

            let cost = total / batches as f32;
            debug!(epoch = epoch, cost = cost; "fine-tuning epoch");
            report.epoch_costs.push(cost);

            if let Some((x, y)) = valid.and_then(|valid| Some((valid.features(), valid.labels()?))) {
                let error = self.network.errors(x.view(), y.view())?;
                debug!(epoch = epoch, validation_error = error; "validated");
                report.validation_errors.push(error);
            }
        }

        if let Some((epoch, error)) = report.best_validation() {
            info!(best_epoch = epoch, validation_error = error; "fine-tuning finished");
        }

        Ok(report)
    }
}
