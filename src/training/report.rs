use serde::{Deserialize, Serialize};

use super::Phase;

/// What happened during one phase of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: Phase,
    /// The mean minibatch cost of every epoch.
    pub epoch_costs: Vec<f32>,
    /// The validation error fraction after every epoch, only filled while fine-tuning.
    pub validation_errors: Vec<f32>,
}

impl PhaseReport {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            epoch_costs: Vec::new(),
            validation_errors: Vec::new(),
        }
    }

    pub fn final_cost(&self) -> Option<f32> {
        self.epoch_costs.last().copied()
    }

    /// The epoch with the lowest validation error and that error, the earliest one on ties.
    pub fn best_validation(&self) -> Option<(usize, f32)> {
        self.validation_errors
            .iter()
            .copied()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn best_validation_picks_the_earliest_minimum() {
        let mut report = PhaseReport::new(Phase::FineTuning);
        assert_eq!(report.best_validation(), None);

        report.validation_errors = vec![0.5, 0.25, 0.3, 0.25];
        assert_eq!(report.best_validation(), Some((1, 0.25)));
    }
}
