use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The stage a training run is at.
///
/// Runs go through `Pretraining { layer: 0 }` up to the top layer, then `FineTuning` and finally
/// `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Pretraining { layer: usize },
    FineTuning,
    Done,
}

impl Phase {
    pub fn first() -> Self {
        Self::Pretraining { layer: 0 }
    }

    /// The phase after this one in a network of `n_layers` hidden layers.
    pub fn next(self, n_layers: usize) -> Self {
        match self {
            Self::Pretraining { layer } if layer + 1 < n_layers => Self::Pretraining { layer: layer + 1 },
            Self::Pretraining { .. } => Self::FineTuning,
            Self::FineTuning | Self::Done => Self::Done,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretraining { layer } => write!(f, "pretraining layer {layer}"),
            Self::FineTuning => write!(f, "fine-tuning"),
            Self::Done => write!(f, "done"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_go_bottom_up_then_fine_tune() {
        let mut phase = Phase::first();
        let mut seen = vec![phase];
        while !phase.is_done() {
            phase = phase.next(3);
            seen.push(phase);
        }

        assert_eq!(
            seen,
            vec![
                Phase::Pretraining { layer: 0 },
                Phase::Pretraining { layer: 1 },
                Phase::Pretraining { layer: 2 },
                Phase::FineTuning,
                Phase::Done,
            ]
        );
        assert_eq!(Phase::Done.next(3), Phase::Done);
    }
}
