mod autoencoder;
mod grad;
mod logistic;

pub use autoencoder::DenoisingAutoencoder;
pub use grad::{LayerGrad, ReconstructionGrad};
pub use logistic::LogisticOutputLayer;

use ndarray::{ArrayView1, ArrayView2, Axis};

use crate::{Result, SdaErr};

/// Checks that a batch has `expected` columns.
pub(crate) fn check_width(what: &'static str, x: &ArrayView2<f32>, expected: usize) -> Result<()> {
    let got = x.len_of(Axis(1));
    if got != expected {
        return Err(SdaErr::ShapeMismatch {
            what,
            got,
            expected,
        });
    }

    Ok(())
}

pub(crate) fn check_probability(p: f32) -> Result<()> {
    if (0. ..=1.).contains(&p) {
        Ok(())
    } else {
        Err(SdaErr::InvalidProbability(p))
    }
}

/// Checks that there is one label per row of `x` and that every label names one of `classes`.
pub(crate) fn check_labels(
    x: &ArrayView2<f32>,
    labels: &ArrayView1<usize>,
    classes: usize,
) -> Result<()> {
    if labels.len() != x.nrows() {
        return Err(SdaErr::ShapeMismatch {
            what: "labels",
            got: labels.len(),
            expected: x.nrows(),
        });
    }

    if let Some(&label) = labels.iter().find(|&&label| label >= classes) {
        return Err(SdaErr::LabelOutOfRange { label, classes });
    }

    Ok(())
}
