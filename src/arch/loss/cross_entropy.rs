use ndarray::{Array2, ArrayView2, Axis, Zip};

use super::LossFn;

/// Reconstructions are kept this far away from 0 and 1 inside the logarithms.
const CLAMP: f32 = 1e-7;

/// Binary cross-entropy between a reconstruction and its target, summed over the features of an
/// example and averaged over the examples of the batch.
///
/// Both arguments are expected to lie within `[0, 1]`, targets outside that range give
/// meaningless (possibly negative or NaN) values.
#[derive(Default, Clone, Copy, Debug)]
pub struct CrossEntropy;

impl CrossEntropy {
    /// Returns a new `CrossEntropy`.
    pub fn new() -> Self {
        Self
    }

    /// The derivative of `loss` with respect to the pre-activations of a sigmoid output `z`:
    /// `(z - x) / n`.
    ///
    /// The clamp used by `loss` is left out, so saturated units keep a non-zero gradient.
    pub fn sigmoid_logits_prime(&self, z: ArrayView2<f32>, x: ArrayView2<f32>) -> Array2<f32> {
        let n = z.len_of(Axis(0)).max(1) as f32;
        Zip::from(z).and(x).map_collect(|&z, &x| (z - x) / n)
    }
}

fn clamp(z: f32) -> f32 {
    z.clamp(CLAMP, 1. - CLAMP)
}

impl LossFn for CrossEntropy {
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        let n = y_pred.len_of(Axis(0));
        if n == 0 {
            return 0.;
        }

        let mut total = 0.;
        Zip::from(y_pred).and(y).for_each(|&z, &x| {
            let z = clamp(z);
            total -= x * z.ln() + (1. - x) * (1. - z).ln();
        });

        total / n as f32
    }
}
