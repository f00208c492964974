use ndarray::{ArrayView, ArrayViewMut, Dimension, Zip};

use super::Optimizer;

/// Tensors with fewer elements than this are updated on the calling thread.
const PAR_THRESHOLD: usize = 1 << 14;

/// Gradient descent optimization algorithm.
#[derive(Debug, Clone, Copy)]
pub struct GradientDescent {
    learning_rate: f32,
}

impl GradientDescent {
    /// Returns a new `GradientDescent`.
    ///
    /// # Arguments
    /// * `learning_rate` - The *length* of the steps taken on `update_params`.
    pub fn new(learning_rate: f32) -> Self {
        Self { learning_rate }
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }
}

impl Optimizer for GradientDescent {
    /// Makes a step in the opposite direction of the gradient, with a length of `learning_rate`.
    fn update_params<D: Dimension>(&mut self, params: ArrayViewMut<f32, D>, grad: ArrayView<f32, D>) {
        let lr = self.learning_rate;
        let zip = Zip::from(params).and(grad);

        if zip.size() < PAR_THRESHOLD {
            zip.for_each(|w, &g| *w -= lr * g);
        } else {
            zip.par_for_each(|w, &g| *w -= lr * g);
        }
    }
}
