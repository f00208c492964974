use ndarray::{ArrayView, ArrayViewMut, Dimension};

/// A parameter update rule.
///
/// Each parameter tensor of a layer is handed to the optimizer together with the gradient of the
/// cost with respect to it.
pub trait Optimizer {
    /// Updates `params` in place given their gradient.
    ///
    /// # Arguments
    /// * `params` - The parameters that are going to be modified.
    /// * `grad` - The gradient of the cost with respect to `params`, of the same shape.
    fn update_params<D: Dimension>(&mut self, params: ArrayViewMut<f32, D>, grad: ArrayView<f32, D>);
}
