use ndarray::ArrayView2;

pub trait LossFn {
    /// The batch-averaged loss of `y_pred` against the targets `y`.
    fn loss(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32;
}
