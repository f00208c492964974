use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use super::{check_labels, check_width, LayerGrad};
use crate::{
    arch::activations::{argmax_rows, softmax},
    optimization::Optimizer,
    Result, SdaErr,
};

/// A multi-class logistic regression layer: `softmax(h·W + b)`.
///
/// Weights and biases start at zero, so an untrained layer predicts the uniform distribution.
#[derive(Debug, Clone)]
pub struct LogisticOutputLayer {
    n_in: usize,
    n_out: usize,
    w: Array2<f32>,
    b: Array1<f32>,
}

impl LogisticOutputLayer {
    /// Creates a new `LogisticOutputLayer`.
    ///
    /// # Arguments
    /// * `n_in` - The width of the representation fed to the layer.
    /// * `n_out` - The amount of classes.
    ///
    /// # Returns
    /// A new layer or `InvalidDimension` if any size is zero.
    pub fn new(n_in: usize, n_out: usize) -> Result<Self> {
        if n_in == 0 {
            return Err(SdaErr::InvalidDimension { what: "n_in" });
        }
        if n_out == 0 {
            return Err(SdaErr::InvalidDimension { what: "n_out" });
        }

        Ok(Self {
            n_in,
            n_out,
            w: Array2::zeros((n_in, n_out)),
            b: Array1::zeros(n_out),
        })
    }

    pub fn n_in(&self) -> usize {
        self.n_in
    }

    pub fn n_out(&self) -> usize {
        self.n_out
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.w.len() + self.b.len()
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.w
    }

    #[cfg(test)]
    pub(crate) fn weights_mut(&mut self) -> &mut Array2<f32> {
        &mut self.w
    }

    pub fn bias(&self) -> &Array1<f32> {
        &self.b
    }

    /// The class probabilities of every row of `h`.
    pub fn predict_proba(&self, h: ArrayView2<f32>) -> Result<Array2<f32>> {
        check_width("output layer input width", &h, self.n_in)?;
        Ok(softmax(h.dot(&self.w) + &self.b))
    }

    /// The most likely class of every row of `h`.
    pub fn predict(&self, h: ArrayView2<f32>) -> Result<Array1<usize>> {
        let p = self.predict_proba(h)?;
        Ok(Array1::from(argmax_rows(&p)))
    }

    /// The mean over the batch of `-log p[y]`.
    pub fn negative_log_likelihood(&self, h: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<f32> {
        self.check_batch(&h, &y)?;
        let p = self.predict_proba(h)?;
        Ok(nll(&p, y))
    }

    /// The fraction of rows of `h` whose most likely class is not the one in `y`.
    pub fn errors(&self, h: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<f32> {
        self.check_batch(&h, &y)?;

        let predicted = self.predict(h)?;
        let wrong = predicted
            .iter()
            .zip(y.iter())
            .filter(|(p, y)| p != y)
            .count();

        Ok(wrong as f32 / y.len() as f32)
    }

    /// Computes the negative log-likelihood of `y` and its gradient.
    ///
    /// # Returns
    /// The cost, the gradient for `W` and `b` and the gradient with respect to `h`.
    pub(crate) fn backward(
        &self,
        h: ArrayView2<f32>,
        y: ArrayView1<usize>,
    ) -> Result<(f32, LayerGrad, Array2<f32>)> {
        self.check_batch(&h, &y)?;

        let p = self.predict_proba(h)?;
        let cost = nll(&p, y);

        // The gradient of softmax followed by -log p[y] with respect to the logits.
        let n = h.nrows() as f32;
        let mut d = p;
        for (mut row, &label) in d.axis_iter_mut(Axis(0)).zip(y.iter()) {
            row[label] -= 1.;
        }
        d.mapv_inplace(|v| v / n);

        let grad = LayerGrad {
            dw: h.t().dot(&d),
            db: d.sum_axis(Axis(0)),
        };
        let dh = d.dot(&self.w.t());

        Ok((cost, grad, dh))
    }

    pub(crate) fn apply<O: Optimizer>(&mut self, optimizer: &mut O, grad: &LayerGrad) {
        optimizer.update_params(self.w.view_mut(), grad.dw.view());
        optimizer.update_params(self.b.view_mut(), grad.db.view());
    }

    fn check_batch(&self, h: &ArrayView2<f32>, y: &ArrayView1<usize>) -> Result<()> {
        if h.nrows() == 0 {
            return Err(SdaErr::EmptyDataset);
        }

        check_labels(h, y, self.n_out)
    }
}

fn nll(p: &Array2<f32>, y: ArrayView1<usize>) -> f32 {
    let total: f32 = p
        .axis_iter(Axis(0))
        .zip(y.iter())
        .map(|(row, &label)| -row[label].max(f32::MIN_POSITIVE).ln())
        .sum();

    total / y.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn zero_sized_layers_are_rejected() {
        assert!(LogisticOutputLayer::new(0, 2).is_err());
        assert!(LogisticOutputLayer::new(3, 0).is_err());
    }

    #[test]
    fn untrained_layer_is_uniform() {
        let layer = LogisticOutputLayer::new(3, 4).unwrap();
        let h = array![[0.2, 0.5, 0.9], [1., 0., 0.]];

        let p = layer.predict_proba(h.view()).unwrap();
        assert!(p.iter().all(|&v| (v - 0.25).abs() < 1e-6));

        let nll = layer.negative_log_likelihood(h.view(), array![0, 3].view()).unwrap();
        assert!((nll - 4f32.ln()).abs() < 1e-5);
    }

    #[test]
    fn errors_counts_misclassified_rows() {
        let mut layer = LogisticOutputLayer::new(2, 2).unwrap();
        layer.w.assign(&array![[5., 0.], [0., 5.]]);
        let h = array![[1., 0.], [0., 1.], [1., 0.], [0., 1.]];

        assert_eq!(layer.predict(h.view()).unwrap(), array![0, 1, 0, 1]);
        assert_eq!(layer.errors(h.view(), array![0, 1, 0, 1].view()).unwrap(), 0.);
        assert_eq!(layer.errors(h.view(), array![0, 1, 1, 1].view()).unwrap(), 0.25);
    }

    #[test]
    fn bad_labels_are_rejected() {
        let layer = LogisticOutputLayer::new(2, 2).unwrap();
        let h = array![[1., 0.], [0., 1.]];

        assert!(matches!(
            layer.errors(h.view(), array![0, 2].view()),
            Err(SdaErr::LabelOutOfRange {
                label: 2,
                classes: 2
            })
        ));
        assert!(matches!(
            layer.negative_log_likelihood(h.view(), array![0].view()),
            Err(SdaErr::ShapeMismatch { what: "labels", .. })
        ));
    }

    #[test]
    fn gradient_matches_finite_differences() {
        const EPS: f32 = 1e-2;

        let mut layer = LogisticOutputLayer::new(3, 2).unwrap();
        layer.w.assign(&array![[0.3, -0.2], [0.1, 0.4], [-0.5, 0.2]]);
        let h = array![[0.2, 0.7, 0.1], [0.9, 0.3, 0.5], [0.4, 0.4, 0.8]];
        let y = array![1, 0, 1];

        let (_, grad, _) = layer.backward(h.view(), y.view()).unwrap();

        for i in 0..3 {
            for j in 0..2 {
                let orig = layer.w[[i, j]];
                layer.w[[i, j]] = orig + EPS;
                let plus = layer.negative_log_likelihood(h.view(), y.view()).unwrap();
                layer.w[[i, j]] = orig - EPS;
                let minus = layer.negative_log_likelihood(h.view(), y.view()).unwrap();
                layer.w[[i, j]] = orig;

                let numeric = (plus - minus) / (2. * EPS);
                assert!((numeric - grad.dw[[i, j]]).abs() < 1e-3);
            }
        }
    }
}
