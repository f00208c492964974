use ndarray::{Array, Array1, Array2, ArrayView, ArrayView2, Axis, Dimension};
use ndarray_rand::RandomExt;
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Bernoulli, Distribution, Uniform};

use super::{check_probability, check_width, LayerGrad, ReconstructionGrad};
use crate::{
    arch::{
        activations::{sigmoid, sigmoid_df},
        loss::{CrossEntropy, LossFn},
    },
    optimization::{GradientDescent, Optimizer},
    Result, SdaErr,
};

/// A denoising autoencoder with tied weights.
///
/// The encoder maps `x` to `sigmoid(x·W + b)` and the decoder maps a hidden representation `y`
/// back to `sigmoid(y·Wᵀ + b')`. During training the input is corrupted by zeroing each element
/// with probability `1 - retain_prob` and the layer learns to reconstruct the clean input.
///
/// Inputs are batches with one example per row.
#[derive(Debug, Clone)]
pub struct DenoisingAutoencoder {
    n_visible: usize,
    n_hidden: usize,
    w: Array2<f32>,
    b: Array1<f32>,
    b_prime: Array1<f32>,
    retain_prob: f32,
    rng: StdRng,
}

impl DenoisingAutoencoder {
    /// The probability of keeping an input element when no other is configured.
    pub const DEFAULT_RETAIN_PROB: f32 = 0.9;

    /// Creates a new `DenoisingAutoencoder` seeding its own generator.
    ///
    /// # Arguments
    /// * `n_visible` - The width of the input.
    /// * `n_hidden` - The width of the hidden representation.
    /// * `seed` - The seed for the weight initialization and the corruption masks.
    ///
    /// # Returns
    /// A new layer or `InvalidDimension` if any size is zero.
    pub fn new(n_visible: usize, n_hidden: usize, seed: u64) -> Result<Self> {
        Self::with_rng(n_visible, n_hidden, StdRng::seed_from_u64(seed))
    }

    /// Creates a new `DenoisingAutoencoder` that draws from `rng`.
    ///
    /// Weights are sampled uniformly from `±sqrt(6 / (n_visible + n_hidden))`, biases start at
    /// zero.
    pub fn with_rng(n_visible: usize, n_hidden: usize, mut rng: StdRng) -> Result<Self> {
        if n_visible == 0 {
            return Err(SdaErr::InvalidDimension { what: "n_visible" });
        }
        if n_hidden == 0 {
            return Err(SdaErr::InvalidDimension { what: "n_hidden" });
        }

        let range = (6. / (n_visible + n_hidden) as f32).sqrt();
        let w = Array2::random_using((n_visible, n_hidden), Uniform::new(-range, range)?, &mut rng);

        Ok(Self {
            n_visible,
            n_hidden,
            w,
            b: Array1::zeros(n_hidden),
            b_prime: Array1::zeros(n_visible),
            retain_prob: Self::DEFAULT_RETAIN_PROB,
            rng,
        })
    }

    pub fn n_visible(&self) -> usize {
        self.n_visible
    }

    pub fn n_hidden(&self) -> usize {
        self.n_hidden
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.w.len() + self.b.len() + self.b_prime.len()
    }

    pub fn weights(&self) -> &Array2<f32> {
        &self.w
    }

    #[cfg(test)]
    pub(crate) fn weights_mut(&mut self) -> &mut Array2<f32> {
        &mut self.w
    }

    pub fn encoder_bias(&self) -> &Array1<f32> {
        &self.b
    }

    pub fn decoder_bias(&self) -> &Array1<f32> {
        &self.b_prime
    }

    /// The decoder's weights, which are always the transpose of the encoder's.
    pub fn tied_decoder_weights(&self) -> ArrayView2<'_, f32> {
        self.w.t()
    }

    pub fn retain_prob(&self) -> f32 {
        self.retain_prob
    }

    pub fn corruption_level(&self) -> f32 {
        1. - self.retain_prob
    }

    /// Sets the probability of keeping each input element when computing the training cost.
    pub fn set_retain_prob(&mut self, retain_prob: f32) -> Result<()> {
        check_probability(retain_prob)?;
        self.retain_prob = retain_prob;
        Ok(())
    }

    /// Zeroes each element of `x` independently with probability `1 - retain_prob`.
    ///
    /// Every call draws a fresh mask.
    ///
    /// # Arguments
    /// * `x` - The input, of any shape.
    /// * `retain_prob` - The probability of keeping an element.
    ///
    /// # Returns
    /// The corrupted copy of `x` or `InvalidProbability` if `retain_prob` is not within `[0, 1]`.
    pub fn corrupt<D: Dimension>(
        &mut self,
        x: ArrayView<f32, D>,
        retain_prob: f32,
    ) -> Result<Array<f32, D>> {
        check_probability(retain_prob)?;

        let mask = Bernoulli::new(retain_prob as f64)?;
        Ok(x.mapv(|v| if mask.sample(&mut self.rng) { v } else { 0. }))
    }

    /// Computes `sigmoid(x·W + b)`.
    pub fn encode(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        check_width("input width", &x, self.n_visible)?;

        let mut y = x.dot(&self.w) + &self.b;
        y.mapv_inplace(sigmoid);
        Ok(y)
    }

    /// Computes `sigmoid(y·Wᵀ + b')`.
    pub fn decode(&self, y: ArrayView2<f32>) -> Result<Array2<f32>> {
        check_width("hidden width", &y, self.n_hidden)?;

        let mut z = y.dot(&self.tied_decoder_weights()) + &self.b_prime;
        z.mapv_inplace(sigmoid);
        Ok(z)
    }

    /// The hidden representation of the uncorrupted input, what the next layer of a stack is fed.
    pub fn clean_hidden(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.encode(x)
    }

    /// The cross-entropy between `x` and the reconstruction of a corrupted copy of it, averaged
    /// over the batch.
    ///
    /// `x` is expected to lie within `[0, 1]`.
    pub fn reconstruction_cost(&mut self, x: ArrayView2<f32>) -> Result<f32> {
        check_width("input width", &x, self.n_visible)?;

        let x_tilde = self.corrupt(x, self.retain_prob)?;
        let y = self.encode(x_tilde.view())?;
        let z = self.decode(y.view())?;

        Ok(CrossEntropy.loss(z.view(), x))
    }

    /// Computes the reconstruction cost of `x` and its gradient with respect to every parameter.
    ///
    /// # Returns
    /// A tuple with the cost and the gradient.
    pub fn gradients(&mut self, x: ArrayView2<f32>) -> Result<(f32, ReconstructionGrad)> {
        check_width("input width", &x, self.n_visible)?;

        let x_tilde = self.corrupt(x, self.retain_prob)?;
        let y = self.encode(x_tilde.view())?;
        let z = self.decode(y.view())?;
        let cost = CrossEntropy.loss(z.view(), x);

        let dz = CrossEntropy.sigmoid_logits_prime(z.view(), x);
        let db_prime = dz.sum_axis(Axis(0));

        let mut dy = dz.dot(&self.w);
        dy.zip_mut_with(&y, |d, &a| *d *= sigmoid_df(a));
        let db = dy.sum_axis(Axis(0));

        // Tied weights: W is used by the encoder as is and by the decoder transposed.
        let mut dw = x_tilde.t().dot(&dy);
        dw += &dz.t().dot(&y);

        let grad = ReconstructionGrad {
            encoder: LayerGrad { dw, db },
            db_prime,
        };

        Ok((cost, grad))
    }

    /// Makes one gradient descent step on the reconstruction cost of `x`.
    ///
    /// # Returns
    /// The cost before the update.
    pub fn gradient_step(&mut self, x: ArrayView2<f32>, learning_rate: f32) -> Result<f32> {
        self.gradient_step_with(x, &mut GradientDescent::new(learning_rate))
    }

    /// Same as `gradient_step` with an arbitrary update rule.
    pub fn gradient_step_with<O: Optimizer>(
        &mut self,
        x: ArrayView2<f32>,
        optimizer: &mut O,
    ) -> Result<f32> {
        let (cost, grad) = self.gradients(x)?;

        self.apply_encoder(optimizer, &grad.encoder);
        optimizer.update_params(self.b_prime.view_mut(), grad.db_prime.view());

        Ok(cost)
    }

    /// Propagates the gradient of a cost with respect to the clean hidden output back through
    /// the encoder.
    ///
    /// # Arguments
    /// * `x` - The input the encoder was fed.
    /// * `y` - The encoder's output for `x`.
    /// * `dy` - The gradient of the cost with respect to `y`.
    ///
    /// # Returns
    /// The gradient for `W` and `b` and the gradient with respect to `x`.
    pub(crate) fn encoder_backward(
        &self,
        x: ArrayView2<f32>,
        y: ArrayView2<f32>,
        mut dy: Array2<f32>,
    ) -> (LayerGrad, Array2<f32>) {
        dy.zip_mut_with(&y, |d, &a| *d *= sigmoid_df(a));

        let grad = LayerGrad {
            dw: x.t().dot(&dy),
            db: dy.sum_axis(Axis(0)),
        };
        let dx = dy.dot(&self.w.t());

        (grad, dx)
    }

    /// Applies a gradient on the encoder's parameters, the decoder bias is left untouched.
    pub(crate) fn apply_encoder<O: Optimizer>(&mut self, optimizer: &mut O, grad: &LayerGrad) {
        optimizer.update_params(self.w.view_mut(), grad.dw.view());
        optimizer.update_params(self.b.view_mut(), grad.db.view());
    }
}
