use log::info;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, CowArray, Ix2};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::prelude::*;

use super::layers::{check_probability, DenoisingAutoencoder, LogisticOutputLayer};
use crate::{
    optimization::{GradientDescent, Optimizer},
    Result, SdaErr,
};

/// A stack of denoising autoencoders topped by a logistic output layer.
///
/// The clean hidden output of every layer is the input of the next one and the top hidden
/// output is what the output layer classifies. The stack is trained in two phases: each
/// autoencoder is pretrained on its own reconstruction cost, from the bottom up, and then the
/// whole network is fine-tuned on the negative log-likelihood of the labels.
#[derive(Debug, Clone)]
pub struct StackedAutoencoderNetwork {
    layers: Vec<DenoisingAutoencoder>,
    output: LogisticOutputLayer,
}

impl StackedAutoencoderNetwork {
    /// Creates a new `StackedAutoencoderNetwork`.
    ///
    /// # Arguments
    /// * `n_ins` - The width of the raw input.
    /// * `hidden_layers_sizes` - The width of every hidden layer, from the bottom up.
    /// * `n_outs` - The amount of classes.
    /// * `seed` - The seed every layer's generator is derived from.
    ///
    /// # Returns
    /// A new network, `InvalidConfiguration` if there are no hidden layers or `InvalidDimension`
    /// if any size is zero.
    pub fn new(n_ins: usize, hidden_layers_sizes: &[usize], n_outs: usize, seed: u64) -> Result<Self> {
        Self::with_rng(
            n_ins,
            hidden_layers_sizes,
            n_outs,
            &mut StdRng::seed_from_u64(seed),
        )
    }

    /// Same as `new` drawing every layer's seed from `rng`.
    pub fn with_rng<R: Rng>(
        n_ins: usize,
        hidden_layers_sizes: &[usize],
        n_outs: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if hidden_layers_sizes.is_empty() {
            return Err(SdaErr::InvalidConfiguration(
                "at least one hidden layer is required".to_string(),
            ));
        }
        if n_ins == 0 {
            return Err(SdaErr::InvalidDimension { what: "n_ins" });
        }

        let mut layers = Vec::with_capacity(hidden_layers_sizes.len());
        let mut n_visible = n_ins;
        for &n_hidden in hidden_layers_sizes {
            let layer_rng = StdRng::seed_from_u64(rng.random());
            layers.push(DenoisingAutoencoder::with_rng(n_visible, n_hidden, layer_rng)?);
            n_visible = n_hidden;
        }

        let output = LogisticOutputLayer::new(n_visible, n_outs)?;

        let net = Self { layers, output };
        info!(
            n_ins = n_ins,
            hidden_layers = net.layers.len(),
            n_outs = n_outs,
            size = net.size();
            "built stacked autoencoder network"
        );

        Ok(net)
    }

    /// Sets the corruption level of every layer, from the bottom up.
    pub fn with_corruption_levels(mut self, corruption_levels: &[f32]) -> Result<Self> {
        if corruption_levels.len() != self.layers.len() {
            return Err(SdaErr::InvalidConfiguration(format!(
                "got {} corruption levels for {} hidden layers",
                corruption_levels.len(),
                self.layers.len()
            )));
        }

        for (layer, &level) in self.layers.iter_mut().zip(corruption_levels) {
            check_probability(level)?;
            layer.set_retain_prob(1. - level)?;
        }

        Ok(self)
    }

    pub fn n_layers(&self) -> usize {
        self.layers.len()
    }

    pub fn n_ins(&self) -> usize {
        self.layers[0].n_visible()
    }

    pub fn n_outs(&self) -> usize {
        self.output.n_out()
    }

    pub fn layers(&self) -> &[DenoisingAutoencoder] {
        &self.layers
    }

    pub fn output_layer(&self) -> &LogisticOutputLayer {
        &self.output
    }

    /// Returns the amount of parameters of the network, decoder biases included.
    pub fn size(&self) -> usize {
        self.layers.iter().map(DenoisingAutoencoder::size).sum::<usize>() + self.output.size()
    }

    /// The clean hidden output of `layer` for the raw input `x`.
    pub fn hidden_representation(&self, layer: usize, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.check_layer(layer)?;

        let mut h = self.layers[0].clean_hidden(x)?;
        for da in &self.layers[1..=layer] {
            h = da.clean_hidden(h.view())?;
        }

        Ok(h)
    }

    /// What `layer` is fed when the raw input is `x`: `x` itself for the bottom layer and the
    /// clean hidden output of the layer below otherwise.
    pub fn layer_input<'a>(
        &self,
        layer: usize,
        x: ArrayView2<'a, f32>,
    ) -> Result<CowArray<'a, f32, Ix2>> {
        self.check_layer(layer)?;

        match layer {
            0 => Ok(CowArray::from(x)),
            _ => Ok(CowArray::from(self.hidden_representation(layer - 1, x)?)),
        }
    }

    /// The top hidden representation of `x`.
    pub fn output(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.hidden_representation(self.layers.len() - 1, x)
    }

    pub fn predict_proba(&self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let h = self.output(x)?;
        self.output.predict_proba(h.view())
    }

    pub fn predict(&self, x: ArrayView2<f32>) -> Result<Array1<usize>> {
        let h = self.output(x)?;
        self.output.predict(h.view())
    }

    /// The fraction of misclassified rows of `x`.
    pub fn errors(&self, x: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<f32> {
        let h = self.output(x)?;
        self.output.errors(h.view(), y)
    }

    /// The negative log-likelihood of `y` given `x`, the cost minimized by fine-tuning.
    pub fn finetune_cost(&self, x: ArrayView2<f32>, y: ArrayView1<usize>) -> Result<f32> {
        let h = self.output(x)?;
        self.output.negative_log_likelihood(h.view(), y)
    }

    /// The reconstruction cost of `layer` for the raw input `x`.
    ///
    /// Draws a fresh corruption mask.
    pub fn pretraining_cost(&mut self, layer: usize, x: ArrayView2<f32>) -> Result<f32> {
        let input = self.layer_input(layer, x)?;
        self.layers[layer].reconstruction_cost(input.view())
    }

    /// Makes one gradient descent step on the reconstruction cost of `layer`.
    ///
    /// `x` is raw input, it's propagated through the layers below, which are left untouched.
    ///
    /// # Returns
    /// The cost before the update.
    pub fn pretrain_step(&mut self, layer: usize, x: ArrayView2<f32>, learning_rate: f32) -> Result<f32> {
        self.pretrain_step_with(layer, x, &mut GradientDescent::new(learning_rate))
    }

    /// Same as `pretrain_step` with an arbitrary update rule.
    pub fn pretrain_step_with<O: Optimizer>(
        &mut self,
        layer: usize,
        x: ArrayView2<f32>,
        optimizer: &mut O,
    ) -> Result<f32> {
        let input = self.layer_input(layer, x)?;
        self.layers[layer].gradient_step_with(input.view(), optimizer)
    }

    /// Makes one gradient descent step of the whole network on the negative log-likelihood of `y`.
    ///
    /// # Returns
    /// The cost before the update.
    pub fn finetune_step(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView1<usize>,
        learning_rate: f32,
    ) -> Result<f32> {
        let mut optimizers = vec![GradientDescent::new(learning_rate); self.layers.len() + 1];
        self.finetune_step_with(x, y, &mut optimizers)
    }

    /// Backpropagates the negative log-likelihood of `y` through the whole network and updates
    /// every encoder and the output layer at once.
    ///
    /// # Arguments
    /// * `x` - The raw input.
    /// * `y` - The label of every row of `x`.
    /// * `optimizers` - One optimizer per hidden layer, from the bottom up, followed by the
    ///   output layer's.
    ///
    /// # Returns
    /// The cost before the update.
    pub fn finetune_step_with<O: Optimizer + Send>(
        &mut self,
        x: ArrayView2<f32>,
        y: ArrayView1<usize>,
        optimizers: &mut [O],
    ) -> Result<f32> {
        let n_layers = self.layers.len();
        if optimizers.len() != n_layers + 1 {
            return Err(SdaErr::ShapeMismatch {
                what: "optimizers",
                got: optimizers.len(),
                expected: n_layers + 1,
            });
        }

        // activations[i] is the input of layer i, the last one feeds the output layer.
        let mut activations = Vec::with_capacity(n_layers + 1);
        activations.push(CowArray::from(x));
        for da in &self.layers {
            let h = da.clean_hidden(activations[activations.len() - 1].view())?;
            activations.push(CowArray::from(h));
        }

        let (cost, output_grad, mut dh) = self.output.backward(activations[n_layers].view(), y)?;

        let mut grads = Vec::with_capacity(n_layers);
        for (i, da) in self.layers.iter().enumerate().rev() {
            let (grad, dx) = da.encoder_backward(activations[i].view(), activations[i + 1].view(), dh);
            grads.push(grad);
            dh = dx;
        }
        grads.reverse();

        let (layer_optimizers, output_optimizer) = optimizers.split_at_mut(n_layers);
        self.layers
            .par_iter_mut()
            .zip(layer_optimizers.par_iter_mut())
            .zip(grads.par_iter())
            .for_each(|((da, optimizer), grad)| da.apply_encoder(optimizer, grad));
        self.output.apply(&mut output_optimizer[0], &output_grad);

        Ok(cost)
    }

    fn check_layer(&self, layer: usize) -> Result<()> {
        if layer >= self.layers.len() {
            return Err(SdaErr::LayerOutOfRange {
                layer,
                layers: self.layers.len(),
            });
        }

        Ok(())
    }
}
