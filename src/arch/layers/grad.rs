use ndarray::{Array1, Array2};

/// The gradient of a cost with respect to an affine map's weights and biases.
#[derive(Debug, Clone)]
pub struct LayerGrad {
    pub dw: Array2<f32>,
    pub db: Array1<f32>,
}

/// The gradient of the reconstruction cost of a denoising autoencoder.
///
/// The decoder shares the encoder's weights, so `encoder.dw` already accumulates the
/// contributions of both the encoding and the decoding paths.
#[derive(Debug, Clone)]
pub struct ReconstructionGrad {
    pub encoder: LayerGrad,
    pub db_prime: Array1<f32>,
}
