pub mod activations;
pub mod layers;
pub mod loss;
mod stacked;

pub use layers::{DenoisingAutoencoder, LogisticOutputLayer};
pub use stacked::StackedAutoencoderNetwork;
