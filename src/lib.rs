//! Stacked denoising autoencoders.
//!
//! A stack of denoising autoencoders is pretrained one layer at a time on the reconstruction of
//! corrupted inputs and then fine-tuned as a whole, together with a logistic output layer, on a
//! supervised classification task.

pub mod arch;
pub mod dataset;
pub mod error;
pub mod optimization;
pub mod training;

pub use arch::{DenoisingAutoencoder, LogisticOutputLayer, StackedAutoencoderNetwork};
pub use dataset::{Batch, Dataset};
pub use error::{Result, SdaErr};
