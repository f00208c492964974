use std::{
    error::Error,
    fmt::{self, Display},
};

use ndarray::ShapeError;
use rand_distr::{uniform::Error as UniformError, BernoulliError};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, SdaErr>;

/// The crate's error type.
#[derive(Debug)]
pub enum SdaErr {
    /// A layer was given a zero-sized dimension.
    InvalidDimension { what: &'static str },
    /// The network or training configuration is unusable.
    InvalidConfiguration(String),
    /// An input's width or length does not match what the layer expects.
    ShapeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A probability outside of `[0, 1]`.
    InvalidProbability(f32),
    /// A distribution could not be built.
    Distribution(String),
    /// A class label that the output layer can't represent.
    LabelOutOfRange { label: usize, classes: usize },
    /// A layer index past the top of the stack.
    LayerOutOfRange { layer: usize, layers: usize },
    EmptyDataset,
    MissingLabels,
    TrainingFinished,
    Shape(ShapeError),
}

impl Display for SdaErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdaErr::InvalidDimension { what } => {
                write!(f, "invalid dimension: {what} must be greater than zero")
            }
            SdaErr::InvalidConfiguration(msg) => write!(f, "invalid configuration: {msg}"),
            SdaErr::ShapeMismatch {
                what,
                got,
                expected,
            } => write!(
                f,
                "shape mismatch for {what}: got {got}, expected {expected}"
            ),
            SdaErr::InvalidProbability(p) => {
                write!(f, "invalid probability {p}, it must lie within [0, 1]")
            }
            SdaErr::Distribution(msg) => write!(f, "failed to build distribution: {msg}"),
            SdaErr::LabelOutOfRange { label, classes } => write!(
                f,
                "label {label} is out of range for an output layer of {classes} classes"
            ),
            SdaErr::LayerOutOfRange { layer, layers } => {
                write!(f, "layer {layer} is out of range for a stack of {layers} layers")
            }
            SdaErr::EmptyDataset => write!(f, "the dataset has no samples"),
            SdaErr::MissingLabels => write!(f, "fine-tuning requires a labeled dataset"),
            SdaErr::TrainingFinished => write!(f, "the trainer has already finished"),
            SdaErr::Shape(e) => write!(f, "shape error: {e}"),
        }
    }
}

impl Error for SdaErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SdaErr::Shape(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ShapeError> for SdaErr {
    fn from(value: ShapeError) -> Self {
        Self::Shape(value)
    }
}

impl From<UniformError> for SdaErr {
    fn from(value: UniformError) -> Self {
        Self::Distribution(value.to_string())
    }
}

impl From<BernoulliError> for SdaErr {
    fn from(value: BernoulliError) -> Self {
        Self::Distribution(value.to_string())
    }
}
