mod builder;
mod phase;
mod report;
mod spec;
mod trainer;

pub use builder::SdaBuilder;
pub use phase::Phase;
pub use report::PhaseReport;
pub use spec::{NetworkSpec, PhaseSpec, TrainingSpec, DEFAULT_CORRUPTION_LEVEL};
pub use trainer::SdaTrainer;
