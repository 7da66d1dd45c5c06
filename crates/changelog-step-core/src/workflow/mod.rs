//! Step workflow

mod runner;
mod stage;

pub use runner::{StepOutcome, StepRunner};
pub use stage::StepStage;
