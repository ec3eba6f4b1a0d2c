//! Domain models for ICSR causality assessment.

mod assessment;
mod case;
mod interaction;

pub use assessment::*;
pub use case::*;
pub use interaction::*;
