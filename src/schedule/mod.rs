pub mod staircase;
pub mod global_step;

pub use staircase::{StaircaseDecay, LearningRateSchedule, BnDecaySchedule};
pub use global_step::GlobalStep;
