pub mod epoch_stats;
pub mod events;
pub mod history;
pub mod loop_fn;
pub mod phase;
pub mod step;
pub mod train_config;

pub use epoch_stats::EpochStats;
pub use events::{EventWriter, StepEvent};
pub use history::History;
pub use loop_fn::train_loop;
pub use phase::{run_phase, PhaseContext, PhaseKind, PhaseOutcome};
pub use step::{optimize_step, StepOutput};
pub use train_config::TrainConfig;
