pub mod manager;

pub use manager::{Checkpoint, CheckpointManager, CHECKPOINT_FILE};
