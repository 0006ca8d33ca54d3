use serde::{Serialize, Deserialize};

/// Count of optimization steps taken so far.
///
/// Owned by the training loop and advanced exactly once per applied update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalStep(u64);

impl GlobalStep {
    pub fn new() -> Self {
        GlobalStep(0)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn advance(&mut self) {
        self.0 += 1;
    }
}

impl From<u64> for GlobalStep {
    fn from(step: u64) -> Self {
        GlobalStep(step)
    }
}
