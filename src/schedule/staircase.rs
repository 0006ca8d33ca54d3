use serde::{Serialize, Deserialize};

use crate::error::{Result, TrainError};
use crate::schedule::GlobalStep;

/// Exponential decay discretized into stairs of `decay_step` examples:
///   value(step) = base * decay_rate ^ floor(step * batch_size / decay_step)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StaircaseDecay {
    pub base: f64,
    /// Examples processed per stair.
    pub decay_step: f64,
    pub decay_rate: f64,
}

impl StaircaseDecay {
    pub fn value(&self, step: GlobalStep, batch_size: usize) -> f64 {
        let examples = step.value() as f64 * batch_size as f64;
        let stairs = (examples / self.decay_step).floor();
        self.base * self.decay_rate.powf(stairs)
    }

    pub fn validate(&self, what: &str) -> Result<()> {
        if !(self.decay_step > 0.0) {
            return Err(TrainError::invalid_config(format!(
                "{what}: decay_step must be positive, got {}",
                self.decay_step
            )));
        }
        if !(self.decay_rate > 0.0 && self.decay_rate <= 1.0) {
            return Err(TrainError::invalid_config(format!(
                "{what}: decay_rate must be in (0, 1], got {}",
                self.decay_rate
            )));
        }
        Ok(())
    }
}

/// Staircase learning rate clamped from below.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LearningRateSchedule {
    pub decay: StaircaseDecay,
    pub floor: f64,
}

impl LearningRateSchedule {
    pub fn at(&self, step: GlobalStep, batch_size: usize) -> f64 {
        self.decay.value(step, batch_size).max(self.floor)
    }
}

impl Default for LearningRateSchedule {
    fn default() -> Self {
        LearningRateSchedule {
            decay: StaircaseDecay {
                base: 0.001,
                decay_step: 200_000.0,
                decay_rate: 0.7,
            },
            floor: 0.00001,
        }
    }
}

/// Batch-normalization decay: one minus a staircase momentum, clamped from above.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BnDecaySchedule {
    pub momentum: StaircaseDecay,
    pub clip: f64,
}

impl BnDecaySchedule {
    pub fn at(&self, step: GlobalStep, batch_size: usize) -> f64 {
        (1.0 - self.momentum.value(step, batch_size)).min(self.clip)
    }
}

impl Default for BnDecaySchedule {
    fn default() -> Self {
        BnDecaySchedule {
            momentum: StaircaseDecay {
                base: 0.5,
                decay_step: 200_000.0,
                decay_rate: 0.5,
            },
            clip: 0.99,
        }
    }
}
