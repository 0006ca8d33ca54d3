use serde::{Serialize, Deserialize};

/// One named scalar loss term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LossTerm {
    pub name: String,
    pub value: f64,
}

/// Ordered list of named loss terms built fresh for every step.
///
/// The training objective is the sum of all registered terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LossRegistry {
    terms: Vec<LossTerm>,
}

impl LossRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.terms.push(LossTerm {
            name: name.into(),
            value,
        });
    }

    pub fn terms(&self) -> &[LossTerm] {
        &self.terms
    }

    pub fn total(&self) -> f64 {
        self.terms.iter().map(|t| t.value).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
