//! Persistence adapters for the rule set and saved calculations.

mod calculations;
mod file;
mod rules;

pub use calculations::{
    CalculationId, CalculationRepository, InMemoryCalculationRepository,
    JsonFileCalculationRepository, SavedCalculation,
};
pub use rules::{InMemoryRuleStore, JsonFileRuleStore, RuleStore};

use crate::rules::RuleValidationError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    InvalidRules(#[from] RuleValidationError),
    #[error("calculation name must not be empty")]
    EmptyName,
    #[error("storage io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to encode stored data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
