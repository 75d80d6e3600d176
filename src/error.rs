//! Error taxonomy for the Defect Cost Engine.
//!
//! The cost calculator itself is total and never fails.  Errors arise
//! at the boundaries around it: invalid configuration, incomplete
//! defect submissions, and the persistence layer.

use crate::models::{PerceivedImpact, Phase};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CostError {
    #[error("work settings must be positive, got {hours_per_day} hours per day and {days_per_month} days per month")]
    InvalidWorkSettings { hours_per_day: f64, days_per_month: f64 },

    #[error("salary must be a non-negative amount, got {0}")]
    InvalidSalary(f64),

    #[error("role `{role}` has a minimum salary ({min}) above its maximum ({max})")]
    InvalidSalaryBand { role: String, min: f64, max: f64 },

    #[error("multiplier for phase `{phase}` must be positive, got {value}")]
    InvalidPhaseMultiplier { phase: Phase, value: f64 },

    #[error("multiplier for impact `{impact}` must be non-negative, got {value}")]
    InvalidImpactMultiplier { impact: PerceivedImpact, value: f64 },

    #[error("duplicate role id `{0}`")]
    DuplicateRole(String),

    #[error("unknown role `{0}`")]
    UnknownRole(String),

    #[error("a defect needs a title")]
    MissingTitle,

    #[error("a defect needs a perceived impact")]
    MissingImpact,

    #[error("a defect needs at least one role with hours worked")]
    NoRoleHours,

    #[error("hours for role `{role}` must be a non-negative number, got {hours}")]
    InvalidHours { role: String, hours: f64 },

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CostError {
    /// True for errors caused by the caller's input or configuration
    /// rather than by the environment.
    pub fn is_validation(&self) -> bool {
        !matches!(self, CostError::Storage(_) | CostError::Serialization(_))
    }
}

pub type Result<T> = std::result::Result<T, CostError>;
