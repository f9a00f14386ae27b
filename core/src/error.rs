use crate::types::Family;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VariateError {
    #[error("Invalid {family} parameter {field} = {value}")]
    Validation {
        family: Family,
        field:  &'static str,
        value:  f64,
    },

    #[error("Rejection limit must be at least 1, got {value}")]
    RejectionLimit { value: u32 },

    #[error("Cannot draw from inverted or empty range [{min}, {max}]")]
    Range { min: f64, max: f64 },

    #[error("{family} sampler gave up after {attempts} rejected attempts")]
    SamplingExhausted { family: Family, attempts: u32 },

    #[error("No draw landed in [{min}, {max}] after {attempts} attempts")]
    BoundedExhausted { min: f64, max: f64, attempts: u32 },

    #[error("Family '{family}' has no sampler")]
    UnsupportedFamily { family: Family },

    #[error("Unknown family '{name}'")]
    UnknownFamily { name: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl VariateError {
    /// True for the configuration-time failures that leave engine state untouched.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::RejectionLimit { .. })
    }
}

pub type VariateResult<T> = Result<T, VariateError>;
