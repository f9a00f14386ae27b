//! Shared primitive types used across the engine.

use crate::error::VariateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A seed for the uniform source.
pub type Seed = u64;

/// The ten named distribution families.
///
/// Codes are stable: 0..=9 in declaration order. NEVER reorder or renumber.
/// Host selector indices are a different numbering; see
/// [`Family::from_host_selector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Family {
    #[default]
    Uniform = 0,
    Linear = 1,
    Triangular = 2,
    Exponential = 3,
    Bilateral = 4,
    Gaussian = 5,
    Cauchy = 6,
    Beta = 7,
    Weibull = 8,
    /// Placeholder: selectable, but drawing from it fails.
    Poisson = 9,
}

impl Family {
    pub const ALL: [Family; 10] = [
        Self::Uniform,
        Self::Linear,
        Self::Triangular,
        Self::Exponential,
        Self::Bilateral,
        Self::Gaussian,
        Self::Cauchy,
        Self::Beta,
        Self::Weibull,
        Self::Poisson,
    ];

    /// Map a family code to a family. Unknown codes fall back to Uniform.
    pub fn from_code(code: i32) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(Self::Uniform)
    }

    /// Map a host "Type" list index to a family.
    ///
    /// The host list has eight entries and no Beta or Poisson:
    /// Uniform, Linear, Triangular, Exponential, Bilateral, Gaussian,
    /// Cauchy, Weibull. Anything else falls back to Uniform.
    pub fn from_host_selector(index: i32) -> Self {
        match index {
            0..=6 => Self::from_code(index),
            7     => Self::Weibull,
            _     => Self::Uniform,
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Uniform     => "uniform",
            Self::Linear      => "linear",
            Self::Triangular  => "triangular",
            Self::Exponential => "exponential",
            Self::Bilateral   => "bilateral",
            Self::Gaussian    => "gaussian",
            Self::Cauchy      => "cauchy",
            Self::Beta        => "beta",
            Self::Weibull     => "weibull",
            Self::Poisson     => "poisson",
        }
    }

    /// Whether a sampler exists for this family.
    pub fn is_implemented(&self) -> bool {
        !matches!(self, Self::Poisson)
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = VariateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.name() == wanted)
            .ok_or(VariateError::UnknownFamily { name: s.to_string() })
    }
}
