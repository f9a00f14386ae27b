//! Per-family parameter records.
//!
//! Every record is built through a validating constructor, so a record
//! that exists is a record that satisfies its family's invariant.
//! Several families store derived forms (range, slope widths, reciprocal
//! shapes) because that is what the samplers consume.

use crate::{
    error::{VariateError, VariateResult},
    types::Family,
};

fn finite(family: Family, field: &'static str, value: f64) -> VariateResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(VariateError::Validation { family, field, value })
    }
}

fn positive(family: Family, field: &'static str, value: f64) -> VariateResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(VariateError::Validation { family, field, value })
    }
}

/// A positive value whose reciprocal is also finite. Subnormal shapes
/// would otherwise be stored as an infinite exponent.
fn invertible(family: Family, field: &'static str, value: f64) -> VariateResult<f64> {
    let value = positive(family, field, value)?;
    if (1.0 / value).is_finite() {
        Ok(value)
    } else {
        Err(VariateError::Validation { family, field, value })
    }
}

/// Largest `-ln(u)` the uniform source can produce: u >= 2^-53.
const MAX_UNIFORM_TAIL: f64 = 53.0 * std::f64::consts::LN_2;

/// A rate small enough to overflow `-ln(u) / lambda` is rejected.
fn rate(family: Family, value: f64) -> VariateResult<f64> {
    let value = invertible(family, "lambda", value)?;
    if (MAX_UNIFORM_TAIL / value).is_finite() {
        Ok(value)
    } else {
        Err(VariateError::Validation { family, field: "lambda", value })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformParams {
    low:   f64,
    high:  f64,
    range: f64,
}

impl UniformParams {
    /// `low == high` is allowed and yields a constant.
    pub fn new(low: f64, high: f64) -> VariateResult<Self> {
        let low = finite(Family::Uniform, "low", low)?;
        let high = finite(Family::Uniform, "high", high)?;
        if low > high {
            return Err(VariateError::Validation {
                family: Family::Uniform,
                field:  "high",
                value:  high,
            });
        }
        Ok(Self { low, high, range: high - low })
    }

    pub fn low(&self) -> f64 { self.low }
    pub fn range(&self) -> f64 { self.range }
    pub fn high(&self) -> f64 { self.high }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangularParams {
    peak:      f64,
    diff_low:  f64,
    diff_high: f64,
}

impl TriangularParams {
    pub fn new(lower_limit: f64, peak: f64, upper_limit: f64) -> VariateResult<Self> {
        let lower = finite(Family::Triangular, "lower_limit", lower_limit)?;
        let peak = finite(Family::Triangular, "peak", peak)?;
        let upper = finite(Family::Triangular, "upper_limit", upper_limit)?;
        if peak < lower {
            return Err(VariateError::Validation {
                family: Family::Triangular,
                field:  "peak",
                value:  peak,
            });
        }
        if upper < peak {
            return Err(VariateError::Validation {
                family: Family::Triangular,
                field:  "upper_limit",
                value:  upper,
            });
        }
        Ok(Self {
            peak,
            diff_low:  peak - lower,
            diff_high: upper - peak,
        })
    }

    pub fn peak(&self) -> f64 { self.peak }
    pub fn diff_low(&self) -> f64 { self.diff_low }
    pub fn diff_high(&self) -> f64 { self.diff_high }
    pub fn lower_limit(&self) -> f64 { self.peak - self.diff_low }
    pub fn upper_limit(&self) -> f64 { self.peak + self.diff_high }
}

/// Rate parameter shared by Exponential and Bilateral.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateParams {
    lambda: f64,
}

impl RateParams {
    pub fn exponential(lambda: f64) -> VariateResult<Self> {
        Ok(Self { lambda: rate(Family::Exponential, lambda)? })
    }

    pub fn bilateral(lambda: f64) -> VariateResult<Self> {
        Ok(Self { lambda: rate(Family::Bilateral, lambda)? })
    }

    pub fn lambda(&self) -> f64 { self.lambda }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianParams {
    deviation: f64,
    mean:      f64,
}

impl GaussianParams {
    pub fn new(deviation: f64, mean: f64) -> VariateResult<Self> {
        Ok(Self {
            deviation: finite(Family::Gaussian, "deviation", deviation)?,
            mean:      finite(Family::Gaussian, "mean", mean)?,
        })
    }

    pub fn deviation(&self) -> f64 { self.deviation }
    pub fn mean(&self) -> f64 { self.mean }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CauchyParams {
    spread: f64,
    mean:   f64,
}

impl CauchyParams {
    pub fn new(spread: f64, mean: f64) -> VariateResult<Self> {
        Ok(Self {
            spread: finite(Family::Cauchy, "spread", spread)?,
            mean:   finite(Family::Cauchy, "mean", mean)?,
        })
    }

    pub fn spread(&self) -> f64 { self.spread }
    pub fn mean(&self) -> f64 { self.mean }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetaParams {
    inv_a: f64,
    inv_b: f64,
}

impl BetaParams {
    pub fn new(shape_a: f64, shape_b: f64) -> VariateResult<Self> {
        let a = invertible(Family::Beta, "shape_a", shape_a)?;
        let b = invertible(Family::Beta, "shape_b", shape_b)?;
        Ok(Self { inv_a: 1.0 / a, inv_b: 1.0 / b })
    }

    pub fn inv_a(&self) -> f64 { self.inv_a }
    pub fn inv_b(&self) -> f64 { self.inv_b }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeibullParams {
    inv_shape: f64,
    scale:     f64,
}

impl WeibullParams {
    pub fn new(shape: f64, scale: f64) -> VariateResult<Self> {
        let shape = invertible(Family::Weibull, "shape", shape)?;
        let scale = finite(Family::Weibull, "scale", scale)?;
        Ok(Self { inv_shape: 1.0 / shape, scale })
    }

    pub fn inv_shape(&self) -> f64 { self.inv_shape }
    pub fn scale(&self) -> f64 { self.scale }
}

/// A validated record tagged with the family it configures.
///
/// Installing one of these both stores the record and activates the
/// family. Poisson has no variant: it can be activated but not configured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FamilyParams {
    Uniform(UniformParams),
    Linear,
    Triangular(TriangularParams),
    Exponential(RateParams),
    Bilateral(RateParams),
    Gaussian(GaussianParams),
    Cauchy(CauchyParams),
    Beta(BetaParams),
    Weibull(WeibullParams),
}

impl FamilyParams {
    pub fn family(&self) -> Family {
        match self {
            Self::Uniform(_)     => Family::Uniform,
            Self::Linear         => Family::Linear,
            Self::Triangular(_)  => Family::Triangular,
            Self::Exponential(_) => Family::Exponential,
            Self::Bilateral(_)   => Family::Bilateral,
            Self::Gaussian(_)    => Family::Gaussian,
            Self::Cauchy(_)      => Family::Cauchy,
            Self::Beta(_)        => Family::Beta,
            Self::Weibull(_)     => Family::Weibull,
        }
    }
}

/// Every family's record, held at once so switching families keeps
/// earlier settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamBank {
    pub uniform:     UniformParams,
    pub triangular:  TriangularParams,
    pub exponential: RateParams,
    pub bilateral:   RateParams,
    pub gaussian:    GaussianParams,
    pub cauchy:      CauchyParams,
    pub beta:        BetaParams,
    pub weibull:     WeibullParams,
}

impl Default for ParamBank {
    fn default() -> Self {
        Self {
            uniform:     UniformParams { low: 0.0, high: 1.0, range: 1.0 },
            triangular:  TriangularParams { peak: 0.5, diff_low: 0.5, diff_high: 0.5 },
            exponential: RateParams { lambda: 1.0 },
            bilateral:   RateParams { lambda: 1.0 },
            gaussian:    GaussianParams { deviation: 1.0, mean: 0.0 },
            cauchy:      CauchyParams { spread: 1.0, mean: 0.0 },
            beta:        BetaParams { inv_a: 2.0, inv_b: 2.0 },
            weibull:     WeibullParams { inv_shape: 1.0, scale: 1.0 },
        }
    }
}

impl ParamBank {
    /// Store one record. Linear has nothing to store.
    pub(crate) fn store(&mut self, params: FamilyParams) {
        match params {
            FamilyParams::Uniform(p)     => self.uniform = p,
            FamilyParams::Linear         => {}
            FamilyParams::Triangular(p)  => self.triangular = p,
            FamilyParams::Exponential(p) => self.exponential = p,
            FamilyParams::Bilateral(p)   => self.bilateral = p,
            FamilyParams::Gaussian(p)    => self.gaussian = p,
            FamilyParams::Cauchy(p)      => self.cauchy = p,
            FamilyParams::Beta(p)        => self.beta = p,
            FamilyParams::Weibull(p)     => self.weibull = p,
        }
    }
}
