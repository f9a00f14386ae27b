//! Family samplers.
//!
//! Each sampler turns uniform draws into one variate of its family.
//! References: Dodge & Jerse, "Computer Music", pp. 269-277;
//! Winsor & DeLisa, "Computer Music in C", pp. 177-205.
//!
//! RULES:
//!   - Samplers hold no state between calls. All scratch is local.
//!   - Every retry (excluded uniform values, rejected candidates) is
//!     charged to one Budget per draw. No sampler loops forever.

use crate::{
    error::{VariateError, VariateResult},
    params::{
        BetaParams, CauchyParams, GaussianParams, ParamBank, RateParams, TriangularParams,
        UniformParams, WeibullParams,
    },
    rng::UniformSource,
    types::Family,
};
use std::f64::consts::PI;

/// Default ceiling on rejected attempts within a single draw.
pub const DEFAULT_REJECTION_LIMIT: u32 = 65_536;

/// Number of uniforms summed by the Irwin-Hall Gaussian.
const GAUSSIAN_TERMS: u32 = 12;

/// Retry accounting for one draw.
struct Budget {
    family:   Family,
    limit:    u32,
    rejected: u32,
}

impl Budget {
    fn new(family: Family, limit: u32) -> Self {
        Self { family, limit, rejected: 0 }
    }

    fn reject(&mut self) -> VariateResult<()> {
        self.rejected += 1;
        if self.rejected > self.limit {
            log::warn!(
                "{} sampler exhausted after {} rejections",
                self.family,
                self.rejected
            );
            return Err(VariateError::SamplingExhausted {
                family:   self.family,
                attempts: self.rejected,
            });
        }
        Ok(())
    }

    /// Roll uniforms until one satisfies `accept`.
    fn uniform_where(
        &mut self,
        src: &mut UniformSource,
        accept: impl Fn(f64) -> bool,
    ) -> VariateResult<f64> {
        loop {
            let u = src.next_f64();
            if accept(u) {
                return Ok(u);
            }
            self.reject()?;
        }
    }
}

/// Draw one variate from `family` using its record in `bank`.
pub fn sample(
    family: Family,
    bank: &ParamBank,
    src: &mut UniformSource,
    limit: u32,
) -> VariateResult<f64> {
    match family {
        Family::Uniform     => Ok(uniform(&bank.uniform, src)),
        Family::Linear      => Ok(linear(src)),
        Family::Triangular  => triangular(&bank.triangular, src, limit),
        Family::Exponential => exponential(&bank.exponential, src, limit),
        Family::Bilateral   => bilateral(&bank.bilateral, src, limit),
        Family::Gaussian    => Ok(gaussian(&bank.gaussian, src)),
        Family::Cauchy      => cauchy(&bank.cauchy, src, limit),
        Family::Beta        => beta(&bank.beta, src, limit),
        Family::Weibull     => weibull(&bank.weibull, src, limit),
        Family::Poisson     => Err(VariateError::UnsupportedFamily { family }),
    }
}

pub fn uniform(p: &UniformParams, src: &mut UniformSource) -> f64 {
    scale_unit(p, src.next_f64())
}

/// Map `u` in [0, 1) onto [low, high). Rounding can land exactly on
/// `high` for `u` near 1; that case is pulled back one ulp.
fn scale_unit(p: &UniformParams, u: f64) -> f64 {
    let x = p.low() + p.range() * u;
    if p.range() > 0.0 && x >= p.high() {
        next_below(p.high())
    } else {
        x
    }
}

/// The largest f64 strictly less than finite `x`.
fn next_below(x: f64) -> f64 {
    if x == 0.0 {
        -f64::from_bits(1)
    } else if x > 0.0 {
        f64::from_bits(x.to_bits() - 1)
    } else {
        f64::from_bits(x.to_bits() + 1)
    }
}

/// Minimum of two uniforms. Density falls linearly from 0 to 1.
pub fn linear(src: &mut UniformSource) -> f64 {
    let u1 = src.next_f64();
    let u2 = src.next_f64();
    u1.min(u2)
}

/// Sum of two uniforms, each half stretched to its side of the peak.
///
/// With unequal sides the steeper half is thinned by the ratio of the
/// side widths so both halves meet at the same height at `peak`.
/// A zero-width side collapses onto `peak` itself and is never thinned.
pub fn triangular(
    p: &TriangularParams,
    src: &mut UniformSource,
    limit: u32,
) -> VariateResult<f64> {
    let (peak, diff_low, diff_high) = (p.peak(), p.diff_low(), p.diff_high());
    let mut budget = Budget::new(Family::Triangular, limit);
    loop {
        let s = src.next_f64() + src.next_f64();
        let out = if s < 1.0 {
            (s - 1.0) * diff_low + peak
        } else {
            (s - 1.0) * diff_high + peak
        };

        if diff_low == diff_high {
            return Ok(out);
        }

        let keep_ratio = if out < peak && diff_low < diff_high {
            diff_low / diff_high
        } else if out > peak && diff_high < diff_low {
            diff_high / diff_low
        } else {
            return Ok(out);
        };

        if src.next_f64() < keep_ratio {
            return Ok(out);
        }
        budget.reject()?;
    }
}

pub fn exponential(p: &RateParams, src: &mut UniformSource, limit: u32) -> VariateResult<f64> {
    let mut budget = Budget::new(Family::Exponential, limit);
    let u = budget.uniform_where(src, |u| u != 0.0)?;
    Ok(-u.ln() / p.lambda())
}

/// Two-sided exponential.
pub fn bilateral(p: &RateParams, src: &mut UniformSource, limit: u32) -> VariateResult<f64> {
    let mut budget = Budget::new(Family::Bilateral, limit);
    let n = 2.0 * budget.uniform_where(src, |u| {
        let n = 2.0 * u;
        n != 0.0 && n != 2.0
    })?;
    if n <= 1.0 {
        Ok(n.ln() / p.lambda())
    } else {
        Ok(-((2.0 - n) / p.lambda()).ln())
    }
}

/// Irwin-Hall approximation: twelve uniforms, recentred. Costs 12 rolls.
pub fn gaussian(p: &GaussianParams, src: &mut UniformSource) -> f64 {
    let sum: f64 = (0..GAUSSIAN_TERMS).map(|_| src.next_f64()).sum();
    p.deviation() * (sum - f64::from(GAUSSIAN_TERMS) / 2.0) + p.mean()
}

pub fn cauchy(p: &CauchyParams, src: &mut UniformSource, limit: u32) -> VariateResult<f64> {
    let mut budget = Budget::new(Family::Cauchy, limit);
    let u = budget.uniform_where(src, |u| u != 0.5)?;
    Ok(p.spread() * (PI * u).tan() + p.mean())
}

/// Jöhnk's method. Acceptance falls quickly as both shapes grow.
pub fn beta(p: &BetaParams, src: &mut UniformSource, limit: u32) -> VariateResult<f64> {
    let mut budget = Budget::new(Family::Beta, limit);
    loop {
        let u1 = budget.uniform_where(src, |u| u != 0.0)?;
        let u2 = budget.uniform_where(src, |u| u != 0.0)?;
        let p1 = u1.powf(p.inv_a());
        let p2 = u2.powf(p.inv_b());
        let sum = p1 + p2;
        // A zero sum means both powers underflowed; there is no ratio to take.
        if sum > 0.0 && sum <= 1.0 {
            return Ok(p1 / sum);
        }
        budget.reject()?;
    }
}

pub fn weibull(p: &WeibullParams, src: &mut UniformSource, limit: u32) -> VariateResult<f64> {
    let mut budget = Budget::new(Family::Weibull, limit);
    let u = budget.uniform_where(src, |u| u != 0.0 && u != 1.0)?;
    Ok(p.scale() * (1.0 / (1.0 - u)).ln().powf(p.inv_shape()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mean_of(n: usize, mut f: impl FnMut() -> f64) -> f64 {
        (0..n).map(|_| f()).sum::<f64>() / n as f64
    }

    #[test]
    fn linear_is_weighted_toward_zero() {
        let mut src = UniformSource::new(2024);
        let mean = mean_of(20_000, || linear(&mut src));
        // E[min(U1, U2)] = 1/3
        assert!((mean - 1.0 / 3.0).abs() < 0.01, "linear mean {mean}");
    }

    #[test]
    fn one_sided_triangle_piles_left_half_onto_peak() {
        let p = TriangularParams::new(2.0, 2.0, 5.0).unwrap();
        let mut src = UniformSource::new(31);
        let xs: Vec<f64> = (0..20_000)
            .map(|_| triangular(&p, &mut src, DEFAULT_REJECTION_LIMIT).unwrap())
            .collect();
        assert!(xs.iter().all(|x| (2.0..=5.0).contains(x)));

        // The zero-width left side lands exactly on the peak half the time.
        let at_peak = xs.iter().filter(|&&x| x == 2.0).count() as f64 / xs.len() as f64;
        assert!((at_peak - 0.5).abs() < 0.02, "share at peak {at_peak}");

        // Half at 2, half on the right side (mean 3): overall 2.5
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        assert!((mean - 2.5).abs() < 0.03, "one-sided mean {mean}");
    }

    #[test]
    fn uniform_never_reaches_high() {
        let largest_u = 1.0 - f64::EPSILON / 2.0;
        let p = UniformParams::new(1.0, 2.0).unwrap();
        let x = scale_unit(&p, largest_u);
        assert!(x < 2.0, "uniform [1, 2) produced {x}");

        let p = UniformParams::new(-3.0, -2.0).unwrap();
        assert!(scale_unit(&p, largest_u) < -2.0);

        let p = UniformParams::new(-1.0, 0.0).unwrap();
        assert!(scale_unit(&p, largest_u) < 0.0);

        let p = UniformParams::new(0.5, 0.5).unwrap();
        assert_eq!(scale_unit(&p, largest_u), 0.5);
    }

    #[test]
    fn degenerate_triangle_returns_the_peak() {
        let p = TriangularParams::new(4.0, 4.0, 4.0).unwrap();
        let mut src = UniformSource::new(1);
        assert_eq!(triangular(&p, &mut src, 1).unwrap(), 4.0);
    }

    #[test]
    fn exhausted_budget_reports_family_and_attempts() {
        // Jöhnk acceptance for a = b = 40 is around 1e-23.
        let p = BetaParams::new(40.0, 40.0).unwrap();
        let mut src = UniformSource::new(5);
        match beta(&p, &mut src, 8) {
            Err(VariateError::SamplingExhausted { family, attempts }) => {
                assert_eq!(family, Family::Beta);
                assert_eq!(attempts, 9);
            }
            other => panic!("expected SamplingExhausted, got {other:?}"),
        }
    }

    #[test]
    fn poisson_has_no_sampler() {
        let bank = ParamBank::default();
        let mut src = UniformSource::new(3);
        let err = sample(Family::Poisson, &bank, &mut src, DEFAULT_REJECTION_LIMIT).unwrap_err();
        assert!(matches!(err, VariateError::UnsupportedFamily { family: Family::Poisson }));
    }
}
