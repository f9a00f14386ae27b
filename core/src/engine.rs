//! The variate engine: one long-lived instance per owning context.
//!
//! RULES:
//!   - Configuring a family stores its record AND makes it active.
//!     The host relies on "set parameter => become active family".
//!   - A rejected configuration changes nothing.
//!   - Reseeding restarts the uniform stream; records and the active
//!     family are untouched.
//!   - All randomness flows through the engine's own UniformSource.

use crate::{
    error::{VariateError, VariateResult},
    params::{
        BetaParams, CauchyParams, FamilyParams, GaussianParams, ParamBank, RateParams,
        TriangularParams, UniformParams, WeibullParams,
    },
    rng::UniformSource,
    sampler::{self, DEFAULT_REJECTION_LIMIT},
    types::{Family, Seed},
};

/// Value returned by [`VariateEngine::draw_bounded`] when no draw lands
/// in range. Indistinguishable from a genuine 0.0; see
/// [`VariateEngine::draw_bounded_strict`].
pub const BOUNDED_SENTINEL: f64 = 0.0;

#[derive(Debug, Clone)]
pub struct VariateEngine {
    source:          UniformSource,
    active:          Family,
    params:          ParamBank,
    rejection_limit: u32,
}

impl Default for VariateEngine {
    fn default() -> Self { Self::new() }
}

impl VariateEngine {
    /// Clock-seeded engine. Sequences differ run to run.
    pub fn new() -> Self {
        Self::from_source(UniformSource::from_clock())
    }

    pub fn with_seed(seed: Seed) -> Self {
        Self::from_source(UniformSource::new(seed))
    }

    fn from_source(source: UniformSource) -> Self {
        log::debug!("variate engine created with seed {}", source.seed());
        Self {
            source,
            active:          Family::Uniform,
            params:          ParamBank::default(),
            rejection_limit: DEFAULT_REJECTION_LIMIT,
        }
    }

    // ── Seed ───────────────────────────────────────

    pub fn reseed(&mut self, seed: Seed) {
        log::debug!("reseed {seed}");
        self.source.reseed(seed);
    }

    pub fn seed(&self) -> Seed {
        self.source.seed()
    }

    // ── Family selection ───────────────────────────

    pub fn active_family(&self) -> Family {
        self.active
    }

    /// Switch families without touching any stored record.
    /// Returns the previously active family.
    pub fn activate(&mut self, family: Family) -> Family {
        let previous = std::mem::replace(&mut self.active, family);
        log::debug!("activate {family} (was {previous})");
        previous
    }

    pub fn params(&self) -> &ParamBank {
        &self.params
    }

    pub fn rejection_limit(&self) -> u32 {
        self.rejection_limit
    }

    pub fn set_rejection_limit(&mut self, limit: u32) -> VariateResult<()> {
        if limit == 0 {
            return Err(VariateError::RejectionLimit { value: limit });
        }
        self.rejection_limit = limit;
        Ok(())
    }

    // ── Configuration ──────────────────────────────

    /// Install a validated record and activate its family in one step.
    /// Returns the previously active family.
    pub fn configure(&mut self, params: FamilyParams) -> Family {
        let family = params.family();
        self.params.store(params);
        let previous = std::mem::replace(&mut self.active, family);
        log::debug!("configure {family}: {params:?}");
        previous
    }

    pub fn configure_uniform(&mut self, low: f64, high: f64) -> VariateResult<()> {
        self.configure(FamilyParams::Uniform(UniformParams::new(low, high)?));
        Ok(())
    }

    /// Linear has no parameters; this only activates it.
    pub fn configure_linear(&mut self) {
        self.configure(FamilyParams::Linear);
    }

    pub fn configure_triangular(
        &mut self,
        lower_limit: f64,
        peak: f64,
        upper_limit: f64,
    ) -> VariateResult<()> {
        let p = TriangularParams::new(lower_limit, peak, upper_limit)?;
        self.configure(FamilyParams::Triangular(p));
        Ok(())
    }

    pub fn configure_exponential(&mut self, lambda: f64) -> VariateResult<()> {
        self.configure(FamilyParams::Exponential(RateParams::exponential(lambda)?));
        Ok(())
    }

    pub fn configure_bilateral(&mut self, lambda: f64) -> VariateResult<()> {
        self.configure(FamilyParams::Bilateral(RateParams::bilateral(lambda)?));
        Ok(())
    }

    pub fn configure_gaussian(&mut self, deviation: f64, mean: f64) -> VariateResult<()> {
        self.configure(FamilyParams::Gaussian(GaussianParams::new(deviation, mean)?));
        Ok(())
    }

    pub fn configure_cauchy(&mut self, spread: f64, mean: f64) -> VariateResult<()> {
        self.configure(FamilyParams::Cauchy(CauchyParams::new(spread, mean)?));
        Ok(())
    }

    pub fn configure_beta(&mut self, shape_a: f64, shape_b: f64) -> VariateResult<()> {
        self.configure(FamilyParams::Beta(BetaParams::new(shape_a, shape_b)?));
        Ok(())
    }

    pub fn configure_weibull(&mut self, shape: f64, scale: f64) -> VariateResult<()> {
        self.configure(FamilyParams::Weibull(WeibullParams::new(shape, scale)?));
        Ok(())
    }

    // ── Drawing ────────────────────────────────────

    /// One variate from the active family.
    pub fn draw(&mut self) -> VariateResult<f64> {
        let value = sampler::sample(
            self.active,
            &self.params,
            &mut self.source,
            self.rejection_limit,
        )?;
        log::trace!("draw {}: {value}", self.active);
        Ok(value)
    }

    /// First of up to `max_attempts + 1` draws that lands in `[min, max]`,
    /// or [`BOUNDED_SENTINEL`] if none does.
    pub fn draw_bounded(&mut self, min: f64, max: f64, max_attempts: u32) -> VariateResult<f64> {
        match self.draw_within(min, max, max_attempts)? {
            Some(value) => Ok(value),
            None => {
                log::warn!(
                    "no {} draw in [{min}, {max}] after {} attempts, returning sentinel",
                    self.active,
                    u64::from(max_attempts) + 1
                );
                Ok(BOUNDED_SENTINEL)
            }
        }
    }

    /// Like [`draw_bounded`](Self::draw_bounded), but exhaustion is an error.
    pub fn draw_bounded_strict(
        &mut self,
        min: f64,
        max: f64,
        max_attempts: u32,
    ) -> VariateResult<f64> {
        self.draw_within(min, max, max_attempts)?
            .ok_or(VariateError::BoundedExhausted {
                min,
                max,
                attempts: max_attempts.saturating_add(1),
            })
    }

    fn draw_within(&mut self, min: f64, max: f64, max_attempts: u32) -> VariateResult<Option<f64>> {
        // Written so NaN bounds fail too.
        if !(min < max) {
            return Err(VariateError::Range { min, max });
        }
        for _ in 0..=max_attempts {
            let value = self.draw()?;
            if (min..=max).contains(&value) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }
}
