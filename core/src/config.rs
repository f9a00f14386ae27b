use crate::{
    engine::VariateEngine,
    error::VariateResult,
    params::{
        BetaParams, CauchyParams, FamilyParams, GaussianParams, RateParams, TriangularParams,
        UniformParams, WeibullParams,
    },
    types::{Family, Seed},
};
use serde::Deserialize;

/// Raw, unvalidated family settings as they appear in a preset file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum FamilySettings {
    Uniform { low: f64, high: f64 },
    Linear,
    Triangular { lower_limit: f64, peak: f64, upper_limit: f64 },
    Exponential { lambda: f64 },
    Bilateral { lambda: f64 },
    Gaussian { deviation: f64, mean: f64 },
    Cauchy { spread: f64, mean: f64 },
    Beta { shape_a: f64, shape_b: f64 },
    Weibull { shape: f64, scale: f64 },
}

impl FamilySettings {
    pub fn validate(&self) -> VariateResult<FamilyParams> {
        Ok(match *self {
            Self::Uniform { low, high } => FamilyParams::Uniform(UniformParams::new(low, high)?),
            Self::Linear => FamilyParams::Linear,
            Self::Triangular { lower_limit, peak, upper_limit } => FamilyParams::Triangular(
                TriangularParams::new(lower_limit, peak, upper_limit)?,
            ),
            Self::Exponential { lambda } => FamilyParams::Exponential(RateParams::exponential(lambda)?),
            Self::Bilateral { lambda } => FamilyParams::Bilateral(RateParams::bilateral(lambda)?),
            Self::Gaussian { deviation, mean } => {
                FamilyParams::Gaussian(GaussianParams::new(deviation, mean)?)
            }
            Self::Cauchy { spread, mean } => FamilyParams::Cauchy(CauchyParams::new(spread, mean)?),
            Self::Beta { shape_a, shape_b } => FamilyParams::Beta(BetaParams::new(shape_a, shape_b)?),
            Self::Weibull { shape, scale } => FamilyParams::Weibull(WeibullParams::new(shape, scale)?),
        })
    }
}

/// A declarative engine preset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Absent means clock-seeded.
    #[serde(default)]
    pub seed: Option<Seed>,
    #[serde(default)]
    pub rejection_limit: Option<u32>,
    /// Applied in order; the last one is active unless `active` says otherwise.
    #[serde(default)]
    pub families: Vec<FamilySettings>,
    #[serde(default)]
    pub active: Option<Family>,
}

impl EngineConfig {
    /// Load a preset file.
    /// In tests, use EngineConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config = Self::from_json_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid preset {path}: {e}"))?;
        log::debug!("loaded preset {path} ({} families)", config.families.len());
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> VariateResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate every family first, then apply. A bad entry leaves the
    /// engine as it was.
    pub fn apply(&self, engine: &mut VariateEngine) -> VariateResult<()> {
        let validated = self
            .families
            .iter()
            .map(FamilySettings::validate)
            .collect::<VariateResult<Vec<_>>>()?;

        if let Some(limit) = self.rejection_limit {
            engine.set_rejection_limit(limit)?;
        }
        if let Some(seed) = self.seed {
            engine.reseed(seed);
        }
        for params in validated {
            engine.configure(params);
        }
        if let Some(family) = self.active {
            engine.activate(family);
        }
        Ok(())
    }

    pub fn build_engine(&self) -> VariateResult<VariateEngine> {
        let mut engine = match self.seed {
            Some(seed) => VariateEngine::with_seed(seed),
            None => VariateEngine::new(),
        };
        self.apply(&mut engine)?;
        Ok(engine)
    }

    /// Fixed seed with every implemented family at its constructor defaults.
    pub fn default_test() -> Self {
        Self {
            seed: Some(42),
            rejection_limit: None,
            families: vec![
                FamilySettings::Beta { shape_a: 0.5, shape_b: 0.5 },
                FamilySettings::Cauchy { spread: 1.0, mean: 0.0 },
                FamilySettings::Exponential { lambda: 1.0 },
                FamilySettings::Bilateral { lambda: 1.0 },
                FamilySettings::Gaussian { deviation: 1.0, mean: 0.0 },
                FamilySettings::Weibull { shape: 1.0, scale: 1.0 },
                FamilySettings::Triangular { lower_limit: 0.0, peak: 0.5, upper_limit: 1.0 },
                FamilySettings::Uniform { low: 0.0, high: 1.0 },
            ],
            active: None,
        }
    }
}
