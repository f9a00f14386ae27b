//! Seeded scalar variate generation for real-time control and audio paths.
//!
//! One [`VariateEngine`] per owning context. Configure a family (which
//! also activates it), then call [`VariateEngine::draw`] or
//! [`VariateEngine::draw_bounded`] once per tick or sample.

pub mod config;
pub mod engine;
pub mod error;
pub mod params;
pub mod rng;
pub mod sampler;
pub mod types;

pub use engine::{VariateEngine, BOUNDED_SENTINEL};
pub use error::{VariateError, VariateResult};
pub use types::{Family, Seed};
