//! Configuration and family-selection tests.

use variate_core::{Family, VariateEngine, VariateError};

fn assert_validation(result: Result<(), VariateError>, family: Family, field: &str) {
    match result {
        Err(VariateError::Validation { family: f, field: got, .. }) => {
            assert_eq!(f, family);
            assert_eq!(got, field);
        }
        other => panic!("expected {family} validation error on {field}, got {other:?}"),
    }
}

#[test]
fn non_positive_shapes_are_rejected() {
    let mut engine = VariateEngine::with_seed(1);
    assert_validation(engine.configure_beta(0.0, 1.0), Family::Beta, "shape_a");
    assert_validation(engine.configure_beta(1.0, -0.5), Family::Beta, "shape_b");
    assert_validation(engine.configure_weibull(-1.0, 2.0), Family::Weibull, "shape");
    assert_validation(engine.configure_exponential(0.0), Family::Exponential, "lambda");
    assert_validation(engine.configure_bilateral(-2.0), Family::Bilateral, "lambda");
}

#[test]
fn misordered_limits_are_rejected() {
    let mut engine = VariateEngine::with_seed(1);
    assert_validation(engine.configure_uniform(1.0, 0.0), Family::Uniform, "high");
    assert_validation(engine.configure_triangular(0.0, -1.0, 1.0), Family::Triangular, "peak");
    assert_validation(
        engine.configure_triangular(0.0, 0.8, 0.5),
        Family::Triangular,
        "upper_limit",
    );
}

#[test]
fn non_finite_values_are_rejected() {
    let mut engine = VariateEngine::with_seed(1);
    assert_validation(engine.configure_gaussian(f64::NAN, 0.0), Family::Gaussian, "deviation");
    assert_validation(engine.configure_cauchy(1.0, f64::INFINITY), Family::Cauchy, "mean");
    assert_validation(engine.configure_uniform(f64::NEG_INFINITY, 0.0), Family::Uniform, "low");
    assert_validation(engine.configure_weibull(1.0, f64::NAN), Family::Weibull, "scale");
}

#[test]
fn failed_configuration_leaves_state_unchanged() {
    let mut engine = VariateEngine::with_seed(2);
    engine.configure_gaussian(0.5, 1.0).unwrap();
    let before = engine.params().clone();

    assert!(engine.configure_beta(0.0, 1.0).is_err());
    assert!(engine.configure_triangular(3.0, 2.0, 1.0).is_err());

    assert_eq!(engine.active_family(), Family::Gaussian);
    assert_eq!(engine.params(), &before);
}

#[test]
fn configuring_a_family_activates_it() {
    let mut engine = VariateEngine::with_seed(3);
    assert_eq!(engine.active_family(), Family::Uniform);

    engine.configure_exponential(2.0).unwrap();
    assert_eq!(engine.active_family(), Family::Exponential);

    engine.configure_weibull(2.0, 1.0).unwrap();
    assert_eq!(engine.active_family(), Family::Weibull);

    engine.configure_linear();
    assert_eq!(engine.active_family(), Family::Linear);
}

#[test]
fn activate_keeps_records_and_returns_previous_family() {
    let mut engine = VariateEngine::with_seed(4);
    engine.configure_triangular(1.0, 2.0, 4.0).unwrap();
    engine.configure_cauchy(0.2, 7.0).unwrap();

    let previous = engine.activate(Family::Triangular);
    assert_eq!(previous, Family::Cauchy);
    assert_eq!(engine.active_family(), Family::Triangular);

    let tri = engine.params().triangular;
    assert_eq!((tri.lower_limit(), tri.peak(), tri.upper_limit()), (1.0, 2.0, 4.0));
    assert_eq!(engine.params().cauchy.mean(), 7.0);

    for _ in 0..1_000 {
        let v = engine.draw().unwrap();
        assert!((1.0..=4.0).contains(&v));
    }
}

#[test]
fn construction_installs_default_records() {
    let engine = VariateEngine::with_seed(5);
    let p = engine.params();
    assert_eq!((p.uniform.low(), p.uniform.high()), (0.0, 1.0));
    assert_eq!(p.triangular.peak(), 0.5);
    assert_eq!(p.exponential.lambda(), 1.0);
    assert_eq!(p.bilateral.lambda(), 1.0);
    assert_eq!((p.cauchy.spread(), p.cauchy.mean()), (1.0, 0.0));
    assert_eq!((p.beta.inv_a(), p.beta.inv_b()), (2.0, 2.0));
    assert_eq!(engine.active_family(), Family::Uniform);
}

#[test]
fn rejection_limit_must_be_positive() {
    let mut engine = VariateEngine::with_seed(6);
    let err = engine.set_rejection_limit(0).unwrap_err();
    assert!(matches!(err, VariateError::RejectionLimit { value: 0 }));
    assert!(err.is_validation());

    engine.set_rejection_limit(3).unwrap();
    assert_eq!(engine.rejection_limit(), 3);
}

#[test]
fn family_codes_and_names_round_trip() {
    for family in Family::ALL {
        assert_eq!(Family::from_code(family.code()), family);
        assert_eq!(family.name().parse::<Family>().unwrap(), family);
    }
    assert_eq!(Family::from_code(42), Family::Uniform);
    assert_eq!(Family::from_code(-1), Family::Uniform);
    assert_eq!(" Gaussian ".parse::<Family>().unwrap(), Family::Gaussian);
    assert!(matches!(
        "gausian".parse::<Family>(),
        Err(VariateError::UnknownFamily { .. })
    ));
    assert!(!Family::Poisson.is_implemented());
}

#[test]
fn subnormal_shapes_and_rates_are_rejected() {
    let mut engine = VariateEngine::with_seed(7);
    engine.configure_cauchy(1.0, 0.0).unwrap();
    let before = engine.params().clone();

    assert_validation(engine.configure_weibull(1e-320, 1.0), Family::Weibull, "shape");
    assert_validation(engine.configure_beta(1e-320, 1.0), Family::Beta, "shape_a");
    assert_validation(engine.configure_beta(1.0, 5e-324), Family::Beta, "shape_b");
    assert_validation(engine.configure_exponential(1e-320), Family::Exponential, "lambda");
    // Reciprocal is finite but the largest tail overflows.
    assert_validation(engine.configure_bilateral(1e-308), Family::Bilateral, "lambda");

    assert_eq!(engine.active_family(), Family::Cauchy);
    assert_eq!(engine.params(), &before);

    // Small but normal values remain accepted.
    engine.configure_exponential(1e-300).unwrap();
    assert!(engine.draw().unwrap().is_finite());
}

#[test]
fn host_selector_skips_beta_and_poisson() {
    let host = [
        Family::Uniform,
        Family::Linear,
        Family::Triangular,
        Family::Exponential,
        Family::Bilateral,
        Family::Gaussian,
        Family::Cauchy,
        Family::Weibull,
    ];
    for (index, family) in host.into_iter().enumerate() {
        assert_eq!(Family::from_host_selector(index as i32), family);
    }
    assert_eq!(Family::from_host_selector(8), Family::Uniform);
    assert_eq!(Family::from_host_selector(-1), Family::Uniform);
    assert!((-2..12).all(|i| Family::from_host_selector(i) != Family::Beta));
    // Weibull's own code is 8, not its host index.
    assert_eq!(Family::from_code(7), Family::Beta);
}
