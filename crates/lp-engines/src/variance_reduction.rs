//! Control-variate variance reduction for American runs.
//!
//! The discretization error of a European lattice run is highly
//! correlated with the error of the American run at the same step count.
//! Subtracting the European run and adding back the exact closed-form
//! value removes most of that shared bias while preserving the
//! early-exercise premium.

use crate::black_scholes::BlackScholesValues;
use crate::lattice_engine::{PricingResult, TreeEngine};
use lp_core::{ensure_matched, errors::Result};
use lp_instruments::ExerciseType;

/// Combine an American and a European run with the closed-form benchmark:
/// `American − European + benchmark`, applied independently to price,
/// delta, gamma, and theta.
///
/// Both engines must share step count, arity, method, and market
/// parameters (mismatched-composition otherwise) and must have been run
/// (not-yet-executed otherwise).
pub fn combine(
    american: &TreeEngine,
    european: &TreeEngine,
    benchmark: &BlackScholesValues,
) -> Result<PricingResult> {
    ensure_matched!(
        american.exercise() == ExerciseType::American,
        "first engine must use American exercise, got {}",
        american.exercise()
    );
    ensure_matched!(
        european.exercise() == ExerciseType::European,
        "second engine must use European exercise, got {}",
        european.exercise()
    );
    ensure_matched!(
        american.step_count() == european.step_count(),
        "step counts differ: {} vs {}",
        american.step_count(),
        european.step_count()
    );
    ensure_matched!(
        american.kind() == european.kind(),
        "lattice kinds differ: {} vs {}",
        american.kind(),
        european.kind()
    );
    ensure_matched!(
        american.method() == european.method(),
        "methods differ: {} vs {}",
        american.method(),
        european.method()
    );
    ensure_matched!(
        american.market() == european.market(),
        "market parameters differ: {} vs {}",
        american.market(),
        european.market()
    );

    let a = american.results()?;
    let e = european.results()?;
    let option_type = american.market().option_type();

    Ok(PricingResult {
        price: a.price - e.price + benchmark.price(option_type),
        delta: a.delta - e.delta + benchmark.delta(option_type),
        gamma: a.gamma - e.gamma + benchmark.gamma,
        theta: a.theta - e.theta + benchmark.theta(option_type),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::black_scholes::black_scholes_values;
    use crate::lattice_engine::{LatticeKind, Method};
    use lp_core::errors::Error;
    use lp_instruments::{MarketParameters, OptionType};

    fn put_41_43() -> MarketParameters {
        MarketParameters::new(41.0, 43.0, 0.035, 0.0075, 0.24, 1.0, OptionType::Put).unwrap()
    }

    fn benchmark() -> BlackScholesValues {
        black_scholes_values(41.0, 43.0, 1.0, 0.24, 0.035, 0.0075)
    }

    fn run(steps: usize, exercise: ExerciseType) -> TreeEngine {
        let mut e = TreeEngine::new(
            put_41_43(),
            steps,
            LatticeKind::Binomial,
            Method::Plain,
            exercise,
        )
        .unwrap();
        e.run().unwrap();
        e
    }

    #[test]
    fn combination_is_the_stated_algebra() {
        let am = run(60, ExerciseType::American);
        let eu = run(60, ExerciseType::European);
        let bench = benchmark();
        let out = combine(&am, &eu, &bench).unwrap();
        let expected = am.price().unwrap() - eu.price().unwrap() + bench.put_price;
        assert!((out.price - expected).abs() < 1e-14);
        let expected_delta = am.delta().unwrap() - eu.delta().unwrap() + bench.put_delta;
        assert!((out.delta - expected_delta).abs() < 1e-14);
    }

    #[test]
    fn rejects_swapped_policies() {
        let am = run(60, ExerciseType::American);
        let eu = run(60, ExerciseType::European);
        assert!(matches!(
            combine(&eu, &am, &benchmark()),
            Err(Error::MismatchedComposition(_))
        ));
    }

    #[test]
    fn rejects_differing_step_counts() {
        let am = run(60, ExerciseType::American);
        let eu = run(61, ExerciseType::European);
        assert!(matches!(
            combine(&am, &eu, &benchmark()),
            Err(Error::MismatchedComposition(_))
        ));
    }

    #[test]
    fn rejects_differing_markets() {
        let am = run(60, ExerciseType::American);
        let other =
            MarketParameters::new(41.0, 44.0, 0.035, 0.0075, 0.24, 1.0, OptionType::Put).unwrap();
        let mut eu = TreeEngine::new(
            other,
            60,
            LatticeKind::Binomial,
            Method::Plain,
            ExerciseType::European,
        )
        .unwrap();
        eu.run().unwrap();
        assert!(matches!(
            combine(&am, &eu, &benchmark()),
            Err(Error::MismatchedComposition(_))
        ));
    }

    #[test]
    fn requires_both_runs_executed() {
        let am = run(60, ExerciseType::American);
        let eu = TreeEngine::new(
            put_41_43(),
            60,
            LatticeKind::Binomial,
            Method::Plain,
            ExerciseType::European,
        )
        .unwrap();
        assert!(matches!(
            combine(&am, &eu, &benchmark()),
            Err(Error::NotExecuted)
        ));
    }
}
