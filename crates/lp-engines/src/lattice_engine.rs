//! Lattice pricing engine with variant composition.
//!
//! A [`TreeEngine`] pairs one lattice arity with one exercise policy and
//! one of four run methods:
//!
//! | Method | Sub-runs | Result |
//! |---|---|---|
//! | [`Method::Plain`] | one, raw payoff at layer N | the run itself |
//! | [`Method::Averaging`] | Plain at N and N+1 | arithmetic mean |
//! | [`Method::Smoothed`] | one, closed-form layer at N−1 | the run itself |
//! | [`Method::Extrapolated`] | Smoothed at N and N/2 | 2·fine − coarse |
//!
//! Averaging cancels the odd/even-N oscillation of a recombining
//! lattice; smoothing removes the kink the discrete payoff puts at
//! maturity; extrapolation cancels the leading first-order error of the
//! smoothed run. Every composed variant builds its sub-runs itself and
//! shares no state with them.
//!
//! All parameter validation happens at construction. `run` recomputes
//! from scratch on every call; accessors fail with not-yet-executed
//! until the first `run`.

use crate::black_scholes::black_scholes_values;
use lp_core::{
    ensure, ensure_matched,
    errors::{Error, Result},
    Real, Size,
};
use lp_instruments::{ExerciseType, MarketParameters};
use lp_methods::{BinomialLattice, NodeValues, TrinomialLattice};
use std::fmt;

/// Lattice branching arity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LatticeKind {
    /// Two branches per node.
    Binomial,
    /// Three branches per node.
    Trinomial,
}

impl fmt::Display for LatticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatticeKind::Binomial => write!(f, "Binomial"),
            LatticeKind::Trinomial => write!(f, "Trinomial"),
        }
    }
}

/// Run method (the variant family).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Method {
    /// Single run with the raw payoff at maturity.
    Plain,
    /// Mean of Plain runs at N and N+1 steps.
    Averaging,
    /// Single run with the closed-form value one step before maturity.
    Smoothed,
    /// Richardson extrapolation of Smoothed runs at N and N/2 steps.
    Extrapolated,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Plain => write!(f, "Plain"),
            Method::Averaging => write!(f, "Averaging"),
            Method::Smoothed => write!(f, "Smoothed"),
            Method::Extrapolated => write!(f, "Extrapolated"),
        }
    }
}

/// Price and sensitivities of a completed run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PricingResult {
    /// Fair value.
    pub price: Real,
    /// Sensitivity to the spot price.
    pub delta: Real,
    /// Second-order sensitivity to the spot price.
    pub gamma: Real,
    /// Sensitivity to the passage of time.
    pub theta: Real,
}

/// Output of one induction run. Sensitivities whose retained layer never
/// existed (step counts too small) are absent rather than fabricated.
#[derive(Debug, Clone, Copy)]
struct RunValues {
    price: Real,
    delta: Option<Real>,
    gamma: Option<Real>,
    theta: Option<Real>,
}

impl RunValues {
    fn from_lattice(
        values: &NodeValues,
        delta: Option<Real>,
        gamma: Option<Real>,
        theta: Option<Real>,
    ) -> Self {
        Self {
            price: values.price(),
            delta,
            gamma,
            theta,
        }
    }
}

fn zip_with(a: Option<Real>, b: Option<Real>, f: impl Fn(Real, Real) -> Real) -> Option<Real> {
    match (a, b) {
        (Some(a), Some(b)) => Some(f(a, b)),
        _ => None,
    }
}

fn average(a: RunValues, b: RunValues) -> RunValues {
    let mean = |x: Real, y: Real| 0.5 * (x + y);
    RunValues {
        price: mean(a.price, b.price),
        delta: zip_with(a.delta, b.delta, mean),
        gamma: zip_with(a.gamma, b.gamma, mean),
        theta: zip_with(a.theta, b.theta, mean),
    }
}

fn richardson(fine: RunValues, coarse: RunValues) -> RunValues {
    let extrapolate = |f: Real, c: Real| 2.0 * f - c;
    RunValues {
        price: extrapolate(fine.price, coarse.price),
        delta: zip_with(fine.delta, coarse.delta, extrapolate),
        gamma: zip_with(fine.gamma, coarse.gamma, extrapolate),
        theta: zip_with(fine.theta, coarse.theta, extrapolate),
    }
}

/// A lattice pricing engine.
///
/// Owns its market parameters and, after [`run`](Self::run), the values
/// retained from its sub-runs. Engines are independent: callers may run
/// any number of them in parallel.
#[derive(Debug, Clone)]
pub struct TreeEngine {
    market: MarketParameters,
    steps: Size,
    kind: LatticeKind,
    method: Method,
    exercise: ExerciseType,
    values: Option<RunValues>,
}

impl TreeEngine {
    /// Create an engine, validating the step count and every derived
    /// lattice parameter the configured method will need.
    ///
    /// Fails with invalid-parameters when a branch probability leaves
    /// [0, 1] or the step count is unusable for the method, and with
    /// mismatched-composition when the extrapolated step-count
    /// relationship (even, at least 4) does not hold.
    pub fn new(
        market: MarketParameters,
        steps: Size,
        kind: LatticeKind,
        method: Method,
        exercise: ExerciseType,
    ) -> Result<Self> {
        match method {
            Method::Plain => {
                validate_lattice(&market, steps, kind)?;
            }
            Method::Averaging => {
                validate_lattice(&market, steps, kind)?;
                validate_lattice(&market, steps + 1, kind)?;
            }
            Method::Smoothed => {
                ensure!(
                    steps >= 2,
                    "smoothed runs need at least 2 steps, got {steps}"
                );
                validate_lattice(&market, steps, kind)?;
            }
            Method::Extrapolated => {
                ensure_matched!(
                    steps % 2 == 0 && steps >= 4,
                    "extrapolated runs need an even step count of at least 4, got {steps}"
                );
                validate_lattice(&market, steps, kind)?;
                validate_lattice(&market, steps / 2, kind)?;
            }
        }
        Ok(Self {
            market,
            steps,
            kind,
            method,
            exercise,
            values: None,
        })
    }

    /// Market parameters of this engine.
    pub fn market(&self) -> &MarketParameters {
        &self.market
    }

    /// Configured step count N.
    pub fn step_count(&self) -> Size {
        self.steps
    }

    /// Lattice arity.
    pub fn kind(&self) -> LatticeKind {
        self.kind
    }

    /// Run method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Exercise policy.
    pub fn exercise(&self) -> ExerciseType {
        self.exercise
    }

    /// Execute the configured run, replacing any previous results.
    ///
    /// Construction already validated every sub-run, so this cannot fail
    /// in practice; the induction itself cannot fail for finite step
    /// counts.
    pub fn run(&mut self) -> Result<()> {
        let values = match self.method {
            Method::Plain => self.plain_run(self.steps)?,
            Method::Averaging => {
                let a = self.plain_run(self.steps)?;
                let b = self.plain_run(self.steps + 1)?;
                average(a, b)
            }
            Method::Smoothed => self.smoothed_run(self.steps)?,
            Method::Extrapolated => {
                let fine = self.smoothed_run(self.steps)?;
                let coarse = self.smoothed_run(self.steps / 2)?;
                richardson(fine, coarse)
            }
        };
        self.values = Some(values);
        Ok(())
    }

    /// Fair value. Fails with not-yet-executed before [`run`](Self::run).
    pub fn price(&self) -> Result<Real> {
        Ok(self.executed()?.price)
    }

    /// Delta. Fails with not-yet-executed before [`run`](Self::run).
    pub fn delta(&self) -> Result<Real> {
        self.executed()?
            .delta
            .ok_or_else(|| sensitivity_unavailable("delta", self.steps))
    }

    /// Gamma. Fails with not-yet-executed before [`run`](Self::run), and
    /// with invalid-parameters when the step count is too small to retain
    /// layer 2.
    pub fn gamma(&self) -> Result<Real> {
        self.executed()?
            .gamma
            .ok_or_else(|| sensitivity_unavailable("gamma", self.steps))
    }

    /// Theta. Same failure modes as [`gamma`](Self::gamma).
    pub fn theta(&self) -> Result<Real> {
        self.executed()?
            .theta
            .ok_or_else(|| sensitivity_unavailable("theta", self.steps))
    }

    /// All four results at once; fails if any sensitivity is unavailable.
    pub fn results(&self) -> Result<PricingResult> {
        Ok(PricingResult {
            price: self.price()?,
            delta: self.delta()?,
            gamma: self.gamma()?,
            theta: self.theta()?,
        })
    }

    fn executed(&self) -> Result<&RunValues> {
        self.values.as_ref().ok_or(Error::NotExecuted)
    }

    /// One induction run folding from `start` with the given layer
    /// population, dispatched over the arity.
    fn induce(
        &self,
        steps: Size,
        start: Size,
        terminal: &dyn Fn(Real) -> Real,
        intrinsic: &dyn Fn(Real) -> Real,
    ) -> Result<RunValues> {
        match self.kind {
            LatticeKind::Binomial => {
                let lattice = BinomialLattice::new(&self.market, steps)?;
                let values = lattice.roll_back(start, terminal, intrinsic, self.exercise);
                Ok(RunValues::from_lattice(
                    &values,
                    lattice.delta(&values),
                    lattice.gamma(&values),
                    lattice.theta(&values),
                ))
            }
            LatticeKind::Trinomial => {
                let lattice = TrinomialLattice::new(&self.market, steps)?;
                let values = lattice.roll_back(start, terminal, intrinsic, self.exercise);
                Ok(RunValues::from_lattice(
                    &values,
                    lattice.delta(&values),
                    lattice.gamma(&values),
                    lattice.theta(&values),
                ))
            }
        }
    }

    fn plain_run(&self, steps: Size) -> Result<RunValues> {
        let payoff = self.market.payoff();
        let value = |s: Real| payoff.value(s);
        self.induce(steps, steps, &value, &value)
    }

    /// Smoothed run: the layer one step before maturity takes the
    /// closed-form value with the remaining time Δt, removing the payoff
    /// kink before the fold starts.
    fn smoothed_run(&self, steps: Size) -> Result<RunValues> {
        let m = &self.market;
        let payoff = m.payoff();
        let intrinsic = |s: Real| payoff.value(s);
        let dt = m.maturity() / steps as Real;
        let terminal = |s: Real| {
            black_scholes_values(s, m.strike(), dt, m.volatility(), m.rate(), m.dividend_yield())
                .price(m.option_type())
        };
        self.induce(steps, steps - 1, &terminal, &intrinsic)
    }
}

fn validate_lattice(market: &MarketParameters, steps: Size, kind: LatticeKind) -> Result<()> {
    match kind {
        LatticeKind::Binomial => BinomialLattice::new(market, steps).map(|_| ()),
        LatticeKind::Trinomial => TrinomialLattice::new(market, steps).map(|_| ()),
    }
}

fn sensitivity_unavailable(name: &str, steps: Size) -> Error {
    Error::InvalidParameters(format!(
        "{name} is unavailable at step count {steps}: the layer it reads is \
         never retained; increase the step count"
    ))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use lp_instruments::OptionType;

    fn put_41_43() -> MarketParameters {
        MarketParameters::new(41.0, 43.0, 0.035, 0.0075, 0.24, 1.0, OptionType::Put).unwrap()
    }

    fn engine(
        steps: Size,
        kind: LatticeKind,
        method: Method,
        exercise: ExerciseType,
    ) -> TreeEngine {
        TreeEngine::new(put_41_43(), steps, kind, method, exercise).unwrap()
    }

    fn run_price(steps: Size, kind: LatticeKind, method: Method, exercise: ExerciseType) -> Real {
        let mut e = engine(steps, kind, method, exercise);
        e.run().unwrap();
        e.price().unwrap()
    }

    #[test]
    fn rejects_unusable_step_counts() {
        let m = put_41_43();
        for (steps, method) in [
            (0, Method::Plain),
            (0, Method::Averaging),
            (1, Method::Smoothed),
            (0, Method::Smoothed),
        ] {
            let r = TreeEngine::new(m, steps, LatticeKind::Binomial, method, ExerciseType::European);
            assert!(
                matches!(r, Err(Error::InvalidParameters(_))),
                "{method} with {steps} steps should be invalid-parameters"
            );
        }
        for steps in [2, 5, 7] {
            let r = TreeEngine::new(
                m,
                steps,
                LatticeKind::Binomial,
                Method::Extrapolated,
                ExerciseType::European,
            );
            assert!(
                matches!(r, Err(Error::MismatchedComposition(_))),
                "extrapolated with {steps} steps should be mismatched-composition"
            );
        }
    }

    #[test]
    fn rejects_invalid_trinomial_probabilities_at_construction() {
        let m = MarketParameters::new(41.0, 43.0, 0.0375, 0.01, 0.8, 8.0, OptionType::Put).unwrap();
        let r = TreeEngine::new(
            m,
            2,
            LatticeKind::Trinomial,
            Method::Plain,
            ExerciseType::European,
        );
        assert!(matches!(r, Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn accessors_fail_before_run() {
        let e = engine(10, LatticeKind::Binomial, Method::Plain, ExerciseType::European);
        assert_eq!(e.price(), Err(Error::NotExecuted));
        assert_eq!(e.delta(), Err(Error::NotExecuted));
        assert_eq!(e.gamma(), Err(Error::NotExecuted));
        assert_eq!(e.theta(), Err(Error::NotExecuted));
    }

    #[test]
    fn rerun_is_idempotent() {
        let mut e = engine(50, LatticeKind::Binomial, Method::Plain, ExerciseType::American);
        e.run().unwrap();
        let first = e.results().unwrap();
        e.run().unwrap();
        assert_eq!(e.results().unwrap(), first);
    }

    #[test]
    fn single_step_prices_without_error() {
        let mut e = engine(1, LatticeKind::Binomial, Method::Plain, ExerciseType::European);
        e.run().unwrap();
        assert!(e.price().unwrap() > 0.0);
        assert!(e.delta().is_ok());
        assert!(matches!(e.gamma(), Err(Error::InvalidParameters(_))));
        assert!(matches!(e.theta(), Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn averaging_is_mean_of_plain_runs() {
        let n = 25;
        let avg = run_price(n, LatticeKind::Binomial, Method::Averaging, ExerciseType::European);
        let a = run_price(n, LatticeKind::Binomial, Method::Plain, ExerciseType::European);
        let b = run_price(n + 1, LatticeKind::Binomial, Method::Plain, ExerciseType::European);
        assert!(
            (avg - 0.5 * (a + b)).abs() < 1e-14,
            "averaging {avg} vs mean {}",
            0.5 * (a + b)
        );
    }

    #[test]
    fn extrapolation_is_exact_combination_of_smoothed_runs() {
        let n = 8;
        for kind in [LatticeKind::Binomial, LatticeKind::Trinomial] {
            let ex = run_price(n, kind, Method::Extrapolated, ExerciseType::European);
            let fine = run_price(n, kind, Method::Smoothed, ExerciseType::European);
            let coarse = run_price(n / 2, kind, Method::Smoothed, ExerciseType::European);
            assert!(
                (ex - (2.0 * fine - coarse)).abs() < 1e-12,
                "{kind}: extrapolated {ex} vs {}",
                2.0 * fine - coarse
            );
        }
    }

    #[test]
    fn american_premium_is_non_negative_for_every_method() {
        for kind in [LatticeKind::Binomial, LatticeKind::Trinomial] {
            for method in [
                Method::Plain,
                Method::Averaging,
                Method::Smoothed,
                Method::Extrapolated,
            ] {
                let n = 40;
                let am = run_price(n, kind, method, ExerciseType::American);
                let eu = run_price(n, kind, method, ExerciseType::European);
                assert!(
                    am >= eu - 1e-10,
                    "{kind}/{method}: American {am:.6} < European {eu:.6}"
                );
            }
        }
    }
}
