//! Implied volatility from the lattice price.
//!
//! Inverts the extrapolated binomial European price in the volatility
//! argument by secant iteration. The extrapolated method is used because
//! its price is smooth in σ at a fixed step count, which the secant
//! update needs.

use crate::lattice_engine::{LatticeKind, Method, TreeEngine};
use lp_core::{
    errors::{Error, Result},
    Rate, Real, Size, Time, Volatility,
};
use lp_instruments::{ExerciseType, MarketParameters, OptionType};

const MAX_ITERATIONS: u32 = 100;
const PRICE_TOLERANCE: Real = 1.0e-4;
/// Secant iterates can overshoot either way; trial volatilities are
/// clamped to this bracket so every engine construction stays valid and
/// the lattice multipliers stay finite.
const SIGMA_FLOOR: Volatility = 1.0e-4;
const SIGMA_CEILING: Volatility = 5.0;
const LOW_SEED: Volatility = 0.05;
const HIGH_SEED: Volatility = 1.0;

#[allow(clippy::too_many_arguments)]
fn lattice_price(
    spot: Real,
    strike: Real,
    rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    maturity: Time,
    option_type: OptionType,
    steps: Size,
) -> Result<Real> {
    let market = MarketParameters::new(
        spot,
        strike,
        rate,
        dividend_yield,
        volatility,
        maturity,
        option_type,
    )?;
    let mut engine = TreeEngine::new(
        market,
        steps,
        LatticeKind::Binomial,
        Method::Extrapolated,
        ExerciseType::European,
    )?;
    engine.run()?;
    engine.price()
}

/// Find the volatility at which the extrapolated binomial European price
/// matches `market_price`, by secant iteration at a fixed step count.
///
/// Fails with no-convergence when the iteration budget runs out or the
/// secant goes flat before the price residual drops below tolerance.
#[allow(clippy::too_many_arguments)]
pub fn implied_volatility(
    market_price: Real,
    spot: Real,
    strike: Real,
    rate: Rate,
    dividend_yield: Rate,
    maturity: Time,
    option_type: OptionType,
    steps: Size,
) -> Result<Volatility> {
    let price_at = |sigma: Volatility| {
        lattice_price(
            spot,
            strike,
            rate,
            dividend_yield,
            sigma,
            maturity,
            option_type,
            steps,
        )
    };

    let mut sigma0 = LOW_SEED;
    let mut price0 = price_at(sigma0)?;
    let mut sigma1 = HIGH_SEED;
    let mut price1 = price_at(sigma1)?;

    for _ in 0..MAX_ITERATIONS {
        let slope = price1 - price0;
        if slope.abs() < 1e-15 {
            return Err(Error::NoConvergence(format!(
                "secant went flat at sigma = {sigma1}"
            )));
        }
        let sigma2 = (sigma1 - (price1 - market_price) * (sigma1 - sigma0) / slope)
            .clamp(SIGMA_FLOOR, SIGMA_CEILING);
        let price2 = price_at(sigma2)?;
        if (price2 - market_price).abs() < PRICE_TOLERANCE {
            return Ok(sigma2);
        }
        sigma0 = sigma1;
        price0 = price1;
        sigma1 = sigma2;
        price1 = price2;
    }

    Err(Error::NoConvergence(format!(
        "implied volatility not found within {MAX_ITERATIONS} iterations"
    )))
}

/// Find a step count at which the extrapolated binomial European price
/// has stabilized: doubles N from 10 until two successive prices agree
/// within `tolerance`.
pub fn resolve_step_count(market: &MarketParameters, tolerance: Real) -> Result<Size> {
    const INITIAL_STEPS: Size = 10;
    const MAX_DOUBLINGS: u32 = 12;

    let price_at = |steps: Size| {
        let mut engine = TreeEngine::new(
            *market,
            steps,
            LatticeKind::Binomial,
            Method::Extrapolated,
            ExerciseType::European,
        )?;
        engine.run()?;
        engine.price()
    };

    let mut steps = INITIAL_STEPS;
    let mut previous = price_at(steps)?;
    for _ in 0..MAX_DOUBLINGS {
        steps *= 2;
        let current = price_at(steps)?;
        if (current - previous).abs() < tolerance {
            return Ok(steps);
        }
        previous = current;
    }

    Err(Error::NoConvergence(format!(
        "price did not stabilize within {tolerance} after {MAX_DOUBLINGS} doublings"
    )))
}
