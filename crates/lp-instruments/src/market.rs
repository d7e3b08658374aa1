//! Market parameters for a pricing run.

use crate::payoff::{OptionType, PlainVanillaPayoff};
use lp_core::{ensure, errors::Result, Rate, Real, Time, Volatility};
use std::fmt;

/// The immutable input set of a pricing run.
///
/// Validated once at construction; every lattice variant derives its
/// per-step parameters from this and a step count.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketParameters {
    spot: Real,
    strike: Real,
    rate: Rate,
    dividend_yield: Rate,
    volatility: Volatility,
    maturity: Time,
    option_type: OptionType,
}

impl MarketParameters {
    /// Create a validated parameter set.
    ///
    /// Fails with invalid-parameters when spot, strike, volatility, or
    /// maturity is not strictly positive. Rates may take either sign.
    pub fn new(
        spot: Real,
        strike: Real,
        rate: Rate,
        dividend_yield: Rate,
        volatility: Volatility,
        maturity: Time,
        option_type: OptionType,
    ) -> Result<Self> {
        ensure!(spot > 0.0, "spot must be positive, got {spot}");
        ensure!(strike > 0.0, "strike must be positive, got {strike}");
        ensure!(
            volatility > 0.0,
            "volatility must be positive, got {volatility}"
        );
        ensure!(maturity > 0.0, "maturity must be positive, got {maturity}");
        Ok(Self {
            spot,
            strike,
            rate,
            dividend_yield,
            volatility,
            maturity,
            option_type,
        })
    }

    /// Initial underlying price S₀.
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// Strike price K.
    pub fn strike(&self) -> Real {
        self.strike
    }

    /// Continuously compounded risk-free rate r.
    pub fn rate(&self) -> Rate {
        self.rate
    }

    /// Continuous dividend yield q.
    pub fn dividend_yield(&self) -> Rate {
        self.dividend_yield
    }

    /// Volatility σ.
    pub fn volatility(&self) -> Volatility {
        self.volatility
    }

    /// Time to maturity T in years.
    pub fn maturity(&self) -> Time {
        self.maturity
    }

    /// Call or put.
    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    /// The option's payoff function.
    pub fn payoff(&self) -> PlainVanillaPayoff {
        PlainVanillaPayoff::new(self.option_type, self.strike)
    }

    /// Immediate exercise value at the given spot level.
    pub fn intrinsic(&self, spot: Real) -> Real {
        self.payoff().value(spot)
    }
}

impl fmt::Display for MarketParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} S={} K={} r={} q={} sigma={} T={}",
            self.option_type,
            self.spot,
            self.strike,
            self.rate,
            self.dividend_yield,
            self.volatility,
            self.maturity
        )
    }
}
