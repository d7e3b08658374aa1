//! Closed-form European option values (Black-Scholes-Merton).
//!
//! The lattice engines consume this in two roles: as the ground-truth
//! benchmark for error reporting and variance reduction, and as the
//! terminal-layer substitute in the smoothed variants. One evaluation
//! returns both call and put figures so a caller selects the side it
//! needs.

use lp_core::{Rate, Real, Time, Volatility};
use lp_instruments::OptionType;
use lp_math::{normal_cdf, normal_pdf};

/// Call and put values and sensitivities from one closed-form evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlackScholesValues {
    /// Call price.
    pub call_price: Real,
    /// Put price.
    pub put_price: Real,
    /// Call delta.
    pub call_delta: Real,
    /// Put delta.
    pub put_delta: Real,
    /// Vega (per 1.0 absolute vol, shared by call and put).
    pub vega: Real,
    /// Gamma (shared by call and put).
    pub gamma: Real,
    /// Call theta (per year).
    pub call_theta: Real,
    /// Put theta (per year).
    pub put_theta: Real,
}

impl BlackScholesValues {
    /// Price of the requested side.
    pub fn price(&self, option_type: OptionType) -> Real {
        match option_type {
            OptionType::Call => self.call_price,
            OptionType::Put => self.put_price,
        }
    }

    /// Delta of the requested side.
    pub fn delta(&self, option_type: OptionType) -> Real {
        match option_type {
            OptionType::Call => self.call_delta,
            OptionType::Put => self.put_delta,
        }
    }

    /// Theta of the requested side.
    pub fn theta(&self, option_type: OptionType) -> Real {
        match option_type {
            OptionType::Call => self.call_theta,
            OptionType::Put => self.put_theta,
        }
    }
}

/// Black-Scholes-Merton values for a European call and put.
///
/// $$C = S e^{-qT} N(d_1) - K e^{-rT} N(d_2)$$
/// $$P = K e^{-rT} N(-d_2) - S e^{-qT} N(-d_1)$$
///
/// where $d_{1,2} = \frac{\ln(S/K) + (r - q \pm \sigma^2/2)T}{\sigma\sqrt{T}}$
pub fn black_scholes_values(
    spot: Real,
    strike: Real,
    maturity: Time,
    volatility: Volatility,
    rate: Rate,
    dividend_yield: Rate,
) -> BlackScholesValues {
    if maturity <= 0.0 {
        return BlackScholesValues {
            call_price: (spot - strike).max(0.0),
            put_price: (strike - spot).max(0.0),
            call_delta: 0.0,
            put_delta: 0.0,
            vega: 0.0,
            gamma: 0.0,
            call_theta: 0.0,
            put_theta: 0.0,
        };
    }

    let t = maturity;
    let sqrt_t = t.sqrt();
    let std_dev = volatility * sqrt_t;
    let df_r = (-rate * t).exp();
    let df_q = (-dividend_yield * t).exp();
    let fwd = spot * ((rate - dividend_yield) * t).exp();

    let (d1, d2) = if std_dev > 1e-15 {
        let d1 = ((spot / strike).ln()
            + (rate - dividend_yield + 0.5 * volatility * volatility) * t)
            / std_dev;
        (d1, d1 - std_dev)
    } else {
        let big = if fwd > strike { 1e15 } else { -1e15 };
        (big, big)
    };

    let nd1 = normal_cdf(d1);
    let nd2 = normal_cdf(d2);
    let npd1 = normal_pdf(d1);

    let call_price = spot * df_q * nd1 - strike * df_r * nd2;
    let put_price = strike * df_r * (1.0 - nd2) - spot * df_q * (1.0 - nd1);

    let call_delta = df_q * nd1;
    let put_delta = df_q * (nd1 - 1.0);

    let gamma = if std_dev > 1e-15 {
        df_q * npd1 / (spot * std_dev)
    } else {
        0.0
    };
    let vega = spot * df_q * npd1 * sqrt_t;

    let decay = -(spot * df_q * npd1 * volatility) / (2.0 * sqrt_t);
    let call_theta =
        decay - rate * strike * df_r * nd2 + dividend_yield * spot * df_q * nd1;
    let put_theta = decay + rate * strike * df_r * (1.0 - nd2)
        - dividend_yield * spot * df_q * (1.0 - nd1);

    BlackScholesValues {
        call_price,
        put_price,
        call_delta,
        put_delta,
        vega,
        gamma,
        call_theta,
        put_theta,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn atm_call_price() {
        // S=100, K=100, r=5%, q=0%, σ=20%, T=1 → ≈ 10.4506
        let v = black_scholes_values(100.0, 100.0, 1.0, 0.20, 0.05, 0.0);
        assert!((v.call_price - 10.4506).abs() < 0.01, "price = {}", v.call_price);
        assert!(v.call_delta > 0.5 && v.call_delta < 0.8, "delta = {}", v.call_delta);
        assert!(v.gamma > 0.0, "gamma = {}", v.gamma);
        assert!(v.vega > 0.0, "vega = {}", v.vega);
        assert!(v.call_theta < 0.0, "theta = {}", v.call_theta);
    }

    #[test]
    fn put_call_parity() {
        let v = black_scholes_values(100.0, 100.0, 1.0, 0.20, 0.05, 0.0);
        let parity = v.call_price - 100.0 + 100.0 * (-0.05_f64).exp();
        assert!(
            (v.put_price - parity).abs() < 1e-10,
            "put = {}, parity = {parity}",
            v.put_price
        );
    }

    #[test]
    fn put_call_parity_with_dividends() {
        let (s, k, r, q, sigma, t) = (100.0, 105.0, 0.08, 0.03, 0.25, 0.5);
        let v = black_scholes_values(s, k, t, sigma, r, q);
        let parity = v.call_price - s * (-q * t).exp() + k * (-r * t).exp();
        assert!(
            (v.put_price - parity).abs() < 1e-10,
            "put = {}, parity = {parity}",
            v.put_price
        );
    }

    #[test]
    fn delta_relationship() {
        // call_delta − put_delta = e^(−qT)
        let v = black_scholes_values(90.0, 100.0, 2.0, 0.30, 0.04, 0.02);
        let expected = (-0.02_f64 * 2.0).exp();
        assert!((v.call_delta - v.put_delta - expected).abs() < 1e-10);
    }

    #[test]
    fn expired_option_is_intrinsic() {
        let v = black_scholes_values(110.0, 100.0, 0.0, 0.20, 0.05, 0.0);
        assert!((v.call_price - 10.0).abs() < 1e-15);
        assert!((v.put_price - 0.0).abs() < 1e-15);
    }

    #[test]
    fn zero_vol_call_is_discounted_forward() {
        // σ → 0: C = max(S e^(−qT) − K e^(−rT), 0)
        let v = black_scholes_values(100.0, 95.0, 1.0, 0.0, 0.05, 0.0);
        let expected = 100.0 - 95.0 * (-0.05_f64).exp();
        assert!(
            (v.call_price - expected).abs() < 0.01,
            "price = {}, expected = {expected}",
            v.call_price
        );
    }

    #[test]
    fn side_selectors() {
        let v = black_scholes_values(41.0, 43.0, 1.0, 0.24, 0.035, 0.0075);
        assert_eq!(v.price(OptionType::Call), v.call_price);
        assert_eq!(v.price(OptionType::Put), v.put_price);
        assert_eq!(v.delta(OptionType::Put), v.put_delta);
        assert_eq!(v.theta(OptionType::Call), v.call_theta);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn parity_holds_everywhere(
            spot in 10.0..300.0_f64,
            strike in 10.0..300.0_f64,
            rate in -0.02..0.12_f64,
            dividend in 0.0..0.06_f64,
            vol in 0.05..0.80_f64,
            maturity in 0.05..3.0_f64,
        ) {
            let v = black_scholes_values(spot, strike, maturity, vol, rate, dividend);
            let lhs = v.call_price - v.put_price;
            let rhs = spot * (-dividend * maturity).exp() - strike * (-rate * maturity).exp();
            prop_assert!((lhs - rhs).abs() < 1e-8, "C−P = {lhs}, parity = {rhs}");
        }
    }
}
