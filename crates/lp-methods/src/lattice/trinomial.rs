//! Recombining trinomial lattice.
//!
//! Three branches per node with spacing `u = exp(σ√(3Δt))`, `d = 1/u`;
//! layer `j` has `2j + 1` nodes and node `(j, i)` sits at `S₀ · u^(j−i)`,
//! so the up/mid/down children of node `i` are nodes `i`, `i+1`, `i+2` of
//! the next layer.

use super::{NodeValues, Retention};
use lp_core::{ensure, errors::Result, Real, Size, Time};
use lp_instruments::{ExerciseType, MarketParameters};

/// A recombining trinomial lattice with derived per-step parameters.
///
/// The branch probabilities come from moment matching:
/// `pᵤ = 1/6 + (r − q − σ²/2)·√(Δt/(12σ²))`, `p_d` with the opposite
/// sign, `p_m = 2/3`. Small step counts against a large volatility can
/// push `pᵤ` or `p_d` outside [0, 1]; construction fails fast in that
/// case, before any layer is built.
#[derive(Debug, Clone)]
pub struct TrinomialLattice {
    spot: Real,
    steps: Size,
    dt: Time,
    up: Real,
    down: Real,
    prob_up: Real,
    prob_mid: Real,
    prob_down: Real,
    disc_up: Real,
    disc_mid: Real,
    disc_down: Real,
}

impl TrinomialLattice {
    /// Derive lattice parameters for `steps` time steps.
    pub fn new(market: &MarketParameters, steps: Size) -> Result<Self> {
        ensure!(steps >= 1, "step count must be at least 1, got {steps}");
        let dt = market.maturity() / steps as Real;
        let sigma = market.volatility();
        let up = (sigma * (3.0 * dt).sqrt()).exp();
        let down = 1.0 / up;
        let drift = market.rate() - market.dividend_yield() - 0.5 * sigma * sigma;
        let tilt = drift * (dt / (12.0 * sigma * sigma)).sqrt();
        let prob_up = 1.0 / 6.0 + tilt;
        let prob_down = 1.0 / 6.0 - tilt;
        let prob_mid = 2.0 / 3.0;
        ensure!(
            (0.0..=1.0).contains(&prob_up) && (0.0..=1.0).contains(&prob_down),
            "branch probabilities (up {prob_up}, down {prob_down}) outside [0, 1] \
             for {steps} steps"
        );
        let discount = (-market.rate() * dt).exp();
        Ok(Self {
            spot: market.spot(),
            steps,
            dt,
            up,
            down,
            prob_up,
            prob_mid,
            prob_down,
            disc_up: discount * prob_up,
            disc_mid: discount * prob_mid,
            disc_down: discount * prob_down,
        })
    }

    /// Number of time steps.
    pub fn steps(&self) -> Size {
        self.steps
    }

    /// Time increment per step.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Initial underlying value (spot price).
    pub fn spot(&self) -> Real {
        self.spot
    }

    /// Up multiplier `u`.
    pub fn up(&self) -> Real {
        self.up
    }

    /// Down multiplier `d = 1/u`.
    pub fn down(&self) -> Real {
        self.down
    }

    /// Risk-neutral branch probabilities `(pᵤ, p_m, p_d)`.
    pub fn probabilities(&self) -> (Real, Real, Real) {
        (self.prob_up, self.prob_mid, self.prob_down)
    }

    /// Fold the lattice from `start` back to the root.
    ///
    /// Same contract as the binomial
    /// [`roll_back`](super::BinomialLattice::roll_back): the start layer
    /// comes from `terminal(spot)` untouched by the exercise policy,
    /// interior layers apply the discounted three-branch expectation
    /// followed by the policy, and layers 1 and 2 are snapshotted.
    pub fn roll_back(
        &self,
        start: Size,
        terminal: &dyn Fn(Real) -> Real,
        intrinsic: &dyn Fn(Real) -> Real,
        exercise: ExerciseType,
    ) -> NodeValues {
        let mut values: Vec<Real> = Vec::with_capacity(2 * start + 1);
        let mut s = self.spot * self.up.powi(start as i32);
        for _ in 0..=2 * start {
            values.push(terminal(s));
            s *= self.down;
        }

        let mut retained = Retention::default();
        retained.capture(start, &values);

        for layer in (0..start).rev() {
            let mut s = self.spot * self.up.powi(layer as i32);
            for i in 0..=2 * layer {
                let continuation = self.disc_up * values[i]
                    + self.disc_mid * values[i + 1]
                    + self.disc_down * values[i + 2];
                values[i] = exercise.apply(continuation, intrinsic(s));
                s *= self.down;
            }
            values.truncate(2 * layer + 1);
            retained.capture(layer, &values);
        }

        retained.into_node_values(values[0])
    }

    /// Delta from the outer layer-1 nodes:
    /// `(V₁,₀ − V₁,₂) / (S₀(u − d))`.
    pub fn delta(&self, values: &NodeValues) -> Option<Real> {
        let l1 = values.layer1()?;
        Some((l1[0] - l1[2]) / (self.spot * (self.up - self.down)))
    }

    /// Gamma from layer-2 nodes 0, 2, 4 (spots `S₀u²`, `S₀`, `S₀d²`):
    /// difference of the two local deltas over the average spot spacing.
    pub fn gamma(&self, values: &NodeValues) -> Option<Real> {
        let l2 = values.layer2()?;
        let (s, u, d) = (self.spot, self.up, self.down);
        let upper = (l2[0] - l2[2]) / (s * u * (u - d));
        let lower = (l2[2] - l2[4]) / (s * d * (u - d));
        Some((upper - lower) / (s * (u * u - d * d) / 2.0))
    }

    /// Theta from the layer-1 middle node, which already sits at the
    /// root's spot level one step out: `(V₁,₁ − price) / Δt`.
    pub fn theta(&self, values: &NodeValues) -> Option<Real> {
        let l1 = values.layer1()?;
        Some((l1[1] - values.price()) / self.dt)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
