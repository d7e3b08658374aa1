//! Recombining binomial lattice.
//!
//! Two branches per node with Cox-Ross-Rubinstein spacing: `u = exp(σ√Δt)`,
//! `d = 1/u`, so distinct paths reaching the same price level merge and
//! layer `j` has `j + 1` nodes. Node `(j, i)` (with `i` counting down
//! moves) sits at `S₀ · u^(j−i) · d^i`; the per-step multiplier along a
//! layer is `d²`, which avoids recomputing `u·d = 1` identities inside the
//! fold.

use super::{NodeValues, Retention};
use lp_core::{ensure, errors::Result, Real, Size, Time};
use lp_instruments::{ExerciseType, MarketParameters};

/// A recombining binomial lattice with derived per-step parameters.
///
/// Construction derives the up/down multipliers, the risk-neutral branch
/// probability, and the discounted branch weights, failing fast when the
/// probability leaves [0, 1]. The lattice itself is immutable; every
/// [`roll_back`](Self::roll_back) owns its own value buffer, so separate
/// runs share no state.
#[derive(Debug, Clone)]
pub struct BinomialLattice {
    spot: Real,
    steps: Size,
    dt: Time,
    up: Real,
    down: Real,
    /// `d²` — the multiplier from one node to the next within a layer.
    down2: Real,
    prob_up: Real,
    disc_up: Real,
    disc_down: Real,
}

impl BinomialLattice {
    /// Derive lattice parameters for `steps` time steps.
    ///
    /// `u = exp(σ√Δt)`, `d = 1/u`, `p = (e^((r−q)Δt) − d)/(u − d)`.
    /// Fails with invalid-parameters when `steps` is zero or `p` falls
    /// outside [0, 1] (large drift against a small volatility).
    pub fn new(market: &MarketParameters, steps: Size) -> Result<Self> {
        ensure!(steps >= 1, "step count must be at least 1, got {steps}");
        let dt = market.maturity() / steps as Real;
        let up = (market.volatility() * dt.sqrt()).exp();
        let down = 1.0 / up;
        let growth = ((market.rate() - market.dividend_yield()) * dt).exp();
        let prob_up = (growth - down) / (up - down);
        ensure!(
            (0.0..=1.0).contains(&prob_up),
            "risk-neutral probability {prob_up} outside [0, 1] for {steps} steps"
        );
        let discount = (-market.rate() * dt).exp();
        Ok(Self {
            spot: market.spot(),
            steps,
            dt,
            up,
            down,
            down2: down * down,
            prob_up,
            disc_up: discount * prob_up,
            disc_down: discount * (1.0 - prob_up),
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

    /// Risk-neutral up-branch probability.
    pub fn prob_up(&self) -> Real {
        self.prob_up
    }

    /// Fold the lattice from `start` back to the root.
    ///
    /// The start layer (layer N for a raw-payoff run, N−1 for a smoothed
    /// run) is populated from `terminal(spot)` and is not passed through
    /// the exercise policy. Each interior layer applies the discounted
    /// two-branch expectation followed by `exercise.apply` with
    /// `intrinsic(spot)` at the node's own level. Layers 1 and 2 are
    /// snapshotted as produced (or captured directly when the start layer
    /// is that shallow).
    pub fn roll_back(
        &self,
        start: Size,
        terminal: &dyn Fn(Real) -> Real,
        intrinsic: &dyn Fn(Real) -> Real,
        exercise: ExerciseType,
    ) -> NodeValues {
        let mut values: Vec<Real> = Vec::with_capacity(start + 1);
        let mut s = self.spot * self.up.powi(start as i32);
        for _ in 0..=start {
            values.push(terminal(s));
            s *= self.down2;
        }

        let mut retained = Retention::default();
        retained.capture(start, &values);

        for layer in (0..start).rev() {
            let mut s = self.spot * self.up.powi(layer as i32);
            for i in 0..=layer {
                let continuation = self.disc_up * values[i] + self.disc_down * values[i + 1];
                values[i] = exercise.apply(continuation, intrinsic(s));
                s *= self.down2;
            }
            values.truncate(layer + 1);
            retained.capture(layer, &values);
        }

        retained.into_node_values(values[0])
    }

    /// Delta from the retained layer-1 nodes:
    /// `(V₁,₀ − V₁,₁) / (S₀(u − d))`.
    pub fn delta(&self, values: &NodeValues) -> Option<Real> {
        let l1 = values.layer1()?;
        Some((l1[0] - l1[1]) / (self.spot * (self.up - self.down)))
    }

    /// Gamma from the retained layer-2 nodes: the difference of the two
    /// layer-2 local deltas divided by the average spot spacing.
    pub fn gamma(&self, values: &NodeValues) -> Option<Real> {
        let l2 = values.layer2()?;
        let (s, u, d) = (self.spot, self.up, self.down);
        let upper = (l2[0] - l2[1]) / (s * u * (u - d));
        let lower = (l2[1] - l2[2]) / (s * d * (u - d));
        Some((upper - lower) / (s * (u * u - d * d) / 2.0))
    }

    /// Theta from the layer-2 middle node, the earliest retained node at
    /// the root's own spot level: `(V₂,₁ − price) / (2Δt)`.
    pub fn theta(&self, values: &NodeValues) -> Option<Real> {
        let l2 = values.layer2()?;
        Some((l2[1] - values.price()) / (2.0 * self.dt))
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
