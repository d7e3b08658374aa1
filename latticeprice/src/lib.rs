//! # latticeprice
//!
//! Lattice-based pricing of vanilla options: recombining binomial and
//! trinomial grids with backward induction, terminal-layer smoothing,
//! Richardson extrapolation, step averaging, and control-variate
//! variance reduction against the closed form.
//!
//! This crate is a **façade** that re-exports all public items from the
//! underlying workspace crates. Application code should depend on this
//! crate rather than the individual `lp-*` crates.
//!
//! ## Quick start
//!
//! ```rust
//! use latticeprice::engines::{LatticeKind, Method, TreeEngine};
//! use latticeprice::instruments::{ExerciseType, MarketParameters, OptionType};
//!
//! let market = MarketParameters::new(
//!     41.0, 43.0, 0.035, 0.0075, 0.24, 1.0, OptionType::Put,
//! )?;
//! let mut engine = TreeEngine::new(
//!     market,
//!     256,
//!     LatticeKind::Binomial,
//!     Method::Extrapolated,
//!     ExerciseType::American,
//! )?;
//! engine.run()?;
//! let price = engine.price()?;
//! assert!(price > 0.0);
//! # Ok::<(), latticeprice::core::Error>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Core types, aliases, and error definitions.
pub use lp_core as core;

/// Mathematical utilities (normal distribution).
pub use lp_math as math;

/// Option descriptions: payoff, exercise policy, market parameters.
pub use lp_instruments as instruments;

/// Numerical methods: lattices and backward induction.
pub use lp_methods as methods;

/// Pricing engines: benchmark, variants, variance reduction.
pub use lp_engines as engines;
