//! # lp-instruments
//!
//! Vanilla option descriptions: option type, payoff, exercise policy,
//! and the immutable market-parameter set consumed by the lattice
//! engines.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod exercise;
pub mod market;
pub mod payoff;

pub use exercise::ExerciseType;
pub use market::MarketParameters;
pub use payoff::{OptionType, PlainVanillaPayoff};
