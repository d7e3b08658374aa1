//! # lp-engines
//!
//! Pricing engines for latticeprice-rs: the closed-form benchmark, the
//! variant-composing lattice engine, control-variate variance reduction,
//! and lattice implied volatility.
//!
//! # Modules
//!
//! * [`black_scholes`] — closed-form values and Greeks
//! * [`lattice_engine`] — plain / averaging / smoothed / extrapolated runs
//! * [`variance_reduction`] — American-minus-European control variate
//! * [`implied_volatility`] — volatility calibration on the lattice price

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod black_scholes;
pub mod implied_volatility;
pub mod lattice_engine;
pub mod variance_reduction;

pub use black_scholes::{black_scholes_values, BlackScholesValues};
pub use implied_volatility::{implied_volatility, resolve_step_count};
pub use lattice_engine::{LatticeKind, Method, PricingResult, TreeEngine};
pub use variance_reduction::combine;
