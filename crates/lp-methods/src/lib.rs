//! # lp-methods
//!
//! Numerical methods for latticeprice-rs: recombining binomial and
//! trinomial lattices with backward induction and near-root layer
//! retention.
//!
//! # Modules
//!
//! * [`lattice`] — lattice parameter derivation, backward induction,
//!   sensitivity extraction

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Lattice methods: binomial and trinomial trees, backward induction.
pub mod lattice;

pub use lattice::{BinomialLattice, NodeValues, TrinomialLattice};
