//! # lp-math
//!
//! Mathematical utilities for latticeprice-rs.
//!
//! # Modules
//!
//! * [`distributions`] — standard normal density and cumulative distribution

#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Probability distributions.
pub mod distributions;

pub use distributions::{normal_cdf, normal_pdf};
