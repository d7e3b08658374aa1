//! Error types for latticeprice-rs.
//!
//! The whole library shares a single `thiserror`-derived enum. Every
//! failure is deterministic and surfaced immediately to the caller; a
//! pricing run either fully completes or does not start, so nothing here
//! is ever retried internally.

use thiserror::Error;

/// The top-level error type used throughout latticeprice-rs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Market inputs or derived lattice parameters are unusable:
    /// non-positive spot/strike/volatility/maturity/step count, a branch
    /// probability outside [0, 1], or a sensitivity requested below the
    /// step count that retains its layer.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// A result accessor was called before `run`.
    #[error("engine has not been executed")]
    NotExecuted,

    /// Sub-runs of a composed variant disagree on market parameters or
    /// on the required step-count relationship.
    #[error("mismatched composition: {0}")]
    MismatchedComposition(String),

    /// An iterative search exhausted its iteration budget.
    #[error("did not converge: {0}")]
    NoConvergence(String),
}

/// Shorthand `Result` type used throughout latticeprice-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Validate a constructor precondition.
///
/// Returns `Err(Error::InvalidParameters(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use lp_core::{ensure, errors::Error};
/// fn positive(x: f64) -> lp_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidParameters(
                format!($($msg)*)
            ));
        }
    };
}

/// Validate that composed sub-runs agree.
///
/// Returns `Err(Error::MismatchedComposition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use lp_core::{ensure_matched, errors::Error};
/// fn same_steps(a: usize, b: usize) -> lp_core::errors::Result<()> {
///     ensure_matched!(a == b, "step counts differ: {a} vs {b}");
///     Ok(())
/// }
/// assert!(same_steps(4, 4).is_ok());
/// assert!(same_steps(4, 5).is_err());
/// ```
#[macro_export]
macro_rules! ensure_matched {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::MismatchedComposition(
                format!($($msg)*)
            ));
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let e = Error::InvalidParameters("volatility must be positive".into());
        assert_eq!(
            e.to_string(),
            "invalid parameters: volatility must be positive"
        );
        assert_eq!(Error::NotExecuted.to_string(), "engine has not been executed");
        let e = Error::MismatchedComposition("step counts differ".into());
        assert_eq!(e.to_string(), "mismatched composition: step counts differ");
    }

    #[test]
    fn ensure_returns_invalid_parameters() {
        fn check(n: usize) -> Result<usize> {
            ensure!(n >= 1, "step count must be at least 1, got {n}");
            Ok(n)
        }
        assert_eq!(check(3), Ok(3));
        assert!(matches!(check(0), Err(Error::InvalidParameters(_))));
    }

    #[test]
    fn ensure_matched_returns_mismatch() {
        fn check(a: usize, b: usize) -> Result<()> {
            ensure_matched!(a == b, "{a} vs {b}");
            Ok(())
        }
        assert!(check(2, 2).is_ok());
        assert!(matches!(check(2, 3), Err(Error::MismatchedComposition(_))));
    }
}
