//! Option exercise policy.
//!
//! The policy is a stateless function applied at every interior lattice
//! node: given the discounted continuation value and the node's intrinsic
//! value, it returns the node value.

use lp_core::Real;
use std::fmt;

/// Type of exercise right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExerciseType {
    /// Can only be exercised at expiry.
    European,
    /// Can be exercised at any time up to expiry.
    American,
}

impl ExerciseType {
    /// Node value given the continuation value and the intrinsic value at
    /// the node's own spot level.
    ///
    /// European exercise always continues; American exercise takes the
    /// better of continuing and exercising immediately.
    #[inline]
    pub fn apply(self, continuation: Real, intrinsic: Real) -> Real {
        match self {
            ExerciseType::European => continuation,
            ExerciseType::American => continuation.max(intrinsic),
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseType::European => write!(f, "European"),
            ExerciseType::American => write!(f, "American"),
        }
    }
}
