//! Lattice methods for option pricing.
//!
//! # Overview
//!
//! * [`BinomialLattice`] — recombining two-branch lattice
//! * [`TrinomialLattice`] — recombining three-branch lattice
//! * [`NodeValues`] — root price plus the retained near-root layers
//!
//! Both lattices derive their per-step parameters once at construction
//! (failing fast on a branch probability outside [0, 1]) and then fold a
//! terminal layer back to the root in a single reused buffer, so memory
//! stays linear in the step count. While folding they snapshot layers 1
//! and 2: the root value alone cannot produce delta, gamma, or theta, and
//! those sensitivities are exact finite differences over the retained
//! nodes rather than independent approximations.

pub mod binomial;
pub mod trinomial;

pub use binomial::BinomialLattice;
pub use trinomial::TrinomialLattice;

use lp_core::{Real, Size};

/// Values retained from a backward-induction run.
///
/// `layer1` and `layer2` hold the node values of tree layers 1 and 2
/// (2/3 nodes binomial, 3/5 nodes trinomial), captured whether the layer
/// was produced by folding or was itself the populated terminal layer.
/// A layer beyond the terminal one (small step counts) is absent, and
/// the sensitivities that need it are unavailable.
#[derive(Debug, Clone)]
pub struct NodeValues {
    price: Real,
    layer1: Option<Vec<Real>>,
    layer2: Option<Vec<Real>>,
}

impl NodeValues {
    /// Root value, i.e. the price.
    pub fn price(&self) -> Real {
        self.price
    }

    /// Node values of layer 1, if the run reached it.
    pub fn layer1(&self) -> Option<&[Real]> {
        self.layer1.as_deref()
    }

    /// Node values of layer 2, if the run reached it.
    pub fn layer2(&self) -> Option<&[Real]> {
        self.layer2.as_deref()
    }
}

/// Rolling snapshot store used by both lattices during a fold.
#[derive(Debug, Default)]
struct Retention {
    layer1: Option<Vec<Real>>,
    layer2: Option<Vec<Real>>,
}

impl Retention {
    fn capture(&mut self, layer: Size, values: &[Real]) {
        match layer {
            1 => self.layer1 = Some(values.to_vec()),
            2 => self.layer2 = Some(values.to_vec()),
            _ => {}
        }
    }

    fn into_node_values(self, price: Real) -> NodeValues {
        NodeValues {
            price,
            layer1: self.layer1,
            layer2: self.layer2,
        }
    }
}
