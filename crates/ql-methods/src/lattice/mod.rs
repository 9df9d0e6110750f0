//! Lattice methods for option pricing.
//!
//! * [`BinomialTree`]: recombining binomial tree (CRR, Jarrow-Rudd, Tian,
//!   Leisen-Reimer)
//! * [`backward_induction`]: rollback with optional early exercise, keeping
//!   the first two layers for tree Greeks

pub mod binomial_tree;

pub use binomial_tree::{BinomialTree, BinomialTreeType, MAX_LATTICE_STEPS};

use ql_core::Real;

/// Option values and underlying levels near the root of a rolled-back tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LatticeValues {
    /// Value at the root.
    pub value: Real,
    /// `(underlying, value)` at the two nodes of layer 1, down first.
    pub layer1: [(Real, Real); 2],
    /// `(underlying, value)` at the three nodes of layer 2; `None` for a
    /// one-step tree.
    pub layer2: Option<[(Real, Real); 3]>,
}

/// Roll `payoff` back through `tree`.
///
/// `discount` is the per-step discount factor.  With `early_exercise` the
/// value at every node is the larger of continuation and immediate
/// exercise.
pub fn backward_induction(
    tree: &BinomialTree,
    payoff: &dyn Fn(Real) -> Real,
    discount: Real,
    early_exercise: bool,
) -> LatticeValues {
    let n = tree.steps();
    let pu = tree.probability_up();
    let pd = tree.probability_down();

    // Terminal values at maturity
    let mut values: Vec<Real> = (0..tree.size(n)).map(|j| payoff(tree.underlying(n, j))).collect();
    let mut layer1 = [(0.0, 0.0); 2];
    let mut layer2 = None;

    let snapshot = |i: usize, values: &[Real]| -> Vec<(Real, Real)> {
        (0..tree.size(i)).map(|j| (tree.underlying(i, j), values[j])).collect()
    };
    if n == 1 {
        let s = snapshot(1, &values);
        layer1 = [s[0], s[1]];
    } else if n == 2 {
        let s = snapshot(2, &values);
        layer2 = Some([s[0], s[1], s[2]]);
    }

    for i in (0..n).rev() {
        for j in 0..tree.size(i) {
            let hold = discount * (pu * values[j + 1] + pd * values[j]);
            values[j] = if early_exercise {
                hold.max(payoff(tree.underlying(i, j)))
            } else {
                hold
            };
        }
        match i {
            2 => {
                let s = snapshot(2, &values);
                layer2 = Some([s[0], s[1], s[2]]);
            }
            1 => {
                let s = snapshot(1, &values);
                layer1 = [s[0], s[1]];
            }
            _ => {}
        }
    }

    LatticeValues {
        value: values[0],
        layer1,
        layer2,
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
