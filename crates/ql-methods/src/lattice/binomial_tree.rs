//! Recombining binomial trees for Black-Scholes dynamics.
//!
//! | Variant | Type | Reference |
//! |---|---|---|
//! | [`BinomialTree::cox_ross_rubinstein`] | Equal jumps | Cox, Ross & Rubinstein (1979) |
//! | [`BinomialTree::jarrow_rudd`] | Equal probabilities | Jarrow & Rudd (1983) |
//! | [`BinomialTree::tian`] | Multiplicative, third moment | Tian (1993) |
//! | [`BinomialTree::leisen_reimer`] | Multiplicative, strike-centred | Leisen & Reimer (1996) |

use crate::process::BlackScholesProcess;
use ql_core::{errors::Result, Real, Size, Time};

/// Upper bound on tree steps; the rollback is `O(steps²)`.
pub const MAX_LATTICE_STEPS: Size = 10_000;

/// Which binomial parameterisation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinomialTreeType {
    /// Cox-Ross-Rubinstein.
    #[default]
    CoxRossRubinstein,
    /// Jarrow-Rudd.
    JarrowRudd,
    /// Tian.
    Tian,
    /// Leisen-Reimer (odd step count, centred on the strike).
    LeisenReimer,
}

/// How node values are laid out.
#[derive(Debug, Clone, Copy)]
enum UnderlyingKind {
    /// `x0 · exp(i · drift_per_step + (2j − i) · step)`
    LogSpace { step: Real, drift_per_step: Real },
    /// `x0 · down^(i − j) · up^j`
    Multiplicative { up: Real, down: Real },
}

/// A recombining binomial tree.
///
/// Layer `i` has `i + 1` nodes; node `(i, j)` is reached after `j` up-moves
/// and `i − j` down-moves.  Branch probabilities are the same at every node.
#[derive(Debug, Clone)]
pub struct BinomialTree {
    x0: Real,
    dt: Time,
    steps: Size,
    underlying: UnderlyingKind,
    pu: Real,
    pd: Real,
}

impl BinomialTree {
    /// Build the tree of the given type over `[0, end]`.
    ///
    /// `strike` is used only by Leisen-Reimer.
    ///
    /// # Errors
    /// `InvalidParameter` for a zero or excessive step count, a
    /// non-positive horizon, or branch probabilities outside `[0, 1]`.
    pub fn new(
        tree_type: BinomialTreeType,
        process: &BlackScholesProcess,
        end: Time,
        steps: Size,
        strike: Real,
    ) -> Result<Self> {
        ql_core::ensure!(
            steps > 0 && steps <= MAX_LATTICE_STEPS,
            InvalidParameter,
            "lattice steps must be in 1..={MAX_LATTICE_STEPS}, got {steps}"
        );
        ql_core::ensure!(
            end.is_finite() && end > 0.0,
            InvalidParameter,
            "lattice horizon must be positive, got {end}"
        );
        let tree = match tree_type {
            BinomialTreeType::CoxRossRubinstein => Self::cox_ross_rubinstein(process, end, steps),
            BinomialTreeType::JarrowRudd => Self::jarrow_rudd(process, end, steps),
            BinomialTreeType::Tian => Self::tian(process, end, steps),
            BinomialTreeType::LeisenReimer => {
                ql_core::ensure!(
                    strike.is_finite() && strike > 0.0,
                    InvalidParameter,
                    "Leisen-Reimer tree needs a positive strike, got {strike}"
                );
                Self::leisen_reimer(process, end, steps, strike)
            }
        };
        ql_core::ensure!(
            (0.0..=1.0).contains(&tree.pu) && tree.pu.is_finite(),
            InvalidParameter,
            "{tree_type:?} tree: up probability {} outside [0, 1], use more steps",
            tree.pu
        );
        Ok(tree)
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// Number of time steps.
    pub fn steps(&self) -> Size {
        self.steps
    }

    /// Time increment per step.
    pub fn dt(&self) -> Time {
        self.dt
    }

    /// Number of nodes at step `i`.
    pub fn size(&self, i: Size) -> Size {
        i + 1
    }

    /// Underlying value at node `(i, index)`.
    pub fn underlying(&self, i: Size, index: Size) -> Real {
        match self.underlying {
            UnderlyingKind::LogSpace { step, drift_per_step } => {
                let j = 2 * index as i64 - i as i64;
                self.x0 * (i as Real * drift_per_step + j as Real * step).exp()
            }
            UnderlyingKind::Multiplicative { up, down } => {
                self.x0 * down.powi((i - index) as i32) * up.powi(index as i32)
            }
        }
    }

    /// Up-branch probability.
    pub fn probability_up(&self) -> Real {
        self.pu
    }

    /// Down-branch probability.
    pub fn probability_down(&self) -> Real {
        self.pd
    }

    // ── Named constructors ───────────────────────────────────────────────

    /// Cox-Ross-Rubinstein: `dx = σ√Δt`, drift carried by the probabilities,
    /// `p_up = ½ + ½ μΔt / dx`.
    pub fn cox_ross_rubinstein(process: &BlackScholesProcess, end: Time, steps: Size) -> Self {
        let dt = end / steps as Real;
        let dps = process.log_drift() * dt;
        let dx = process.log_variance(dt).sqrt();
        let pu = 0.5 + 0.5 * dps / dx;
        Self {
            x0: process.x0(),
            dt,
            steps,
            underlying: UnderlyingKind::LogSpace {
                step: dx,
                drift_per_step: 0.0,
            },
            pu,
            pd: 1.0 - pu,
        }
    }

    /// Jarrow-Rudd: equal probabilities, drift carried by the nodes.
    pub fn jarrow_rudd(process: &BlackScholesProcess, end: Time, steps: Size) -> Self {
        let dt = end / steps as Real;
        Self {
            x0: process.x0(),
            dt,
            steps,
            underlying: UnderlyingKind::LogSpace {
                step: process.log_variance(dt).sqrt(),
                drift_per_step: process.log_drift() * dt,
            },
            pu: 0.5,
            pd: 0.5,
        }
    }

    /// Tian: matches the first three moments of the log-normal step.
    pub fn tian(process: &BlackScholesProcess, end: Time, steps: Size) -> Self {
        let dt = end / steps as Real;
        let q = process.log_variance(dt).exp();
        let r_m = ((process.rate() - process.dividend_yield()) * dt).exp();
        let root = (q * q + 2.0 * q - 3.0).sqrt();
        let up = 0.5 * r_m * q * (q + 1.0 + root);
        let down = 0.5 * r_m * q * (q + 1.0 - root);
        let pu = (r_m - down) / (up - down);
        Self {
            x0: process.x0(),
            dt,
            steps,
            underlying: UnderlyingKind::Multiplicative { up, down },
            pu,
            pd: 1.0 - pu,
        }
    }

    /// Leisen-Reimer with the Peizer-Pratt method 2 inversion.  An even
    /// step count is bumped to the next odd one.
    pub fn leisen_reimer(process: &BlackScholesProcess, end: Time, steps: Size, strike: Real) -> Self {
        let n = if steps % 2 == 1 { steps } else { steps + 1 };
        let dt = end / n as Real;
        let total_std = process.log_variance(end).sqrt();
        let ermqdt = ((process.rate() - process.dividend_yield()) * dt).exp();
        let d2 = ((process.x0() / strike).ln() + process.log_drift() * end) / total_std;

        let pu = peizer_pratt_2(d2, n);
        let pdash = peizer_pratt_2(d2 + total_std, n);
        let up = ermqdt * pdash / pu;
        let down = (ermqdt - pu * up) / (1.0 - pu);
        Self {
            x0: process.x0(),
            dt,
            steps: n,
            underlying: UnderlyingKind::Multiplicative { up, down },
            pu,
            pd: 1.0 - pu,
        }
    }
}

/// Peizer-Pratt method 2: normal quantile `z` to a binomial probability for
/// an odd step count `n`.
fn peizer_pratt_2(z: Real, n: Size) -> Real {
    let nf = n as Real;
    let r = z / (nf + 1.0 / 3.0 + 0.1 / (nf + 1.0));
    let ex = (-r * r * (nf + 1.0 / 6.0)).exp();
    0.5 + z.signum() * 0.5 * (1.0 - ex).sqrt()
}
