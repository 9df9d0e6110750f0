//! Natural cubic spline interpolation.
//!
//! The spline is C² through all nodes with `S''(x₀) = S''(xₙ₋₁) = 0`.  The
//! second derivatives at the interior nodes solve a tridiagonal system,
//! which is reduced in O(n) with the Thomas algorithm at construction time;
//! each query is then a binary search plus one Horner evaluation.

use ql_core::{errors::Result, Real};

use super::{locate, validate, Interpolation1D};

/// Natural cubic spline.
///
/// On each interval `[x_i, x_{i+1}]`:
///
///   `S(x) = y_i + dx*(a_i + dx*(b_i + dx*c_i))`,  `dx = x - x_i`
#[derive(Debug, Clone, PartialEq)]
pub struct CubicNaturalSpline {
    xs: Vec<Real>,
    ys: Vec<Real>,
    a: Vec<Real>,
    b: Vec<Real>,
    c: Vec<Real>,
}

impl CubicNaturalSpline {
    /// Build the spline through `(xs, ys)`.
    ///
    /// # Errors
    /// `Configuration` for fewer than 3 points, mismatched lengths,
    /// non-finite values, or `xs` not strictly increasing.
    pub fn new(xs: &[Real], ys: &[Real]) -> Result<Self> {
        validate(xs, ys, 3, "cubic spline")?;
        let m = second_derivatives(xs, ys);

        let n = xs.len();
        let mut a = Vec::with_capacity(n - 1);
        let mut b = Vec::with_capacity(n - 1);
        let mut c = Vec::with_capacity(n - 1);
        for i in 0..n - 1 {
            let h = xs[i + 1] - xs[i];
            let s = (ys[i + 1] - ys[i]) / h;
            a.push(s - h * (2.0 * m[i] + m[i + 1]) / 6.0);
            b.push(m[i] / 2.0);
            c.push((m[i + 1] - m[i]) / (6.0 * h));
        }

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            a,
            b,
            c,
        })
    }

    /// First derivative of the spline at `x` (boundary piece continued).
    pub fn derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.a[i] + dx * (2.0 * self.b[i] + 3.0 * dx * self.c[i])
    }

    /// Second derivative of the spline at `x` (boundary piece continued).
    pub fn second_derivative(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        2.0 * self.b[i] + 6.0 * dx * self.c[i]
    }
}

/// Solve for the node second derivatives `M_i` with `M_0 = M_{n-1} = 0`:
///
/// `h_{i-1} M_{i-1} + 2(h_{i-1} + h_i) M_i + h_i M_{i+1}
///     = 6 [(y_{i+1} - y_i)/h_i - (y_i - y_{i-1})/h_{i-1}]`
fn second_derivatives(xs: &[Real], ys: &[Real]) -> Vec<Real> {
    let n = xs.len();
    let mut m = vec![0.0; n];
    let interior = n - 2;
    if interior == 0 {
        return m;
    }

    let h: Vec<Real> = xs.windows(2).map(|w| w[1] - w[0]).collect();

    // Forward sweep over rows 1..=n-2; the system is strictly diagonally
    // dominant so no pivoting is needed.
    let mut c_prime = vec![0.0; interior];
    let mut d_prime = vec![0.0; interior];
    for k in 0..interior {
        let i = k + 1;
        let lower = h[i - 1];
        let diag = 2.0 * (h[i - 1] + h[i]);
        let upper = h[i];
        let rhs = 6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]);
        if k == 0 {
            c_prime[k] = upper / diag;
            d_prime[k] = rhs / diag;
        } else {
            let denom = diag - lower * c_prime[k - 1];
            c_prime[k] = upper / denom;
            d_prime[k] = (rhs - lower * d_prime[k - 1]) / denom;
        }
    }

    // Back substitution
    m[interior] = d_prime[interior - 1];
    for k in (0..interior - 1).rev() {
        m[k + 1] = d_prime[k] - c_prime[k] * m[k + 2];
    }
    m
}

impl Interpolation1D for CubicNaturalSpline {
    fn x_min(&self) -> Real {
        self.xs[0]
    }

    fn x_max(&self) -> Real {
        self.xs[self.xs.len() - 1]
    }

    fn operator(&self, x: Real) -> Real {
        let i = locate(&self.xs, x);
        let dx = x - self.xs[i];
        self.ys[i] + dx * (self.a[i] + dx * (self.b[i] + dx * self.c[i]))
    }
}
