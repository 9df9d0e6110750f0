//! Standard normal distribution.
//!
//! Φ is evaluated through the complementary error function rather than a
//! polynomial approximation, so deep in- and out-of-the-money tails keep
//! full relative precision (a vega of 1e-300 is still distinguishable from
//! zero when inverting prices).

use ql_core::{errors::Result, Real};
use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::{FRAC_1_SQRT_2, PI, SQRT_2};

/// The standard normal probability density function.
///
/// `φ(x) = exp(-x²/2) / √(2π)`
#[inline]
pub fn normal_pdf(x: Real) -> Real {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// The standard normal cumulative distribution function.
///
/// `Φ(x) = erfc(-x/√2) / 2`
#[inline]
pub fn normal_cdf(x: Real) -> Real {
    0.5 * erfc(-x * FRAC_1_SQRT_2)
}

/// The inverse standard normal CDF (probit function).
///
/// # Errors
/// `InvalidParameter` unless `0 < p < 1`.
pub fn normal_cdf_inverse(p: Real) -> Result<Real> {
    ql_core::ensure!(p > 0.0 && p < 1.0, InvalidParameter, "p = {p} must be in (0, 1)");
    Ok(-SQRT_2 * erfc_inv(2.0 * p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn cdf_reference_values() {
        assert_abs_diff_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-16);
        assert_abs_diff_eq!(normal_cdf(1.0), 0.841_344_746_068_542_9, epsilon = 1e-15);
        assert_abs_diff_eq!(normal_cdf(-1.96), 0.024_997_895_148_220_4, epsilon = 1e-15);
    }

    #[test]
    fn cdf_symmetry() {
        for &x in &[0.1, 0.5, 1.3, 2.7, 4.0] {
            assert_abs_diff_eq!(normal_cdf(x) + normal_cdf(-x), 1.0, epsilon = 1e-15);
        }
    }

    #[test]
    fn far_tail_keeps_relative_precision() {
        // Φ(-10) ≈ 7.619853e-24
        assert_relative_eq!(normal_cdf(-10.0), 7.619_853_024_160_527e-24, max_relative = 1e-10);
    }

    #[test]
    fn pdf_peak() {
        assert_abs_diff_eq!(normal_pdf(0.0), 1.0 / (2.0 * PI).sqrt(), epsilon = 1e-16);
    }

    #[test]
    fn inverse_round_trips() {
        for &p in &[1e-6, 0.01, 0.3, 0.5, 0.8, 0.999] {
            let x = normal_cdf_inverse(p).unwrap();
            assert_relative_eq!(normal_cdf(x), p, max_relative = 1e-10);
        }
    }

    #[test]
    fn inverse_rejects_endpoints() {
        assert!(normal_cdf_inverse(0.0).is_err());
        assert!(normal_cdf_inverse(1.0).is_err());
    }
}
