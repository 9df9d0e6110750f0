//! Running sample statistics for Monte Carlo estimators.

use ql_core::Real;

/// Incremental mean/variance accumulator (Welford's update).
///
/// Numerically stable for long runs of nearly-equal samples, which is
/// what discounted payoffs of deep in-the-money paths look like.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    count: usize,
    mean: Real,
    m2: Real,
}

impl Statistics {
    /// Create a new empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single sample.
    pub fn add(&mut self, x: Real) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as Real;
        self.m2 += delta * (x - self.mean);
    }

    /// Number of samples.
    pub fn samples(&self) -> usize {
        self.count
    }

    /// Sample mean (0 when empty).
    pub fn mean(&self) -> Real {
        self.mean
    }

    /// Bessel-corrected sample variance (0 for fewer than 2 samples).
    pub fn variance(&self) -> Real {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as Real
        }
    }

    /// Sample standard deviation.
    pub fn std_dev(&self) -> Real {
        self.variance().sqrt()
    }

    /// Standard error of the mean, `σ / √n`.
    pub fn error_estimate(&self) -> Real {
        if self.count == 0 {
            0.0
        } else {
            (self.variance() / self.count as Real).sqrt()
        }
    }
}

impl Extend<Real> for Statistics {
    fn extend<I: IntoIterator<Item = Real>>(&mut self, iter: I) {
        for x in iter {
            self.add(x);
        }
    }
}
