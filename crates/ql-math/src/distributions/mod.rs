//! Probability distributions.
//!
//! Only the standard normal is needed by the pricing models; the special
//! functions come from `statrs`.

pub mod normal;

pub use normal::{normal_cdf, normal_cdf_inverse, normal_pdf};
