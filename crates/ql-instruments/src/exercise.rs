//! Option exercise styles.

use std::fmt;

/// When an option can be exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExerciseStyle {
    /// Only at expiry.
    #[default]
    European,
    /// At any time up to expiry.
    American,
}

impl ExerciseStyle {
    /// `true` if early exercise is allowed.
    pub fn allows_early_exercise(self) -> bool {
        matches!(self, ExerciseStyle::American)
    }
}

impl fmt::Display for ExerciseStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseStyle::European => write!(f, "European"),
            ExerciseStyle::American => write!(f, "American"),
        }
    }
}
