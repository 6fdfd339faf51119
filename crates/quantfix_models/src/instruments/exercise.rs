//! Option exercise style definitions.

/// When an option may be exercised.
///
/// The lattice engine compares continuation against exercise value at every
/// node for `American` and skips the comparison for `European`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExerciseStyle {
    /// Exercise only at expiry.
    #[default]
    European,
    /// Exercise at any time up to expiry.
    American,
}

impl ExerciseStyle {
    /// Returns `true` when early exercise is permitted.
    #[inline]
    pub fn allows_early_exercise(&self) -> bool {
        matches!(self, ExerciseStyle::American)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_european() {
        assert_eq!(ExerciseStyle::default(), ExerciseStyle::European);
    }

    #[test]
    fn test_early_exercise_flag() {
        assert!(ExerciseStyle::American.allows_early_exercise());
        assert!(!ExerciseStyle::European.allows_early_exercise());
    }
}
