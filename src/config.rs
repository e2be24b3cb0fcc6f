use crate::matrix::Cost;

pub const DEFAULT_ADMISSIBLE_TOLERANCE: Cost = 1e-8;
pub const DEFAULT_DEGENERACY_TOLERANCE: Cost = 1e-6;

/// Numeric parameters of the enumeration.
///
/// - `admissible_tolerance`: a reduced cost whose absolute value does not exceed this value is
///   treated as zero, i.e. the edge belongs to the equality subgraph.
/// - `degeneracy_tolerance`: after subtracting the duals, the smallest reduced cost must be zero up
///   to `degeneracy_tolerance * (1 + max |finite cost|)`; otherwise the reduction fails with
///   [`crate::error::KBestError::NumericDegeneracy`].
///
/// # Example
/// ```
/// use kbest::config::EnumeratorConfig;
/// let config = EnumeratorConfig::default().with_admissible_tolerance(1e-6);
/// assert_eq!(config.admissible_tolerance(), 1e-6);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnumeratorConfig {
    admissible_tolerance: Cost,
    degeneracy_tolerance: Cost,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            admissible_tolerance: DEFAULT_ADMISSIBLE_TOLERANCE,
            degeneracy_tolerance: DEFAULT_DEGENERACY_TOLERANCE,
        }
    }
}

impl EnumeratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admissible_tolerance(mut self, tolerance: Cost) -> Self {
        assert!(tolerance.is_finite() && tolerance >= 0.0);
        self.admissible_tolerance = tolerance;
        self
    }

    pub fn with_degeneracy_tolerance(mut self, tolerance: Cost) -> Self {
        assert!(tolerance.is_finite() && tolerance >= 0.0);
        self.degeneracy_tolerance = tolerance;
        self
    }

    pub fn admissible_tolerance(&self) -> Cost {
        self.admissible_tolerance
    }

    pub fn degeneracy_tolerance(&self) -> Cost {
        self.degeneracy_tolerance
    }

    /// Returns true if `reduced_cost` counts as zero
    pub fn is_admissible(&self, reduced_cost: Cost) -> bool {
        reduced_cost.abs() <= self.admissible_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(0.0 => true ; "zero")]
    #[test_case(1e-9 => true ; "small positive")]
    #[test_case(-1e-9 => true ; "small negative")]
    #[test_case(1e-7 => false ; "too large")]
    #[test_case(f64::INFINITY => false ; "forbidden")]
    fn default_admissibility(reduced_cost: f64) -> bool {
        EnumeratorConfig::default().is_admissible(reduced_cost)
    }

    #[test]
    fn setters() {
        let config = EnumeratorConfig::new()
            .with_admissible_tolerance(0.5)
            .with_degeneracy_tolerance(0.25);
        assert_eq!(config.admissible_tolerance(), 0.5);
        assert_eq!(config.degeneracy_tolerance(), 0.25);
        assert!(config.is_admissible(0.4));
    }

    #[test]
    #[should_panic]
    fn negative_tolerance() {
        EnumeratorConfig::new().with_admissible_tolerance(-1.0);
    }
}
