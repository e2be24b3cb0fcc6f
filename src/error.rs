use thiserror::Error;

/// Result type alias used throughout the crate
pub type Result<T> = std::result::Result<T, KBestError>;

/// Errors raised while building or enumerating assignment problems
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KBestError {
    /// The input rows do not form a square matrix
    #[error("cost matrix is not square: row {row} has {len} entries, expected {expected}")]
    NotSquare {
        row: usize,
        len: usize,
        expected: usize,
    },

    /// An entry is NaN or negative infinity
    #[error("cost matrix contains invalid entry {value} at ({row}, {col})")]
    InvalidEntry { row: usize, col: usize, value: f64 },

    /// No perfect matching exists using only finite entries
    #[error("cost matrix admits no perfect matching over finite entries")]
    Infeasible,

    /// The minimum reduced cost is not zero within tolerance, i.e. the duals returned by the
    /// assignment solver violate complementary slackness
    #[error("reduced cost minimum {minimum} lies outside the zero tolerance {tolerance}")]
    NumericDegeneracy { minimum: f64, tolerance: f64 },
}

impl KBestError {
    /// Returns true for errors caused by invalid caller input
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            KBestError::NotSquare { .. } | KBestError::InvalidEntry { .. }
        )
    }
}
