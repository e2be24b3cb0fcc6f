use crate::config::EnumeratorConfig;
use crate::error::{KBestError, Result};
use crate::lsap::{AssignmentSolver, ShortestAugmentingPath};
use crate::matrix::{Cost, CostMatrix, Matching};
use log::trace;

/// Result of reducing a cost matrix by the duals of its optimal assignment
#[derive(Clone, Debug)]
pub struct Reduction {
    /// Optimal cost of the input matrix, certified by the duals
    pub lower_bound: Cost,
    /// Optimal matching returned by the solver
    pub matching: Matching,
    /// `cost[i][j] - u[i] - v[j]` shifted so that its smallest entry is exactly zero
    pub reduced: CostMatrix,
}

/// Turns the output of an [`AssignmentSolver`] into a normalized reduced cost matrix. Every
/// perfect matching `M` of the input satisfies `cost(M) = lower_bound + reduced(M)`, and all
/// entries of `reduced` are non-negative.
#[derive(Clone, Debug)]
pub struct MatrixReducer<S = ShortestAugmentingPath> {
    solver: S,
    config: EnumeratorConfig,
}

impl MatrixReducer<ShortestAugmentingPath> {
    /// Creates a reducer backed by the default [`ShortestAugmentingPath`] solver
    pub fn with_config(config: EnumeratorConfig) -> Self {
        Self::new(ShortestAugmentingPath, config)
    }
}

impl Default for MatrixReducer<ShortestAugmentingPath> {
    fn default() -> Self {
        Self::with_config(EnumeratorConfig::default())
    }
}

impl<S> MatrixReducer<S> {
    pub fn new(solver: S, config: EnumeratorConfig) -> Self {
        Self { solver, config }
    }

    pub fn config(&self) -> &EnumeratorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EnumeratorConfig) {
        self.config = config;
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }
}

impl<S: AssignmentSolver> MatrixReducer<S> {
    /// Solves `matrix` and reduces it by the resulting duals.
    ///
    /// Fails with [`KBestError::Infeasible`] if the matrix is empty or has no perfect matching,
    /// and with [`KBestError::NumericDegeneracy`] if the minimum reduced cost is not close to
    /// zero.
    ///
    /// # Example
    /// ```
    /// use kbest::config::EnumeratorConfig;
    /// use kbest::matrix::CostMatrix;
    /// use kbest::reduction::MatrixReducer;
    /// let matrix = CostMatrix::from([[1.0, 1.0], [2.0, 1.0]]);
    /// let reducer = MatrixReducer::with_config(EnumeratorConfig::default());
    /// let reduction = reducer.reduce(&matrix).unwrap();
    /// assert!((reduction.lower_bound - 2.0).abs() < 1e-12);
    /// assert_eq!(reduction.reduced.min_finite(), Some(0.0));
    /// ```
    pub fn reduce(&self, matrix: &CostMatrix) -> Result<Reduction> {
        let n = matrix.len();
        if n == 0 {
            return Err(KBestError::Infeasible);
        }

        let assignment = self.solver.solve(matrix)?;
        debug_assert_eq!(assignment.row_duals.len(), n);
        debug_assert_eq!(assignment.col_duals.len(), n);

        let mut reduced = matrix.clone();
        for i in 0..n {
            let u = assignment.row_duals[i];
            for (c, &v) in reduced.row_mut(i).iter_mut().zip(&assignment.col_duals) {
                // infinite entries stay infinite
                *c = *c - u - v;
            }
        }

        let minimum = reduced.min_finite().ok_or(KBestError::Infeasible)?;

        let tolerance =
            self.config.degeneracy_tolerance() * (1.0 + matrix.max_finite_magnitude());
        if minimum.abs() > tolerance {
            return Err(KBestError::NumericDegeneracy { minimum, tolerance });
        }

        for i in 0..n {
            reduced.row_mut(i).iter_mut().for_each(|c| *c -= minimum);
        }

        let lower_bound = assignment.dual_objective() + minimum * n as Cost;
        trace!(
            "Reduced matrix with n={}: lower bound {}, drift {:e}",
            n,
            lower_bound,
            minimum
        );

        Ok(Reduction {
            lower_bound,
            matching: assignment.matching(),
            reduced,
        })
    }
}
