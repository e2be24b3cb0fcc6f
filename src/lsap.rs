//! Solver for a single linear sum assignment problem.
//!
//! The implementation follows the shortest augmenting path approach of Jonker and Volgenant in
//! the formulation of Crouse ("On implementing 2D rectangular assignment algorithms", 2016). Rows
//! are inserted one at a time; for each row, a Dijkstra-like search over reduced costs finds the
//! cheapest augmenting path to an unassigned column and the dual potentials are updated so that
//! all reduced costs stay non-negative. Forbidden (infinite) entries are never relaxed, so a
//! row whose search reaches only infinite distances proves that no perfect matching exists.

use crate::error::{KBestError, Result};
use crate::matrix::{Cost, CostMatrix, Matching};

const UNASSIGNED: usize = usize::MAX;

/// Optimal solution of an assignment problem together with a dual certificate: for every pair
/// `k`, `cost[row_indices[k]][col_indices[k]] == row_duals[row] + col_duals[col]` and for every
/// entry `cost[i][j] >= row_duals[i] + col_duals[j]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub row_indices: Vec<usize>,
    pub col_indices: Vec<usize>,
    pub row_duals: Vec<Cost>,
    pub col_duals: Vec<Cost>,
}

impl Assignment {
    pub fn matching(&self) -> Matching {
        Matching::from_pairs(
            self.row_indices
                .iter()
                .copied()
                .zip(self.col_indices.iter().copied()),
        )
    }

    /// Sum of all dual potentials; equals the optimal cost
    pub fn dual_objective(&self) -> Cost {
        self.row_duals.iter().sum::<Cost>() + self.col_duals.iter().sum::<Cost>()
    }
}

/// An oracle that solves a square assignment problem optimally or reports
/// [`KBestError::Infeasible`] if no perfect matching over finite entries exists.
pub trait AssignmentSolver {
    fn solve(&self, matrix: &CostMatrix) -> Result<Assignment>;
}

/// Shortest augmenting path solver; see module documentation.
///
/// # Example
/// ```
/// use kbest::lsap::{AssignmentSolver, ShortestAugmentingPath};
/// use kbest::matrix::CostMatrix;
/// let matrix = CostMatrix::from([[4.0, 1.0, 3.0], [2.0, 0.0, 5.0], [3.0, 2.0, 2.0]]);
/// let assignment = ShortestAugmentingPath.solve(&matrix).unwrap();
/// assert_eq!(assignment.col_indices, vec![1, 0, 2]);
/// assert!((assignment.dual_objective() - 5.0).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ShortestAugmentingPath;

impl AssignmentSolver for ShortestAugmentingPath {
    fn solve(&self, matrix: &CostMatrix) -> Result<Assignment> {
        linear_sum_assignment(matrix)
    }
}

/// Shorthand for [`ShortestAugmentingPath::solve`]
pub fn linear_sum_assignment(matrix: &CostMatrix) -> Result<Assignment> {
    let n = matrix.len();
    if n == 0 {
        return Ok(Assignment {
            row_indices: Vec::new(),
            col_indices: Vec::new(),
            row_duals: Vec::new(),
            col_duals: Vec::new(),
        });
    }

    // shift all finite costs to be non-negative, so that zero duals are a feasible start
    let offset = matrix.min_finite().ok_or(KBestError::Infeasible)?;
    let mut search = PathSearch::new(matrix, offset);

    for current_row in 0..n {
        let (sink, min_value) = search
            .shortest_augmenting_path(current_row)
            .ok_or(KBestError::Infeasible)?;
        search.update_duals(current_row, min_value);
        search.augment(current_row, sink);
    }

    let PathSearch {
        mut row_duals,
        col_duals,
        col4row,
        ..
    } = search;

    for u in row_duals.iter_mut() {
        *u += offset;
    }

    Ok(Assignment {
        row_indices: (0..n).collect(),
        col_indices: col4row,
        row_duals,
        col_duals,
    })
}

struct PathSearch<'a> {
    matrix: &'a CostMatrix,
    offset: Cost,
    row_duals: Vec<Cost>,
    col_duals: Vec<Cost>,
    shortest_path_costs: Vec<Cost>,
    path: Vec<usize>,
    col4row: Vec<usize>,
    row4col: Vec<usize>,
    scanned_rows: Vec<bool>,
    scanned_cols: Vec<bool>,
}

impl<'a> PathSearch<'a> {
    fn new(matrix: &'a CostMatrix, offset: Cost) -> Self {
        let n = matrix.len();
        Self {
            matrix,
            offset,
            row_duals: vec![0.0; n],
            col_duals: vec![0.0; n],
            shortest_path_costs: vec![Cost::INFINITY; n],
            path: vec![UNASSIGNED; n],
            col4row: vec![UNASSIGNED; n],
            row4col: vec![UNASSIGNED; n],
            scanned_rows: vec![false; n],
            scanned_cols: vec![false; n],
        }
    }

    fn cost(&self, row: usize, col: usize) -> Cost {
        self.matrix.get(row, col) - self.offset
    }

    /// Returns the sink column of a shortest augmenting path starting at `start_row` and the
    /// length of that path, or `None` if every remaining column is unreachable.
    fn shortest_augmenting_path(&mut self, start_row: usize) -> Option<(usize, Cost)> {
        let n = self.matrix.len();

        // filled in reverse order, so that a constant matrix is solved by the identity
        let mut remaining: Vec<usize> = (0..n).rev().collect();

        self.scanned_rows.iter_mut().for_each(|x| *x = false);
        self.scanned_cols.iter_mut().for_each(|x| *x = false);
        self.shortest_path_costs
            .iter_mut()
            .for_each(|x| *x = Cost::INFINITY);

        let mut min_value: Cost = 0.0;
        let mut row = start_row;

        loop {
            self.scanned_rows[row] = true;

            let mut lowest = Cost::INFINITY;
            let mut index = None;

            for (it, &col) in remaining.iter().enumerate() {
                let entry = self.cost(row, col);
                if entry.is_finite() {
                    let reduced = min_value + entry - self.row_duals[row] - self.col_duals[col];
                    if reduced < self.shortest_path_costs[col] {
                        self.path[col] = row;
                        self.shortest_path_costs[col] = reduced;
                    }
                }

                // among equally short paths prefer one ending in a new sink
                let dist = self.shortest_path_costs[col];
                if dist < lowest || (dist == lowest && self.row4col[col] == UNASSIGNED) {
                    lowest = dist;
                    index = Some(it);
                }
            }

            if !lowest.is_finite() {
                return None;
            }

            let index = index?;
            min_value = lowest;
            let col = remaining.swap_remove(index);
            self.scanned_cols[col] = true;

            if self.row4col[col] == UNASSIGNED {
                return Some((col, min_value));
            }

            row = self.row4col[col];
        }
    }

    fn update_duals(&mut self, current_row: usize, min_value: Cost) {
        self.row_duals[current_row] += min_value;

        for row in 0..self.matrix.len() {
            if self.scanned_rows[row] && row != current_row {
                let col = self.col4row[row];
                self.row_duals[row] += min_value - self.shortest_path_costs[col];
            }
        }

        for col in 0..self.matrix.len() {
            if self.scanned_cols[col] {
                self.col_duals[col] -= min_value - self.shortest_path_costs[col];
            }
        }
    }

    fn augment(&mut self, current_row: usize, sink: usize) {
        let mut col = sink;
        loop {
            let row = self.path[col];
            self.row4col[col] = row;
            std::mem::swap(&mut self.col4row[row], &mut col);
            if row == current_row {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naive::naive_enumerate;
    use crate::random_models::{generate_integral, generate_uniform, generate_with_forbidden};
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    fn assert_dual_certificate(matrix: &CostMatrix, assignment: &Assignment) {
        let n = matrix.len();
        for (i, j, c) in matrix.entries() {
            if c.is_finite() {
                let slack = c - assignment.row_duals[i] - assignment.col_duals[j];
                assert!(slack > -1e-9, "negative slack {} at ({}, {})", slack, i, j);
            }
        }

        assert_eq!(assignment.row_indices, (0..n).collect::<Vec<_>>());
        for (&i, &j) in assignment.row_indices.iter().zip(&assignment.col_indices) {
            let slack = matrix.get(i, j) - assignment.row_duals[i] - assignment.col_duals[j];
            assert!(slack.abs() < 1e-9);
        }
    }

    #[test]
    fn empty() {
        let assignment = linear_sum_assignment(&CostMatrix::default()).unwrap();
        assert!(assignment.col_indices.is_empty());
        assert_eq!(assignment.dual_objective(), 0.0);
    }

    #[test]
    fn constant_matrix_yields_identity() {
        let matrix = CostMatrix::filled(4, 3.0);
        let assignment = linear_sum_assignment(&matrix).unwrap();
        assert_eq!(assignment.col_indices, vec![0, 1, 2, 3]);
        assert!((assignment.dual_objective() - 12.0).abs() < 1e-12);
        assert_dual_certificate(&matrix, &assignment);
    }

    #[test]
    fn small_example() {
        let matrix = CostMatrix::from([[1.0, 1.0], [2.0, 1.0]]);
        let assignment = linear_sum_assignment(&matrix).unwrap();
        assert_eq!(assignment.matching(), Matching::from_columns(&[0, 1]));
        assert_dual_certificate(&matrix, &assignment);
    }

    #[test]
    fn negative_costs() {
        let matrix = CostMatrix::from([[-5.0, 0.0], [0.0, -5.0]]);
        let assignment = linear_sum_assignment(&matrix).unwrap();
        assert_eq!(assignment.col_indices, vec![0, 1]);
        assert!((assignment.dual_objective() + 10.0).abs() < 1e-12);
        assert_dual_certificate(&matrix, &assignment);
    }

    #[test]
    fn forbidden_entries() {
        let inf = f64::INFINITY;
        let matrix = CostMatrix::from([[inf, 1.0, inf], [2.0, inf, inf], [inf, inf, 7.0]]);
        let assignment = linear_sum_assignment(&matrix).unwrap();
        assert_eq!(assignment.col_indices, vec![1, 0, 2]);
        assert_dual_certificate(&matrix, &assignment);
    }

    #[test]
    fn infeasible() {
        let inf = f64::INFINITY;
        assert_eq!(
            linear_sum_assignment(&CostMatrix::from([[1.0, 2.0], [inf, inf]])),
            Err(KBestError::Infeasible)
        );
        assert_eq!(
            linear_sum_assignment(&CostMatrix::from([[1.0, inf], [2.0, inf]])),
            Err(KBestError::Infeasible)
        );
        assert_eq!(
            linear_sum_assignment(&CostMatrix::filled(3, inf)),
            Err(KBestError::Infeasible)
        );
    }

    #[test]
    fn cross_validation() {
        let mut gen = Pcg64Mcg::seed_from_u64(123);

        for n in 1..7 {
            for _ in 0..10 {
                let matrices = [
                    generate_uniform(&mut gen, n, -10.0..10.0),
                    generate_integral(&mut gen, n, 3),
                    generate_with_forbidden(&mut gen, n, 0.3, 0.0..1.0),
                ];

                for matrix in &matrices {
                    let optimum = naive_enumerate(matrix).first().map(|r| r.cost);
                    match linear_sum_assignment(matrix) {
                        Ok(assignment) => {
                            let cost = assignment.matching().cost(matrix);
                            let optimum = optimum.unwrap();
                            assert!((cost - optimum).abs() < 1e-9);
                            assert!((assignment.dual_objective() - optimum).abs() < 1e-9);
                            assert_dual_certificate(matrix, &assignment);
                        }
                        Err(err) => {
                            assert_eq!(err, KBestError::Infeasible);
                            assert!(optimum.is_none());
                        }
                    }
                }
            }
        }
    }
}
