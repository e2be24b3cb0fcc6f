use crate::matrix::{CostMatrix, Matching, RankedMatching};
use itertools::Itertools;

/// Largest matrix accepted by the brute-force enumeration; 10! is already 3.6 million matchings
pub const MAX_NAIVE_SIZE: usize = 10;

/// Iterates over every perfect matching of `matrix` that uses finite entries only, in the
/// lexicographic order of the column permutation.
pub fn feasible_matchings(matrix: &CostMatrix) -> impl Iterator<Item = Matching> + '_ {
    let n = matrix.len();
    assert!(n <= MAX_NAIVE_SIZE);

    // `permutations(0)` yields a single empty permutation, but an empty matrix has no matching
    (0..n)
        .permutations(n)
        .filter(move |_| n > 0)
        .filter(move |cols| cols.iter().enumerate().all(|(i, &j)| !matrix.is_forbidden(i, j)))
        .map(|cols| Matching::from_columns(&cols))
}

/// A simple brute-force enumeration to provide cross-validation for the ranked enumeration.
///
/// Lists all perfect matchings over finite entries sorted by non-decreasing cost; matchings of
/// equal cost keep the lexicographic order of their column permutation.
///
/// # Example
/// ```
/// use kbest::matrix::{CostMatrix, Matching};
/// use kbest::naive::naive_enumerate;
/// let ranked = naive_enumerate(&CostMatrix::from([[1.0, 1.0], [2.0, 1.0]]));
/// assert_eq!(ranked.len(), 2);
/// assert_eq!(ranked[0].matching, Matching::from_columns(&[0, 1]));
/// assert_eq!(ranked[1].cost, 3.0);
/// ```
pub fn naive_enumerate(matrix: &CostMatrix) -> Vec<RankedMatching> {
    let mut ranked = feasible_matchings(matrix)
        .map(|matching| RankedMatching {
            cost: matching.cost(matrix),
            matching,
        })
        .collect_vec();

    ranked.sort_by(|a, b| a.cost.total_cmp(&b.cost));
    ranked
}

/// Returns true iff `matching` is a perfect matching of `matrix` using finite entries only
pub fn is_perfect_matching(matrix: &CostMatrix, matching: &Matching) -> bool {
    let n = matrix.len();
    if matching.len() != n {
        return false;
    }

    let mut col_used = vec![false; n];
    matching.iter().enumerate().all(|(k, (i, j))| {
        k == i && j < n && !std::mem::replace(&mut col_used[j], true) && !matrix.is_forbidden(i, j)
    })
}
