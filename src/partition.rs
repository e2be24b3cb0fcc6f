use crate::config::EnumeratorConfig;
use crate::matrix::{CostMatrix, Matching, Pair, FORBIDDEN};

/// The equality subgraph of a reduced cost matrix, i.e. all edges with a reduced cost of zero
/// (within tolerance). The realized optimal matching is always contained, even if floating
/// point drift pushed one of its reduced costs past the tolerance.
#[derive(Clone, Debug, PartialEq)]
pub struct AdmissibleEdges {
    n: usize,
    mask: Vec<bool>,
    len: usize,
}

impl AdmissibleEdges {
    pub fn from_reduced(
        reduced: &CostMatrix,
        realized: &Matching,
        config: &EnumeratorConfig,
    ) -> Self {
        let n = reduced.len();
        let mut mask = reduced
            .entries()
            .map(|(_, _, c)| config.is_admissible(c))
            .collect::<Vec<_>>();

        for (i, j) in realized.iter() {
            mask[i * n + j] = true;
        }

        let len = mask.iter().filter(|&&x| x).count();
        Self { n, mask, len }
    }

    /// Number of rows (and columns) of the underlying matrix
    pub fn order(&self) -> usize {
        self.n
    }

    /// Number of admissible edges
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.mask[row * self.n + col]
    }

    /// Admissible columns of `row` in increasing order
    pub fn cols_of(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        self.mask[row * self.n..(row + 1) * self.n]
            .iter()
            .enumerate()
            .filter_map(|(j, &x)| x.then(|| j))
    }

    /// All admissible edges in row-major order
    pub fn edges(&self) -> Vec<Pair> {
        self.mask
            .iter()
            .enumerate()
            .filter_map(|(k, &x)| x.then(|| (k / self.n, k % self.n)))
            .collect()
    }
}

/// Splits the solution space of a resolved subproblem into disjoint children.
///
/// For split row `i` the child matrix keeps rows `0..i` verbatim, forbids every admissible
/// edge in row `i`, and restricts rows `i+1..n` to admissible edges. Hence child `i` contains
/// exactly those perfect matchings whose last non-admissible edge lies in row `i`. Together
/// the children cover every perfect matching of the parent except those lying entirely in the
/// equality subgraph, and no matching is covered twice.
///
/// # Example
/// ```
/// use kbest::config::EnumeratorConfig;
/// use kbest::matrix::{CostMatrix, Matching};
/// use kbest::partition::{AdmissibleEdges, Partitioner};
/// let inf = f64::INFINITY;
/// let reduced = CostMatrix::from([[0.0, 1.0], [2.0, 0.0]]);
/// let realized = Matching::from_columns(&[0, 1]);
/// let config = EnumeratorConfig::default();
/// let admissible = AdmissibleEdges::from_reduced(&reduced, &realized, &config);
/// let partitioner = Partitioner::new(&reduced, &admissible);
/// assert_eq!(partitioner.child(0), CostMatrix::from([[inf, 1.0], [inf, 0.0]]));
/// assert_eq!(partitioner.child(1), CostMatrix::from([[0.0, 1.0], [2.0, inf]]));
/// ```
pub struct Partitioner<'a> {
    parent: &'a CostMatrix,
    admissible: &'a AdmissibleEdges,
}

impl<'a> Partitioner<'a> {
    pub fn new(parent: &'a CostMatrix, admissible: &'a AdmissibleEdges) -> Self {
        assert_eq!(parent.len(), admissible.order());
        Self { parent, admissible }
    }

    /// Builds the child matrix for split row `split_row`
    pub fn child(&self, split_row: usize) -> CostMatrix {
        let n = self.parent.len();
        assert!(split_row < n);

        let mut child = self.parent.clone();

        for j in self.admissible.cols_of(split_row) {
            child.set(split_row, j, FORBIDDEN);
        }

        for i in split_row + 1..n {
            for (j, c) in child.row_mut(i).iter_mut().enumerate() {
                if !self.admissible.contains(i, j) {
                    *c = FORBIDDEN;
                }
            }
        }

        child
    }

    /// Returns true if row `split_row` keeps at least one finite entry after its admissible
    /// edges are forbidden. Otherwise the child for this row is trivially infeasible.
    pub fn has_alternative(&self, split_row: usize) -> bool {
        self.parent
            .row(split_row)
            .iter()
            .enumerate()
            .any(|(j, c)| c.is_finite() && !self.admissible.contains(split_row, j))
    }

    /// Iterates over `(split_row, child)` for every split row that is not trivially infeasible
    pub fn children(&self) -> impl Iterator<Item = (usize, CostMatrix)> + '_ {
        (0..self.parent.len())
            .filter(move |&i| self.has_alternative(i))
            .map(move |i| (i, self.child(i)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naive::{feasible_matchings, is_perfect_matching};
    use crate::random_models::{generate_integral, generate_uniform, generate_with_forbidden};
    use crate::reduction::MatrixReducer;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    fn in_equality_subgraph(admissible: &AdmissibleEdges, matching: &Matching) -> bool {
        matching.iter().all(|(i, j)| admissible.contains(i, j))
    }

    /// Checks that every perfect matching of `matrix` lies either in the equality subgraph or
    /// in exactly one child, where it keeps its reduced cost.
    fn assert_partition_is_exact(matrix: &CostMatrix) {
        let config = EnumeratorConfig::default();
        let reduction = match MatrixReducer::with_config(config).reduce(matrix) {
            Ok(r) => r,
            Err(_) => return,
        };

        let admissible =
            AdmissibleEdges::from_reduced(&reduction.reduced, &reduction.matching, &config);
        let partitioner = Partitioner::new(&reduction.reduced, &admissible);
        let children: Vec<_> = (0..matrix.len()).map(|i| partitioner.child(i)).collect();

        assert!(in_equality_subgraph(&admissible, &reduction.matching));

        for matching in feasible_matchings(&reduction.reduced) {
            let covering = children
                .iter()
                .filter(|child| is_perfect_matching(child, &matching))
                .collect::<Vec<_>>();

            if in_equality_subgraph(&admissible, &matching) {
                assert!(covering.is_empty(), "tied matching {} leaked", matching);
            } else {
                assert_eq!(
                    covering.len(),
                    1,
                    "matching {} covered {} times",
                    matching,
                    covering.len()
                );
                let parent_cost = matching.cost(&reduction.reduced);
                assert_eq!(matching.cost(covering[0]), parent_cost);
            }
        }

        // children never add edges
        for child in &children {
            for (i, j, c) in child.entries() {
                assert!(c.is_infinite() || c == reduction.reduced.get(i, j));
            }
        }
    }

    #[test]
    fn admissible_edges() {
        let reduced = CostMatrix::from([[0.0, 0.0, 1.0], [1e-10, 3.0, 0.0], [0.5, 0.0, 2.0]]);
        let realized = Matching::from_columns(&[0, 2, 1]);
        let admissible =
            AdmissibleEdges::from_reduced(&reduced, &realized, &EnumeratorConfig::default());

        assert_eq!(admissible.edges(), vec![(0, 0), (0, 1), (1, 0), (1, 2), (2, 1)]);
        assert_eq!(admissible.len(), 5);
        assert_eq!(admissible.cols_of(0).collect::<Vec<_>>(), vec![0, 1]);
        assert!(!admissible.contains(2, 2));
    }

    #[test]
    fn realized_matching_always_admissible() {
        let reduced = CostMatrix::from([[1e-3, 1.0], [1.0, 0.0]]);
        let realized = Matching::from_columns(&[0, 1]);
        let admissible =
            AdmissibleEdges::from_reduced(&reduced, &realized, &EnumeratorConfig::default());
        assert!(admissible.contains(0, 0));
        assert_eq!(admissible.len(), 2);
    }

    #[test]
    fn trivially_infeasible_children_are_skipped() {
        let inf = f64::INFINITY;
        let reduced = CostMatrix::from([[0.0, inf], [3.0, 0.0]]);
        let realized = Matching::from_columns(&[0, 1]);
        let admissible =
            AdmissibleEdges::from_reduced(&reduced, &realized, &EnumeratorConfig::default());
        let partitioner = Partitioner::new(&reduced, &admissible);

        assert!(!partitioner.has_alternative(0));
        assert!(partitioner.has_alternative(1));
        let children: Vec<_> = partitioner.children().collect();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].0, 1);
        assert_eq!(children[0].1, CostMatrix::from([[0.0, inf], [3.0, inf]]));
    }

    #[test]
    fn partition_random_uniform() {
        let mut gen = Pcg64Mcg::seed_from_u64(1234);
        for n in 1..=5 {
            for _ in 0..5 {
                assert_partition_is_exact(&generate_uniform(&mut gen, n, 0.0..10.0));
            }
        }
    }

    #[test]
    fn partition_random_with_ties() {
        let mut gen = Pcg64Mcg::seed_from_u64(2345);
        for n in 1..=5 {
            for _ in 0..5 {
                assert_partition_is_exact(&generate_integral(&mut gen, n, 2));
            }
        }
    }

    #[test]
    fn partition_random_forbidden() {
        let mut gen = Pcg64Mcg::seed_from_u64(3456);
        for n in 1..=5 {
            for _ in 0..5 {
                assert_partition_is_exact(&generate_with_forbidden(&mut gen, n, 0.3, 0.0..1.0));
            }
        }
    }
}
