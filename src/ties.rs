//! Handlers deciding which matchings are emitted for a popped subproblem.
//!
//! A subproblem's optimal cost may be attained by several matchings: all perfect matchings of
//! its equality subgraph. The partitioning step excludes all of them from the children, so a
//! handler that returns only the realized solution skips the other ties, while [`AllTies`]
//! emits every one of them.

use crate::matrix::{Matching, Pair};
use std::iter::Once;

/// Invoked once per popped subproblem with the admissible edges (row-major) and the realized
/// optimal matching. Returns the matchings to emit for this subproblem; all of them must be
/// perfect matchings of the admissible edges. The returned iterator is drained lazily, one
/// matching per pull, before the next subproblem is popped.
pub trait TieHandler {
    type Ties: Iterator<Item = Matching>;

    fn expand(&mut self, admissible: &[Pair], realized: &Matching) -> Self::Ties;
}

/// Emits exactly the realized matching of each subproblem; the default handler
#[derive(Clone, Copy, Debug, Default)]
pub struct Representative;

impl TieHandler for Representative {
    type Ties = Once<Matching>;

    fn expand(&mut self, _admissible: &[Pair], realized: &Matching) -> Self::Ties {
        std::iter::once(realized.clone())
    }
}

/// Emits every perfect matching of the admissible edges; the realized matching comes first,
/// the others follow in lexicographic order of their columns.
///
/// # Example
/// ```
/// use kbest::matrix::Matching;
/// use kbest::ties::{AllTies, TieHandler};
/// let admissible = [(0, 0), (0, 1), (1, 0), (1, 1)];
/// let realized = Matching::from_columns(&[1, 0]);
/// let ties: Vec<_> = AllTies.expand(&admissible, &realized).collect();
/// assert_eq!(ties, vec![realized, Matching::from_columns(&[0, 1])]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct AllTies;

impl TieHandler for AllTies {
    type Ties = TieSearch;

    fn expand(&mut self, admissible: &[Pair], realized: &Matching) -> Self::Ties {
        TieSearch::new(admissible, realized)
    }
}

impl<F, I> TieHandler for F
where
    F: FnMut(&[Pair], &Matching) -> I,
    I: IntoIterator<Item = Matching>,
{
    type Ties = I::IntoIter;

    fn expand(&mut self, admissible: &[Pair], realized: &Matching) -> Self::Ties {
        self(admissible, realized).into_iter()
    }
}

/// Depth-first search over the perfect matchings of a bipartite graph, returned by
/// [`AllTies`]. The search keeps an explicit stack (one cursor per row), so each call to
/// `next` resumes where the previous one stopped.
pub struct TieSearch {
    adjacency: Vec<Vec<usize>>,
    /// Next index into `adjacency[row]` to try for every row on the stack
    cursor: Vec<usize>,
    col_of_row: Vec<usize>,
    col_used: Vec<bool>,
    realized: Matching,
    first: Option<Matching>,
    exhausted: bool,
}

impl TieSearch {
    fn new(admissible: &[Pair], realized: &Matching) -> Self {
        let n = realized.len();
        let mut adjacency = vec![Vec::new(); n];
        for &(i, j) in admissible {
            adjacency[i].push(j);
        }

        Self {
            adjacency,
            cursor: vec![0; n],
            col_of_row: Vec::with_capacity(n),
            col_used: vec![false; n],
            realized: realized.clone(),
            first: Some(realized.clone()),
            exhausted: n == 0,
        }
    }

    /// Removes the deepest row from the stack
    fn backtrack(&mut self) {
        if let Some(col) = self.col_of_row.pop() {
            self.col_used[col] = false;
        }
    }
}

impl Iterator for TieSearch {
    type Item = Matching;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(realized) = self.first.take() {
            return Some(realized);
        }

        while !self.exhausted {
            let row = self.col_of_row.len();

            if row == self.adjacency.len() {
                let matching = Matching::from_columns(&self.col_of_row);
                self.backtrack();
                if matching != self.realized {
                    return Some(matching);
                }
                continue;
            }

            let candidates = &self.adjacency[row];
            let mut next_col = None;
            while self.cursor[row] < candidates.len() {
                let col = candidates[self.cursor[row]];
                self.cursor[row] += 1;
                if !self.col_used[col] {
                    next_col = Some(col);
                    break;
                }
            }

            match next_col {
                Some(col) => {
                    self.col_used[col] = true;
                    self.col_of_row.push(col);
                }
                None => {
                    self.cursor[row] = 0;
                    if row == 0 {
                        self.exhausted = true;
                    } else {
                        self.backtrack();
                    }
                }
            }
        }

        None
    }
}
