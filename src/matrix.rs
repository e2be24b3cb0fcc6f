use crate::error::{KBestError, Result};
use itertools::Itertools;
use std::fmt;
use std::ops::{Index, IndexMut};

pub type Cost = f64;
pub type Pair = (usize, usize);

/// Entry value of a forbidden edge
pub const FORBIDDEN: Cost = Cost::INFINITY;

/// A dense square matrix of assignment costs stored in row-major order. Infinite entries
/// encode forbidden edges; NaN and negative infinity are rejected on construction.
#[derive(Clone, PartialEq, Default)]
pub struct CostMatrix {
    n: usize,
    entries: Vec<Cost>,
}

impl CostMatrix {
    /// Creates an `n` by `n` matrix with every entry set to `value`
    pub fn filled(n: usize, value: Cost) -> Self {
        assert!(!value.is_nan() && value != Cost::NEG_INFINITY);
        Self {
            n,
            entries: vec![value; n * n],
        }
    }

    /// Creates an `n` by `n` matrix where entry `(i, j)` is `f(i, j)`.
    ///
    /// # Panics
    /// If `f` produces NaN or negative infinity.
    pub fn from_fn<F: FnMut(usize, usize) -> Cost>(n: usize, mut f: F) -> Self {
        let entries = (0..n)
            .cartesian_product(0..n)
            .map(|(i, j)| f(i, j))
            .collect_vec();
        assert!(entries
            .iter()
            .all(|c| !c.is_nan() && *c != Cost::NEG_INFINITY));
        Self { n, entries }
    }

    /// Builds a matrix from nested rows. Fails if the rows do not form a square matrix or if
    /// an entry is NaN or negative infinity.
    ///
    /// # Example
    /// ```
    /// use kbest::matrix::CostMatrix;
    /// let matrix = CostMatrix::try_from_rows(&[[1.0, 2.0], [3.0, f64::INFINITY]]).unwrap();
    /// assert_eq!(matrix.len(), 2);
    /// assert!(matrix.is_forbidden(1, 1));
    /// assert!(CostMatrix::try_from_rows(&[vec![1.0, 2.0]]).is_err());
    /// ```
    pub fn try_from_rows<R: AsRef<[Cost]>>(rows: &[R]) -> Result<Self> {
        let n = rows.len();
        let mut entries = Vec::with_capacity(n * n);

        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != n {
                return Err(KBestError::NotSquare {
                    row,
                    len: values.len(),
                    expected: n,
                });
            }

            for (col, &value) in values.iter().enumerate() {
                if value.is_nan() || value == Cost::NEG_INFINITY {
                    return Err(KBestError::InvalidEntry { row, col, value });
                }
            }

            entries.extend_from_slice(values);
        }

        Ok(Self { n, entries })
    }

    /// Number of rows (and columns)
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    pub fn get(&self, row: usize, col: usize) -> Cost {
        self.entries[row * self.n + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: Cost) {
        debug_assert!(!value.is_nan());
        self.entries[row * self.n + col] = value;
    }

    /// Removes the edge `(row, col)` by setting its cost to infinity
    pub fn forbid(&mut self, row: usize, col: usize) {
        self.set(row, col, FORBIDDEN);
    }

    pub fn is_forbidden(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_infinite()
    }

    pub fn row(&self, row: usize) -> &[Cost] {
        &self.entries[row * self.n..(row + 1) * self.n]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [Cost] {
        &mut self.entries[row * self.n..(row + 1) * self.n]
    }

    /// Iterates over all rows from top to bottom
    pub fn rows(&self) -> impl Iterator<Item = &[Cost]> + '_ {
        // chunks_exact panics on a chunk size of zero
        self.entries.chunks_exact(self.n.max(1))
    }

    /// Iterates over all entries as `(row, col, cost)` in row-major order
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize, Cost)> + '_ {
        let n = self.n;
        self.entries
            .iter()
            .enumerate()
            .map(move |(k, &c)| (k / n, k % n, c))
    }

    /// Returns the smallest finite entry or `None` if all entries are forbidden
    pub fn min_finite(&self) -> Option<Cost> {
        self.entries
            .iter()
            .copied()
            .filter(|c| c.is_finite())
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Returns the largest absolute value among the finite entries (0 if there are none)
    pub fn max_finite_magnitude(&self) -> Cost {
        self.entries
            .iter()
            .filter(|c| c.is_finite())
            .fold(0.0, |acc: Cost, c| acc.max(c.abs()))
    }
}

impl Index<Pair> for CostMatrix {
    type Output = Cost;

    fn index(&self, (row, col): Pair) -> &Self::Output {
        &self.entries[row * self.n + col]
    }
}

impl IndexMut<Pair> for CostMatrix {
    fn index_mut(&mut self, (row, col): Pair) -> &mut Self::Output {
        &mut self.entries[row * self.n + col]
    }
}

impl TryFrom<Vec<Vec<Cost>>> for CostMatrix {
    type Error = KBestError;

    fn try_from(rows: Vec<Vec<Cost>>) -> Result<Self> {
        Self::try_from_rows(&rows)
    }
}

/// Builds a matrix from a fixed-size array literal; use [`CostMatrix::try_from_rows`] for data
/// that is not known to be valid.
///
/// # Panics
/// If an entry is NaN or negative infinity.
impl<const N: usize> From<[[Cost; N]; N]> for CostMatrix {
    fn from(rows: [[Cost; N]; N]) -> Self {
        Self::from_fn(N, |i, j| rows[i][j])
    }
}

impl fmt::Debug for CostMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "CostMatrix n={}", self.n)?;
        for row in self.rows() {
            writeln!(f, "  [{}]", row.iter().map(|c| format!("{:8.3}", c)).join(" "))?;
        }
        Ok(())
    }
}

/// A perfect matching stored as `(row, col)` pairs sorted by row; the columns form a
/// permutation of `0..n`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Matching {
    pairs: Vec<Pair>,
}

impl Matching {
    /// Creates the matching that assigns row `i` to column `col_of_row[i]`.
    ///
    /// # Example
    /// ```
    /// use kbest::matrix::Matching;
    /// let matching = Matching::from_columns(&[2, 0, 1]);
    /// assert_eq!(matching.pairs(), &[(0, 2), (1, 0), (2, 1)]);
    /// ```
    pub fn from_columns(col_of_row: &[usize]) -> Self {
        debug_assert!(is_permutation(col_of_row));
        Self {
            pairs: col_of_row.iter().copied().enumerate().collect(),
        }
    }

    /// Creates a matching from pairs in arbitrary order; rows and columns must each form a
    /// permutation of `0..pairs.len()`.
    pub fn from_pairs<I: IntoIterator<Item = Pair>>(pairs: I) -> Self {
        let mut pairs = pairs.into_iter().collect_vec();
        pairs.sort_unstable();
        debug_assert!(pairs.iter().enumerate().all(|(k, &(i, _))| k == i));
        debug_assert!(is_permutation(&pairs.iter().map(|&(_, j)| j).collect_vec()));
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    pub fn into_pairs(self) -> Vec<Pair> {
        self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = Pair> + '_ {
        self.pairs.iter().copied()
    }

    /// Column assigned to `row`
    pub fn col_of(&self, row: usize) -> usize {
        self.pairs[row].1
    }

    pub fn contains(&self, pair: Pair) -> bool {
        self.pairs.get(pair.0).map_or(false, |&p| p == pair)
    }

    /// Total cost of this matching in `matrix`; infinite if it uses a forbidden edge
    pub fn cost(&self, matrix: &CostMatrix) -> Cost {
        debug_assert_eq!(matrix.len(), self.len());
        self.iter().map(|p| matrix[p]).sum()
    }
}

impl<'a> IntoIterator for &'a Matching {
    type Item = &'a Pair;
    type IntoIter = std::slice::Iter<'a, Pair>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl fmt::Display for Matching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}]",
            self.iter().map(|(i, j)| format!("({}, {})", i, j)).join(", ")
        )
    }
}

/// A matching together with its total cost in the original input matrix
#[derive(Clone, Debug, PartialEq)]
pub struct RankedMatching {
    pub cost: Cost,
    pub matching: Matching,
}

fn is_permutation(values: &[usize]) -> bool {
    let mut seen = vec![false; values.len()];
    values.iter().all(|&v| {
        v < seen.len() && !std::mem::replace(&mut seen[v], true)
    })
}
