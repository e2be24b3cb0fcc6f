use crate::config::EnumeratorConfig;
use crate::error::{KBestError, Result};
use crate::frontier::Frontier;
use crate::lsap::{AssignmentSolver, ShortestAugmentingPath};
use crate::matrix::{Cost, CostMatrix, Matching, RankedMatching};
use crate::partition::{AdmissibleEdges, Partitioner};
use crate::reduction::{MatrixReducer, Reduction};
use crate::ties::{Representative, TieHandler};
use log::{debug, error, trace};
use std::iter::{FusedIterator, Peekable};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnumeratorState {
    /// The root problem has not been solved yet
    Init,
    /// Subproblems remain on the frontier
    Running,
    /// The frontier is exhausted; no further matching will be produced
    Done,
}

/// Counters describing the work carried out so far
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumeratorStats {
    /// Successful oracle calls, including the root
    pub subproblems_resolved: usize,
    /// Children dropped because they admit no perfect matching
    pub subproblems_pruned: usize,
    /// Subproblems taken from the frontier
    pub subproblems_popped: usize,
    pub matchings_emitted: usize,
    pub max_frontier_len: usize,
}

/// A node of the implicit search tree. It is self-contained: branching only needs its own
/// reduced matrix and realized matching.
struct Subproblem {
    lower_bound: Cost,
    matching: Matching,
    reduced: CostMatrix,
}

impl From<Reduction> for Subproblem {
    fn from(reduction: Reduction) -> Self {
        Self {
            lower_bound: reduction.lower_bound,
            matching: reduction.matching,
            reduced: reduction.reduced,
        }
    }
}

/// Enumerates the perfect matchings of a cost matrix in non-decreasing order of total cost
/// (Murty's ranking scheme on top of a dual-based reduction).
///
/// The enumeration is lazy: each call to [`KBestEnumerator::try_next`] (or [`Iterator::next`])
/// pops the cheapest subproblem from the frontier, emits its optimal matching and replaces it
/// by at most `n` children that partition the rest of its solution space. Each subproblem is
/// solved exactly once. The instance cannot be restarted; create a new one to enumerate again.
///
/// By default one matching is emitted per subproblem, so matchings tied with another matching
/// of the same subproblem are skipped. Use [`crate::ties::AllTies`] as tie handler to obtain
/// every perfect matching.
///
/// # Example
/// ```
/// use kbest::enumerator::KBestEnumerator;
/// use kbest::matrix::{CostMatrix, Matching};
///
/// let matrix = CostMatrix::from([[1.0, 1.0], [2.0, 1.0]]);
/// let matchings: Vec<_> = KBestEnumerator::new(matrix).collect();
/// assert_eq!(matchings, vec![Matching::from_columns(&[0, 1]), Matching::from_columns(&[1, 0])]);
/// ```
pub struct KBestEnumerator<S = ShortestAugmentingPath, H: TieHandler = Representative> {
    original: CostMatrix,
    reducer: MatrixReducer<S>,
    handler: H,
    frontier: Frontier<Subproblem>,
    /// Matchings of the most recently popped subproblem that were not emitted yet
    pending: Option<Peekable<H::Ties>>,
    /// Error raised while branching; reported once `pending` is drained
    failure: Option<KBestError>,
    state: EnumeratorState,
    stats: EnumeratorStats,
}

impl KBestEnumerator {
    /// Creates an enumerator with the default solver, configuration, and tie handler
    pub fn new(matrix: CostMatrix) -> Self {
        Self {
            original: matrix,
            reducer: MatrixReducer::default(),
            handler: Representative,
            frontier: Frontier::default(),
            pending: None,
            failure: None,
            state: EnumeratorState::Init,
            stats: EnumeratorStats::default(),
        }
    }
}

/// Builds a matrix from `rows` and returns an enumerator for it. Fails if the rows do not form a
/// square matrix or contain NaN or negative infinity.
///
/// # Example
/// ```
/// use kbest::enumerate_kbest;
/// let costs: Vec<f64> = enumerate_kbest(&[[3.0, 1.0], [1.0, 4.0]])
///     .unwrap()
///     .ranked()
///     .map(|r| r.cost)
///     .collect();
/// assert_eq!(costs, vec![2.0, 7.0]);
/// assert!(enumerate_kbest(&[vec![1.0, 2.0]]).is_err());
/// ```
pub fn enumerate_kbest<R: AsRef<[Cost]>>(rows: &[R]) -> Result<KBestEnumerator> {
    Ok(KBestEnumerator::new(CostMatrix::try_from_rows(rows)?))
}

impl<S, H: TieHandler> KBestEnumerator<S, H> {
    /// Replaces the numeric configuration.
    ///
    /// # Warning
    /// This method may only be called before the first matching is requested.
    pub fn with_config(mut self, config: EnumeratorConfig) -> Self {
        assert_eq!(self.state, EnumeratorState::Init);
        self.reducer.set_config(config);
        self
    }

    /// Replaces the assignment solver used for the root and every child.
    ///
    /// # Warning
    /// This method may only be called before the first matching is requested.
    pub fn with_solver<S2: AssignmentSolver>(self, solver: S2) -> KBestEnumerator<S2, H> {
        assert_eq!(self.state, EnumeratorState::Init);
        let config = *self.reducer.config();
        KBestEnumerator {
            original: self.original,
            reducer: MatrixReducer::new(solver, config),
            handler: self.handler,
            frontier: Frontier::default(),
            pending: None,
            failure: None,
            state: EnumeratorState::Init,
            stats: EnumeratorStats::default(),
        }
    }

    /// Replaces the handler deciding which matchings are emitted per subproblem.
    ///
    /// # Warning
    /// This method may only be called before the first matching is requested.
    pub fn with_tie_handler<H2: TieHandler>(self, handler: H2) -> KBestEnumerator<S, H2> {
        assert_eq!(self.state, EnumeratorState::Init);
        KBestEnumerator {
            original: self.original,
            reducer: self.reducer,
            handler,
            frontier: Frontier::default(),
            pending: None,
            failure: None,
            state: EnumeratorState::Init,
            stats: EnumeratorStats::default(),
        }
    }

    pub fn state(&self) -> EnumeratorState {
        self.state
    }

    pub fn stats(&self) -> &EnumeratorStats {
        &self.stats
    }

    /// The input matrix
    pub fn matrix(&self) -> &CostMatrix {
        &self.original
    }

    /// Number of subproblems currently waiting on the frontier
    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }
}

impl<S: AssignmentSolver, H: TieHandler> KBestEnumerator<S, H> {
    /// Returns the next matching together with its cost in the input matrix, or `None` once
    /// all matchings have been produced.
    ///
    /// An infeasible input results in an empty sequence. The only error is
    /// [`KBestError::NumericDegeneracy`], which indicates invalid duals from the solver. The
    /// matchings of the subproblem being branched are still returned first; the error follows
    /// on the next call and the enumerator is finished afterwards.
    pub fn try_next(&mut self) -> Result<Option<RankedMatching>> {
        loop {
            if let Some(matching) = self.pending.as_mut().and_then(|ties| ties.next()) {
                debug_assert_eq!(matching.len(), self.original.len());
                self.stats.matchings_emitted += 1;
                let cost = matching.cost(&self.original);
                self.finish_if_exhausted();
                return Ok(Some(RankedMatching { cost, matching }));
            }
            self.pending = None;

            if let Some(err) = self.failure.take() {
                self.finish();
                return Err(err);
            }

            match self.state {
                EnumeratorState::Init => self.initialize(),
                EnumeratorState::Running => self.execute_step(),
                EnumeratorState::Done => return Ok(None),
            }
        }
    }

    /// Adapter yielding matchings together with their costs.
    ///
    /// # Panics
    /// See [`Iterator::next`].
    pub fn ranked(self) -> Ranked<S, H> {
        Ranked { inner: self }
    }

    fn next_ranked(&mut self) -> Option<RankedMatching> {
        match self.try_next() {
            Ok(next) => next,
            Err(err) => {
                error!("Ranked enumeration aborted: {}", err);
                panic!("ranked enumeration aborted: {}", err);
            }
        }
    }

    fn initialize(&mut self) {
        debug_assert_eq!(self.state, EnumeratorState::Init);
        self.state = EnumeratorState::Running;

        match self.reducer.reduce(&self.original) {
            Ok(reduction) => {
                debug!(
                    "Root problem with n={} has optimal cost {}",
                    self.original.len(),
                    reduction.lower_bound
                );
                self.stats.subproblems_resolved += 1;
                self.frontier
                    .push(reduction.lower_bound, Subproblem::from(reduction));
                self.stats.max_frontier_len = 1;
            }
            Err(KBestError::Infeasible) => {
                debug!(
                    "Root problem with n={} admits no perfect matching",
                    self.original.len()
                );
                self.finish();
            }
            Err(err) => self.fail(err),
        }
    }

    /// Pops the cheapest subproblem, queues its matchings for emission and replaces it by its
    /// feasible children.
    fn execute_step(&mut self) {
        let (key, node) = match self.frontier.pop_min() {
            Some(entry) => entry,
            None => {
                self.finish();
                return;
            }
        };
        self.stats.subproblems_popped += 1;

        let admissible =
            AdmissibleEdges::from_reduced(&node.reduced, &node.matching, self.reducer.config());

        let ties = self.handler.expand(&admissible.edges(), &node.matching);
        self.pending = Some(ties.peekable());

        let n = node.reduced.len();
        let mut children = 0;
        for (split_row, child) in Partitioner::new(&node.reduced, &admissible).children() {
            match self.reducer.reduce(&child) {
                Ok(reduction) => {
                    self.stats.subproblems_resolved += 1;
                    // the reduced parent matrix is non-negative, so is the child's optimum
                    let cost = key.cost + reduction.lower_bound.max(0.0);
                    trace!(
                        "Child at row {} of node #{} (cost {}): cost {}",
                        split_row,
                        key.sequence,
                        key.cost,
                        cost
                    );
                    self.frontier.push(cost, Subproblem::from(reduction));
                    children += 1;
                }
                Err(KBestError::Infeasible) => {
                    trace!(
                        "Child at row {} of node #{} is infeasible",
                        split_row,
                        key.sequence
                    );
                }
                Err(err) => {
                    self.fail(err);
                    return;
                }
            }
        }

        self.stats.subproblems_pruned += n - children;
        self.stats.max_frontier_len = self.stats.max_frontier_len.max(self.frontier.len());

        trace!(
            "Popped node #{} (cost {}, bound {}): {} admissible, {} children, frontier {}",
            key.sequence,
            key.cost,
            node.lower_bound,
            admissible.len(),
            children,
            self.frontier.len()
        );
    }

    /// Drops the frontier and keeps `err` until the pending matchings are emitted
    fn fail(&mut self, err: KBestError) {
        debug!("Branching failed: {}", err);
        self.failure = Some(err);
        self.frontier = Frontier::default();
    }

    /// Enters `Done` if neither pending matchings nor subproblems remain
    fn finish_if_exhausted(&mut self) {
        let drained = self
            .pending
            .as_mut()
            .map_or(true, |ties| ties.peek().is_none());
        if drained && self.frontier.is_empty() && self.failure.is_none() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        if self.state != EnumeratorState::Done {
            debug!("Enumeration completed: {:?}", self.stats);
        }
        self.state = EnumeratorState::Done;
        self.frontier = Frontier::default();
    }
}

impl<S: AssignmentSolver, H: TieHandler> Iterator for KBestEnumerator<S, H> {
    type Item = Matching;

    /// # Panics
    /// If the solver returns duals that violate the configured degeneracy tolerance; use
    /// [`KBestEnumerator::try_next`] to handle this case as an error.
    fn next(&mut self) -> Option<Self::Item> {
        self.next_ranked().map(|r| r.matching)
    }
}

impl<S: AssignmentSolver, H: TieHandler> FusedIterator for KBestEnumerator<S, H> {}

/// Iterator returned by [`KBestEnumerator::ranked`]
pub struct Ranked<S, H: TieHandler> {
    inner: KBestEnumerator<S, H>,
}

impl<S, H: TieHandler> Ranked<S, H> {
    pub fn stats(&self) -> &EnumeratorStats {
        self.inner.stats()
    }
}

impl<S: AssignmentSolver, H: TieHandler> Iterator for Ranked<S, H> {
    type Item = RankedMatching;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_ranked()
    }
}

impl<S: AssignmentSolver, H: TieHandler> FusedIterator for Ranked<S, H> {}
