//! Ranked enumeration of the perfect matchings of a weighted complete bipartite graph.
//!
//! Given an `n` by `n` [`CostMatrix`] (infinite entries forbid an edge), a [`KBestEnumerator`]
//! lazily produces the perfect matchings in non-decreasing order of total cost. Each step solves
//! a handful of linear sum assignment problems ([`lsap`]), reduces them by their duals
//! ([`reduction`]) and splits the remaining solution space into disjoint children
//! ([`partition`]), which wait on a best-first [`frontier`].
//!
//! ```
//! use kbest::{enumerate_kbest, Matching};
//!
//! let best: Vec<Matching> = enumerate_kbest(&[[4.0, 1.0, 3.0], [2.0, 0.0, 5.0], [3.0, 2.0, 2.0]])
//!     .unwrap()
//!     .take(2)
//!     .collect();
//! assert_eq!(best[0], Matching::from_columns(&[1, 0, 2]));
//! ```

pub mod config;
pub mod enumerator;
pub mod error;
pub mod frontier;
pub mod io;
pub mod lsap;
pub mod matrix;
pub mod naive;
pub mod partition;
pub mod random_models;
pub mod reduction;
pub mod ties;

#[cfg(feature = "logging")]
pub mod log;

pub use config::EnumeratorConfig;
pub use enumerator::{enumerate_kbest, EnumeratorState, EnumeratorStats, KBestEnumerator};
pub use error::{KBestError, Result};
pub use matrix::{Cost, CostMatrix, Matching, RankedMatching};
pub use ties::{AllTies, Representative, TieHandler};
