//! Generators for random cost matrices, used for cross-validation and benchmarking.

pub mod uniform;

pub use uniform::{generate_integral, generate_uniform, generate_with_forbidden};
