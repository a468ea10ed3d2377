//! Error types for mwtree.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All errors a B-tree can report to its caller.
///
/// Missing keys are not errors: lookups, updates and deletes of an absent
/// key report that through `Option` or `bool` results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The minimum degree is below 2.
    ///
    /// Raised only at construction; the tree is never built.
    #[error("invalid minimum degree {min_degree}: must be at least 2")]
    InvalidMinDegree { min_degree: usize },

    /// `try_insert` found the key already present.
    #[error("key already present in tree")]
    DuplicateKey,
}
