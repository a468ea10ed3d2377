//! Configuration for B-tree construction.

use crate::common::{Error, Result};

/// Smallest minimum degree a B-tree accepts.
///
/// With `t = 2` every node holds between 1 and 3 items (a 2-3-4 tree).
/// Anything lower cannot keep non-root nodes non-empty after a split.
pub const MIN_DEGREE: usize = 2;

/// Minimum degree used by [`BTreeConfig::default`].
///
/// # Node Capacity
/// With `t = 6`:
/// - Max items per node: 2t - 1 = 11
/// - Min items per non-root node: t - 1 = 5
pub const DEFAULT_MIN_DEGREE: usize = 6;

const _: () = assert!(DEFAULT_MIN_DEGREE >= MIN_DEGREE);

/// Construction parameters for a [`BTree`](crate::index::btree::BTree).
///
/// # Example
/// ```
/// use mwtree::BTreeConfig;
///
/// let config = BTreeConfig::new(3);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.max_items(), 5);
/// assert_eq!(config.min_items(), 2);
///
/// assert!(BTreeConfig::new(1).validate().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTreeConfig {
    /// The minimum degree `t`.
    pub min_degree: usize,
}

impl BTreeConfig {
    /// Create a config with the given minimum degree. Not validated until
    /// [`validate`](Self::validate) or tree construction.
    pub fn new(min_degree: usize) -> Self {
        Self { min_degree }
    }

    /// Check that the minimum degree is at least [`MIN_DEGREE`].
    ///
    /// # Errors
    /// - `Error::InvalidMinDegree` if `min_degree < 2`
    pub fn validate(&self) -> Result<()> {
        if self.min_degree < MIN_DEGREE {
            log::debug!("rejecting B-tree config with min_degree {}", self.min_degree);
            return Err(Error::InvalidMinDegree {
                min_degree: self.min_degree,
            });
        }
        Ok(())
    }

    /// Maximum number of items any node may hold (`2t - 1`).
    #[inline]
    pub fn max_items(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Minimum number of items a non-root node must hold (`t - 1`).
    #[inline]
    pub fn min_items(&self) -> usize {
        self.min_degree - 1
    }
}

impl Default for BTreeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DEGREE)
    }
}
