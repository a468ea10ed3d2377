//! Thread-safe handle around a [`BTree`].
//!
//! The tree itself has no internal synchronization. `SharedBTree` layers a
//! single-writer/multiple-reader lock on top: lookups take the read lock,
//! mutations take the write lock, and each call holds it for the whole
//! operation so a half-done split or merge is never visible.

use std::borrow::Borrow;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::stats::StatsSnapshot;
use super::BTree;
use crate::common::{BTreeConfig, Result};

/// A cloneable, `Send + Sync` handle to a B-tree behind an `RwLock`.
///
/// # Thread Safety
/// - Lookups (`get`, `contains_key`, `len`, ...): shared read lock
/// - Mutations (`insert`, `update`, `remove`, ...): exclusive write lock
///
/// # Example
/// ```
/// use mwtree::SharedBTree;
/// use std::thread;
///
/// let tree = SharedBTree::new(4).unwrap();
/// let writer = tree.clone();
///
/// thread::spawn(move || {
///     writer.insert(1, "one");
/// })
/// .join()
/// .unwrap();
///
/// assert_eq!(tree.get(&1), Some("one"));
/// ```
pub struct SharedBTree<K, V> {
    inner: Arc<RwLock<BTree<K, V>>>,
}

impl<K: Ord, V> SharedBTree<K, V> {
    /// Create an empty shared tree with minimum degree `min_degree`.
    ///
    /// # Errors
    /// - `Error::InvalidMinDegree` if `min_degree < 2`
    pub fn new(min_degree: usize) -> Result<Self> {
        Ok(Self::from_tree(BTree::new(min_degree)?))
    }

    /// Create an empty shared tree from a [`BTreeConfig`].
    pub fn with_config(config: BTreeConfig) -> Result<Self> {
        Ok(Self::from_tree(BTree::with_config(config)?))
    }

    /// Wrap an existing tree.
    pub fn from_tree(tree: BTree<K, V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Return a clone of the value under `key`.
    ///
    /// The read lock is released before returning, so the value is copied
    /// out. Use [`read`](Self::read) to borrow in place instead.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        V: Clone,
    {
        self.inner.read().get(key).cloned()
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.read().contains_key(key)
    }

    /// See [`BTree::insert`].
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.write().insert(key, value)
    }

    /// See [`BTree::try_insert`].
    pub fn try_insert(&self, key: K, value: V) -> Result<()> {
        self.inner.write().try_insert(key, value)
    }

    /// See [`BTree::update`].
    pub fn update<Q>(&self, key: &Q, value: V) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.write().update(key, value)
    }

    /// See [`BTree::remove`].
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.write().remove(key)
    }

    /// See [`BTree::delete`].
    pub fn delete<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.write().delete(key)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

impl<K, V> SharedBTree<K, V> {
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn height(&self) -> usize {
        self.inner.read().height()
    }

    /// Snapshot of the tree's counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.inner.read().stats().snapshot()
    }

    /// Acquire the read lock for several lookups under one guard.
    pub fn read(&self) -> RwLockReadGuard<'_, BTree<K, V>> {
        self.inner.read()
    }

    /// Acquire the write lock for several mutations under one guard.
    pub fn write(&self) -> RwLockWriteGuard<'_, BTree<K, V>> {
        self.inner.write()
    }
}

impl<K, V> Clone for SharedBTree<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Ord, V> Default for SharedBTree<K, V> {
    fn default() -> Self {
        Self::from_tree(BTree::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;
    use std::thread;

    #[test]
    fn test_shared_basic() {
        let tree = SharedBTree::new(2).unwrap();

        assert_eq!(tree.insert(1, 10), None);
        assert_eq!(tree.insert(1, 11), Some(10));
        assert_eq!(tree.try_insert(1, 12), Err(Error::DuplicateKey));
        assert_eq!(tree.get(&1), Some(11));
        assert!(tree.update(&1, 12));
        assert!(tree.contains_key(&1));
        assert_eq!(tree.remove(&1), Some(12));
        assert!(!tree.delete(&1));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_shared_invalid_degree() {
        assert!(SharedBTree::<i32, i32>::new(1).is_err());
        assert!(SharedBTree::<i32, i32>::with_config(BTreeConfig::new(0)).is_err());
    }

    #[test]
    fn test_shared_clone_sees_same_tree() {
        let tree = SharedBTree::new(3).unwrap();
        let other = tree.clone();

        tree.insert("k", 1);
        assert_eq!(other.get("k"), Some(1));
        assert_eq!(other.len(), 1);
    }

    #[test]
    fn test_shared_guards() {
        let tree = SharedBTree::default();
        {
            let mut guard = tree.write();
            for k in 0..100 {
                guard.insert(k, k);
            }
        }

        let guard = tree.read();
        assert_eq!(guard.len(), 100);
        assert_eq!(guard.get(&42), Some(&42));
    }

    #[test]
    fn test_shared_concurrent_writers() {
        let tree = SharedBTree::new(2).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let tree = tree.clone();
                thread::spawn(move || {
                    for k in 0..250 {
                        tree.insert(i * 1000 + k, k);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(tree.len(), 1000);
        for i in 0..4 {
            assert_eq!(tree.get(&(i * 1000 + 249)), Some(249));
        }
        assert!(tree.stats().root_splits > 0);
    }
}
