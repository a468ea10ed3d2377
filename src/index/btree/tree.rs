//! The B-tree entry point.

use std::borrow::Borrow;
use std::fmt::{self, Debug};
use std::mem;

use super::entry::Entry;
use super::node::{Node, Restructure};
use super::stats::TreeStats;
use crate::common::{BTreeConfig, Error, Result};

/// An ordered map backed by a B-tree of minimum degree `t`.
///
/// # Structure
/// ```text
/// ┌──────────────────────────────────────────────┐
/// │ BTree                                        │
/// │   root ──▶ Node [ 40 ]                       │
/// │              /        \                      │
/// │     Node [ 10 20 ]   Node [ 50 60 70 ]       │
/// │   min_degree, len, stats                     │
/// └──────────────────────────────────────────────┘
/// ```
///
/// The tree owns the root; each node owns its children. The root is the
/// only node allowed to hold fewer than `t - 1` items, and it is swapped
/// out wholesale when the tree grows (root split) or shrinks (root emptied
/// by a merge).
///
/// # Thread Safety
/// All mutation takes `&mut self`. For shared access across threads, wrap
/// the tree in a [`SharedBTree`](super::SharedBTree).
///
/// # Example
/// ```
/// use mwtree::BTree;
///
/// let mut tree = BTree::new(2).unwrap();
/// tree.insert(10, "ten");
/// tree.insert(20, "twenty");
///
/// assert_eq!(tree.get(&10), Some(&"ten"));
/// assert!(tree.update(&20, "TWENTY"));
/// assert!(tree.delete(&10));
/// assert!(!tree.delete(&10));
/// assert_eq!(tree.len(), 1);
/// ```
#[derive(Debug)]
pub struct BTree<K, V> {
    /// Root node; a leaf while the tree fits in one node.
    root: Node<K, V>,

    /// Minimum degree `t`, validated at construction.
    min_degree: usize,

    /// Number of entries.
    len: usize,

    /// Structural and lookup counters.
    stats: TreeStats,
}

impl<K: Ord, V> BTree<K, V> {
    /// Create an empty tree with minimum degree `min_degree`.
    ///
    /// # Errors
    /// - `Error::InvalidMinDegree` if `min_degree < 2`
    pub fn new(min_degree: usize) -> Result<Self> {
        Self::with_config(BTreeConfig::new(min_degree))
    }

    /// Create an empty tree from a [`BTreeConfig`].
    ///
    /// # Errors
    /// - `Error::InvalidMinDegree` if `config.min_degree < 2`
    pub fn with_config(config: BTreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: BTreeConfig) -> Self {
        Self {
            root: Node::new(config.min_degree, true),
            min_degree: config.min_degree,
            len: 0,
            stats: TreeStats::new(),
        }
    }

    // ========================================================================
    // Public API: Lookups
    // ========================================================================

    /// Find `key`, returning the stored key and value.
    ///
    /// The key may be any borrowed form of `K`.
    pub fn search<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let found = self.root.search(key).map(|(node, idx)| {
            let entry = &node.items[idx];
            (entry.key(), entry.value())
        });
        self.stats.record_lookup(found.is_some());
        found
    }

    /// Return the value stored under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).map(|(_, value)| value)
    }

    /// Return a mutable reference to the value stored under `key`.
    ///
    /// Counts as a lookup in [`TreeStats`], like [`get`](Self::get).
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let found = self.root.search_mut(key).map(Entry::value_mut);
        self.stats.record_lookup(found.is_some());
        found
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.search(key).is_some()
    }

    // ========================================================================
    // Public API: Mutation
    // ========================================================================

    /// Insert `value` under `key`.
    ///
    /// If the key is already present its value is replaced in place and the
    /// old value returned; the tree shape is left untouched.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(entry) = self.root.search_mut(&key) {
            return Some(entry.replace_value(value));
        }

        self.insert_new(Entry::new(key, value));
        None
    }

    /// Insert `value` under `key`, refusing to overwrite an existing entry.
    ///
    /// # Errors
    /// - `Error::DuplicateKey` if `key` is already present (tree unchanged)
    pub fn try_insert(&mut self, key: K, value: V) -> Result<()> {
        if self.root.search(&key).is_some() {
            return Err(Error::DuplicateKey);
        }

        self.insert_new(Entry::new(key, value));
        Ok(())
    }

    /// Overwrite the value under `key`.
    ///
    /// Returns `false` without touching the tree if the key is absent.
    /// Counts as a lookup in [`TreeStats`].
    pub fn update<Q>(&mut self, key: &Q, value: V) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let found = match self.root.search_mut(key) {
            Some(entry) => {
                entry.replace_value(value);
                true
            }
            None => false,
        };
        self.stats.record_lookup(found);
        found
    }

    /// Remove `key`, returning its value if it was present.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut changes = Restructure::default();
        let removed = self.root.remove(key, &mut changes);
        self.stats.record_restructure(&changes);

        // A merge of the root's last two children leaves it empty with a
        // single child, which becomes the new root.
        if self.root.items.is_empty() && !self.root.is_leaf() {
            if let Some(child) = self.root.children.pop() {
                self.root = child;
                self.stats.record_root_collapse();
                log::debug!("root collapsed, tree height now {}", self.height());
            }
        }

        removed.map(|entry| {
            self.len -= 1;
            entry.into_parts().1
        })
    }

    /// Remove `key`, returning whether it was present.
    pub fn delete<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove(key).is_some()
    }

    /// Remove every entry, leaving a single empty leaf root.
    pub fn clear(&mut self) {
        self.root = Node::new(self.min_degree, true);
        self.len = 0;
    }

    /// Insert an entry whose key is known to be absent.
    ///
    /// A full root is split first: the old root becomes the only child of a
    /// fresh internal root, which is the single place the tree grows taller.
    fn insert_new(&mut self, entry: Entry<K, V>) {
        let mut changes = Restructure::default();
        if self.root.is_full() {
            let old_root = mem::replace(&mut self.root, Node::new(self.min_degree, false));
            self.root.children.push(old_root);
            self.root.split_child(0, &mut changes);
            self.stats.record_root_split();
            log::debug!("root split, tree height now {}", self.height());

            let idx = if entry.key() > self.root.items[0].key() {
                1
            } else {
                0
            };
            self.root.children[idx].insert(entry, &mut changes);
        } else {
            self.root.insert(entry, &mut changes);
        }
        self.stats.record_restructure(&changes);

        self.len += 1;
    }
}

impl<K, V> BTree<K, V> {
    #[cfg(test)]
    pub(super) fn root(&self) -> &Node<K, V> {
        &self.root
    }

    /// The minimum degree `t` this tree was built with.
    #[inline]
    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Number of entries in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of levels; an empty tree or a lone root leaf has height 1.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    /// Structural and lookup counters for this tree.
    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }
}

impl<K: Ord, V> Default for BTree<K, V> {
    /// An empty tree with [`DEFAULT_MIN_DEGREE`](crate::common::DEFAULT_MIN_DEGREE).
    fn default() -> Self {
        Self::from_valid_config(BTreeConfig::default())
    }
}

/// Indented dump of node keys, one node per line, children below parents.
impl<K: Debug, V> fmt::Display for BTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt_depth(f, 0)
    }
}
