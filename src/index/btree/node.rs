//! B-tree node and the structural algorithms that run on it.
//!
//! A node owns its entries and its children directly. Every algorithm here
//! works top-down: insertion splits full children before descending into
//! them, deletion tops up thin children before descending into them, so no
//! operation ever has to walk back up the tree.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt::{self, Debug};
use std::mem;

use super::entry::Entry;

/// Structural changes made while one operation ran.
///
/// Nodes only count; the tree folds the totals into its statistics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct Restructure {
    pub(super) splits: u64,
    pub(super) merges: u64,
    pub(super) borrows: u64,
}

/// A node of a B-tree with minimum degree `t`.
///
/// # Layout
/// ```text
///              items:    [ k0 | k1 | k2 ]
///  children: [ c0 ]  [ c1 ]  [ c2 ]  [ c3 ]
///
///  keys(c0) < k0 < keys(c1) < k1 < keys(c2) < k2 < keys(c3)
/// ```
///
/// A leaf has no children. An internal node with `k` items has `k + 1`
/// children. Non-root nodes hold between `t - 1` and `2t - 1` items.
pub(super) struct Node<K, V> {
    /// Entries, strictly ascending by key.
    pub(super) items: Vec<Entry<K, V>>,

    /// Child subtrees; empty for leaves.
    pub(super) children: Vec<Node<K, V>>,

    /// Fixed at creation. An internal node may be momentarily childless
    /// while a split or a new root is being assembled.
    pub(super) leaf: bool,

    /// The tree's minimum degree `t`.
    pub(super) min_degree: usize,
}

impl<K, V> Node<K, V> {
    /// Create an empty node.
    pub(super) fn new(min_degree: usize, leaf: bool) -> Self {
        let children = if leaf {
            Vec::new()
        } else {
            Vec::with_capacity(2 * min_degree)
        };

        Self {
            items: Vec::with_capacity(2 * min_degree - 1),
            children,
            leaf,
            min_degree,
        }
    }

    #[inline]
    pub(super) fn is_leaf(&self) -> bool {
        self.leaf
    }

    #[inline]
    pub(super) fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the node holds the maximum `2t - 1` items.
    #[inline]
    pub(super) fn is_full(&self) -> bool {
        self.items.len() == 2 * self.min_degree - 1
    }

    /// Number of levels from this node down to its leaves (a leaf is 1).
    pub(super) fn height(&self) -> usize {
        let mut height = 1;
        let mut node = self;
        while let Some(child) = node.children.first() {
            height += 1;
            node = child;
        }
        height
    }

    /// The entry that precedes `items[idx]`: the last entry of the
    /// rightmost leaf under `children[idx]`.
    ///
    /// Panics if this node is a leaf.
    pub(super) fn predecessor(&self, idx: usize) -> &Entry<K, V> {
        let mut node = &self.children[idx];
        while !node.leaf {
            node = &node.children[node.children.len() - 1];
        }
        &node.items[node.items.len() - 1]
    }

    /// The entry that follows `items[idx]`: the first entry of the leftmost
    /// leaf under `children[idx + 1]`.
    ///
    /// Panics if this node is a leaf.
    pub(super) fn successor(&self, idx: usize) -> &Entry<K, V> {
        let mut node = &self.children[idx + 1];
        while !node.leaf {
            node = &node.children[0];
        }
        &node.items[0]
    }

    /// Promote the median of the full child `children[i]` into this node.
    ///
    /// ```text
    /// before:   self [ .. a .. ]           after:  self [ .. m a .. ]
    ///                     |                              /   \
    ///       child [ x0 .. m .. y0 ..]           child [x0..]  z [y0..]
    /// ```
    ///
    /// The child keeps its first `t - 1` items (and `t` children), the new
    /// sibling `z` takes the `t - 1` items after the median (and the last
    /// `t` children) and lands at `children[i + 1]`.
    pub(super) fn split_child(&mut self, i: usize, changes: &mut Restructure) {
        let t = self.min_degree;
        let child = &mut self.children[i];
        debug_assert!(child.is_full(), "split_child on a non-full child");

        let mut sibling = Node::new(t, child.leaf);
        sibling.items = child.items.split_off(t);
        let median = child.items.remove(t - 1);
        if !child.leaf {
            sibling.children = child.children.split_off(t);
        }

        self.items.insert(i, median);
        self.children.insert(i + 1, sibling);

        changes.splits += 1;
        log::trace!("split child {} of node with {} items", i, self.items.len());
    }

    /// Fold `items[idx]` and `children[idx + 1]` into `children[idx]`.
    ///
    /// Both children hold `t - 1` items, so the result holds exactly
    /// `2t - 1`.
    pub(super) fn merge_children(&mut self, idx: usize, changes: &mut Restructure) {
        let right = self.children.remove(idx + 1);
        let separator = self.items.remove(idx);

        let left = &mut self.children[idx];
        left.items.push(separator);
        left.items.extend(right.items);
        left.children.extend(right.children);
        debug_assert!(left.items.len() <= 2 * self.min_degree - 1);

        changes.merges += 1;
        log::trace!("merged children {} and {}", idx, idx + 1);
    }

    /// Rotate the last entry of `children[idx - 1]` through `items[idx - 1]`
    /// into the front of `children[idx]`.
    pub(super) fn borrow_from_prev(&mut self, idx: usize, changes: &mut Restructure) {
        let (left, right) = self.children.split_at_mut(idx);
        let sibling = &mut left[idx - 1];
        let child = &mut right[0];

        let donated = sibling.items.pop().expect("donor sibling holds t items");
        let separator = mem::replace(&mut self.items[idx - 1], donated);
        child.items.insert(0, separator);

        if !child.leaf {
            let moved = sibling.children.pop().expect("internal donor has children");
            child.children.insert(0, moved);
        }

        changes.borrows += 1;
        log::trace!("child {} borrowed from its previous sibling", idx);
    }

    /// Rotate the first entry of `children[idx + 1]` through `items[idx]`
    /// onto the end of `children[idx]`.
    pub(super) fn borrow_from_next(&mut self, idx: usize, changes: &mut Restructure) {
        let (left, right) = self.children.split_at_mut(idx + 1);
        let child = &mut left[idx];
        let sibling = &mut right[0];

        let donated = sibling.items.remove(0);
        let separator = mem::replace(&mut self.items[idx], donated);
        child.items.push(separator);

        if !child.leaf {
            child.children.push(sibling.children.remove(0));
        }

        changes.borrows += 1;
        log::trace!("child {} borrowed from its next sibling", idx);
    }

    /// Make sure `children[idx]` holds at least `t` items before descending.
    ///
    /// Tries the previous sibling, then the next sibling, then merges. The
    /// merge goes with the next sibling unless `idx` is the last child.
    /// Returns the index the target subtree now lives at.
    fn fill_child(&mut self, idx: usize, changes: &mut Restructure) -> usize {
        let t = self.min_degree;

        if idx > 0 && self.children[idx - 1].len() >= t {
            self.borrow_from_prev(idx, changes);
            idx
        } else if idx < self.items.len() && self.children[idx + 1].len() >= t {
            self.borrow_from_next(idx, changes);
            idx
        } else if idx < self.items.len() {
            self.merge_children(idx, changes);
            idx
        } else {
            self.merge_children(idx - 1, changes);
            idx - 1
        }
    }

    /// Descend to the child at `idx`, topping it up first if it is thin.
    fn prepare_descent(&mut self, idx: usize, changes: &mut Restructure) -> usize {
        if self.children[idx].len() < self.min_degree {
            self.fill_child(idx, changes)
        } else {
            idx
        }
    }

    /// Remove and return the largest entry of this subtree.
    fn remove_max(&mut self, changes: &mut Restructure) -> Option<Entry<K, V>> {
        if self.leaf {
            return self.items.pop();
        }

        let idx = self.prepare_descent(self.items.len(), changes);
        self.children[idx].remove_max(changes)
    }

    /// Remove and return the smallest entry of this subtree.
    fn remove_min(&mut self, changes: &mut Restructure) -> Option<Entry<K, V>> {
        if self.leaf {
            if self.items.is_empty() {
                return None;
            }
            return Some(self.items.remove(0));
        }

        let idx = self.prepare_descent(0, changes);
        self.children[idx].remove_min(changes)
    }
}

impl<K: Ord, V> Node<K, V> {
    /// First index whose key is `>= key`, and whether it is an exact match.
    fn find_index<Q>(&self, key: &Q) -> (usize, bool)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        for (i, item) in self.items.iter().enumerate() {
            match item.key().borrow().cmp(key) {
                Ordering::Less => continue,
                Ordering::Equal => return (i, true),
                Ordering::Greater => return (i, false),
            }
        }
        (self.items.len(), false)
    }

    /// First index whose key is `> key`.
    fn upper_bound(&self, key: &K) -> usize {
        self.items
            .iter()
            .position(|item| item.key() > key)
            .unwrap_or(self.items.len())
    }

    /// Locate `key` in this subtree, returning the owning node and the
    /// entry's index in it.
    pub(super) fn search<Q>(&self, key: &Q) -> Option<(&Node<K, V>, usize)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (idx, found) = self.find_index(key);
        if found {
            Some((self, idx))
        } else if self.leaf {
            None
        } else {
            self.children[idx].search(key)
        }
    }

    /// Mutable counterpart of [`search`](Self::search), returning the entry.
    pub(super) fn search_mut<Q>(&mut self, key: &Q) -> Option<&mut Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (idx, found) = self.find_index(key);
        if found {
            Some(&mut self.items[idx])
        } else if self.leaf {
            None
        } else {
            self.children[idx].search_mut(key)
        }
    }

    /// Insert into a node that is not full.
    ///
    /// Full children met on the way down are split before descending, so
    /// the recursion never lands on a full node. The key must not already
    /// be present in the subtree.
    pub(super) fn insert(&mut self, entry: Entry<K, V>, changes: &mut Restructure) {
        debug_assert!(!self.is_full(), "insert into a full node");

        let mut idx = self.upper_bound(entry.key());
        if self.leaf {
            self.items.insert(idx, entry);
            return;
        }

        if self.children[idx].is_full() {
            self.split_child(idx, changes);
            if entry.key() > self.items[idx].key() {
                idx += 1;
            }
        }
        self.children[idx].insert(entry, changes);
    }

    /// Remove `key` from this subtree, returning its entry if it was present.
    ///
    /// Every child descended into holds at least `t` items by the time the
    /// recursion reaches it, so a removal at any level leaves at least
    /// `t - 1` behind.
    pub(super) fn remove<Q>(&mut self, key: &Q, changes: &mut Restructure) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (idx, found) = self.find_index(key);

        if found {
            if self.leaf {
                return Some(self.items.remove(idx));
            }
            return self.remove_from_internal(idx, key, changes);
        }

        if self.leaf {
            return None;
        }

        let idx = self.prepare_descent(idx, changes);
        self.children[idx].remove(key, changes)
    }

    /// Remove `items[idx]` (whose key is `key`) from an internal node.
    fn remove_from_internal<Q>(
        &mut self,
        idx: usize,
        key: &Q,
        changes: &mut Restructure,
    ) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let t = self.min_degree;

        if self.children[idx].len() >= t {
            debug_assert!(self.predecessor(idx).key() < self.items[idx].key());
            self.children[idx]
                .remove_max(changes)
                .map(|pred| mem::replace(&mut self.items[idx], pred))
        } else if self.children[idx + 1].len() >= t {
            debug_assert!(self.successor(idx).key() > self.items[idx].key());
            self.children[idx + 1]
                .remove_min(changes)
                .map(|succ| mem::replace(&mut self.items[idx], succ))
        } else {
            self.merge_children(idx, changes);
            self.children[idx].remove(key, changes)
        }
    }
}

impl<K: Debug, V> Node<K, V> {
    pub(super) fn fmt_depth(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let keys: Vec<&K> = self.items.iter().map(Entry::key).collect();
        writeln!(f, "{}{:?}", "  ".repeat(depth), keys)?;
        for child in &self.children {
            child.fmt_depth(f, depth + 1)?;
        }
        Ok(())
    }
}

impl<K: Debug, V: Debug> Debug for Node<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("items", &self.items)
            .field("children", &self.children)
            .field("leaf", &self.leaf)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(t: usize, keys: &[i32]) -> Node<i32, i32> {
        let mut node = Node::new(t, true);
        node.items = keys.iter().map(|&k| Entry::new(k, k * 10)).collect();
        node
    }

    fn internal(t: usize, keys: &[i32], children: Vec<Node<i32, i32>>) -> Node<i32, i32> {
        assert_eq!(children.len(), keys.len() + 1);
        let mut node = Node::new(t, false);
        node.items = keys.iter().map(|&k| Entry::new(k, k * 10)).collect();
        node.children = children;
        node
    }

    fn keys(node: &Node<i32, i32>) -> Vec<i32> {
        node.items.iter().map(|e| *e.key()).collect()
    }

    #[test]
    fn test_node_init() {
        let leaf_node: Node<i32, i32> = Node::new(2, true);
        assert!(leaf_node.is_leaf());
        assert_eq!(leaf_node.len(), 0);
        assert!(leaf_node.children.is_empty());
        assert_eq!(leaf_node.min_degree, 2);

        let internal_node: Node<i32, i32> = Node::new(3, false);
        assert!(!internal_node.is_leaf());
        assert_eq!(internal_node.len(), 0);
        assert_eq!(internal_node.min_degree, 3);
    }

    #[test]
    fn test_leaf_insert_keeps_order() {
        let mut changes = Restructure::default();
        let mut node = Node::new(3, true);

        for k in [30, 10, 50, 20, 40] {
            node.insert(Entry::new(k, k), &mut changes);
        }

        assert_eq!(keys(&node), vec![10, 20, 30, 40, 50]);
        assert!(node.is_full());
        assert_eq!(changes.splits, 0);
    }

    #[test]
    fn test_split_leaf_child() {
        let mut changes = Restructure::default();
        let mut parent = internal(2, &[], vec![leaf(2, &[5, 10, 20])]);

        parent.split_child(0, &mut changes);

        assert_eq!(keys(&parent), vec![10]);
        assert_eq!(parent.children.len(), 2);
        assert_eq!(keys(&parent.children[0]), vec![5]);
        assert_eq!(keys(&parent.children[1]), vec![20]);
        assert!(parent.children[1].is_leaf());
        assert_eq!(changes.splits, 1);
    }

    #[test]
    fn test_split_internal_child_moves_children() {
        let mut changes = Restructure::default();
        let full = internal(
            2,
            &[20, 40, 60],
            vec![leaf(2, &[10]), leaf(2, &[30]), leaf(2, &[50]), leaf(2, &[70])],
        );
        let mut parent = internal(2, &[], vec![full]);

        parent.split_child(0, &mut changes);

        assert_eq!(keys(&parent), vec![40]);
        let left = &parent.children[0];
        let right = &parent.children[1];
        assert!(!right.is_leaf());
        assert_eq!(keys(left), vec![20]);
        assert_eq!(keys(right), vec![60]);
        assert_eq!(left.children.len(), 2);
        assert_eq!(right.children.len(), 2);
        assert_eq!(keys(&left.children[1]), vec![30]);
        assert_eq!(keys(&right.children[0]), vec![50]);
    }

    #[test]
    fn test_insert_splits_full_child_on_the_way_down() {
        let mut changes = Restructure::default();
        let mut root = internal(2, &[10], vec![leaf(2, &[5]), leaf(2, &[15, 20, 25])]);

        root.insert(Entry::new(30, 300), &mut changes);

        assert_eq!(keys(&root), vec![10, 20]);
        assert_eq!(keys(&root.children[1]), vec![15]);
        assert_eq!(keys(&root.children[2]), vec![25, 30]);
        assert_eq!(changes.splits, 1);
    }

    #[test]
    fn test_leaf_delete() {
        let mut changes = Restructure::default();
        let mut node = leaf(3, &[10, 20, 30, 40]);

        assert_eq!(node.remove(&20, &mut changes).map(|e| *e.key()), Some(20));
        assert_eq!(keys(&node), vec![10, 30, 40]);

        assert!(node.remove(&40, &mut changes).is_some());
        assert_eq!(keys(&node), vec![10, 30]);

        assert!(node.remove(&15, &mut changes).is_none());
        assert_eq!(keys(&node), vec![10, 30]);
    }

    #[test]
    fn test_delete_internal_uses_predecessor() {
        let mut changes = Restructure::default();
        let mut root = internal(2, &[20], vec![leaf(2, &[10, 15]), leaf(2, &[30])]);

        let removed = root.remove(&20, &mut changes).unwrap();

        assert_eq!(removed.into_parts(), (20, 200));
        assert_eq!(keys(&root), vec![15]);
        assert_eq!(keys(&root.children[0]), vec![10]);
        assert_eq!(keys(&root.children[1]), vec![30]);
    }

    #[test]
    fn test_delete_internal_uses_successor() {
        let mut changes = Restructure::default();
        let mut root = internal(2, &[20], vec![leaf(2, &[10]), leaf(2, &[30, 35])]);

        assert!(root.remove(&20, &mut changes).is_some());

        assert_eq!(keys(&root), vec![30]);
        assert_eq!(keys(&root.children[0]), vec![10]);
        assert_eq!(keys(&root.children[1]), vec![35]);
    }

    #[test]
    fn test_delete_internal_merges_thin_children() {
        let mut changes = Restructure::default();
        let mut root = internal(2, &[20], vec![leaf(2, &[10]), leaf(2, &[30])]);

        assert!(root.remove(&20, &mut changes).is_some());

        assert!(root.items.is_empty());
        assert_eq!(root.children.len(), 1);
        assert_eq!(keys(&root.children[0]), vec![10, 30]);
        assert_eq!(changes.merges, 1);
    }

    #[test]
    fn test_descent_borrows_from_prev() {
        let mut changes = Restructure::default();
        let mut root = internal(2, &[20], vec![leaf(2, &[5, 10]), leaf(2, &[30])]);

        assert!(root.remove(&30, &mut changes).is_some());

        assert_eq!(keys(&root), vec![10]);
        assert_eq!(keys(&root.children[0]), vec![5]);
        assert_eq!(keys(&root.children[1]), vec![20]);
        assert_eq!(changes.borrows, 1);
    }

    #[test]
    fn test_descent_borrows_from_next() {
        let mut changes = Restructure::default();
        let mut root = internal(2, &[20], vec![leaf(2, &[10]), leaf(2, &[30, 40])]);

        assert!(root.remove(&10, &mut changes).is_some());

        assert_eq!(keys(&root), vec![30]);
        assert_eq!(keys(&root.children[0]), vec![20]);
        assert_eq!(keys(&root.children[1]), vec![40]);
    }

    #[test]
    fn test_borrow_moves_child_pointer() {
        let mut changes = Restructure::default();
        let left = internal(
            2,
            &[10, 20],
            vec![leaf(2, &[5]), leaf(2, &[15]), leaf(2, &[25])],
        );
        let right = internal(2, &[40], vec![leaf(2, &[35]), leaf(2, &[45])]);
        let mut root = internal(2, &[30], vec![left, right]);

        root.borrow_from_prev(1, &mut changes);

        assert_eq!(keys(&root), vec![20]);
        assert_eq!(keys(&root.children[0]), vec![10]);
        assert_eq!(root.children[0].children.len(), 2);
        assert_eq!(keys(&root.children[1]), vec![30, 40]);
        assert_eq!(root.children[1].children.len(), 3);
        assert_eq!(keys(&root.children[1].children[0]), vec![25]);
    }

    #[test]
    fn test_merge_prefers_next_sibling() {
        let mut changes = Restructure::default();
        let mut root = internal(
            2,
            &[20, 40],
            vec![leaf(2, &[10]), leaf(2, &[30]), leaf(2, &[50])],
        );

        assert!(root.remove(&30, &mut changes).is_some());

        assert_eq!(keys(&root), vec![20]);
        assert_eq!(keys(&root.children[0]), vec![10]);
        assert_eq!(keys(&root.children[1]), vec![40, 50]);
    }

    #[test]
    fn test_merge_last_child_with_prev_sibling() {
        let mut changes = Restructure::default();
        let mut root = internal(
            2,
            &[20, 40],
            vec![leaf(2, &[10]), leaf(2, &[30]), leaf(2, &[50])],
        );

        assert!(root.remove(&50, &mut changes).is_some());

        assert_eq!(keys(&root), vec![20]);
        assert_eq!(keys(&root.children[0]), vec![10]);
        assert_eq!(keys(&root.children[1]), vec![30, 40]);
    }

    #[test]
    fn test_missing_key_in_internal_node() {
        let mut changes = Restructure::default();
        let mut root = internal(2, &[20], vec![leaf(2, &[10, 15]), leaf(2, &[30, 35])]);

        assert!(root.remove(&25, &mut changes).is_none());
        assert!(root.search(&25).is_none());
    }

    #[test]
    fn test_predecessor_and_successor() {
        let left = internal(2, &[10], vec![leaf(2, &[5]), leaf(2, &[12, 15])]);
        let right = internal(2, &[40], vec![leaf(2, &[25, 30]), leaf(2, &[45])]);
        let root = internal(2, &[20], vec![left, right]);

        assert_eq!(*root.predecessor(0).key(), 15);
        assert_eq!(*root.successor(0).key(), 25);
        assert_eq!(root.height(), 3);
    }

    #[test]
    fn test_search_and_search_mut() {
        let mut root = internal(2, &[20], vec![leaf(2, &[10]), leaf(2, &[30])]);

        let (node, idx) = root.search(&30).unwrap();
        assert_eq!(*node.items[idx].value(), 300);

        *root.search_mut(&10).unwrap().value_mut() = 7;
        assert_eq!(*root.children[0].items[0].value(), 7);

        assert!(root.search(&11).is_none());
        assert!(root.search_mut(&11).is_none());
    }
}
