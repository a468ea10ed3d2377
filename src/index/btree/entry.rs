//! Key-value entry stored in B-tree nodes.

/// A key-value pair. The key is fixed once the entry exists; the value can
/// be read and replaced in place.
///
/// Entries are moved (never cloned) between nodes during splits, merges and
/// borrows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    key: K,
    value: V,
}

impl<K, V> Entry<K, V> {
    /// Create a new entry.
    #[inline]
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Replace the value, returning the old one.
    #[inline]
    pub fn replace_value(&mut self, value: V) -> V {
        std::mem::replace(&mut self.value, value)
    }

    /// Consume the entry, returning its parts.
    #[inline]
    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}
