//! mwtree - An in-memory ordered map backed by a B-tree.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            mwtree                               │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        SharedBTree (index/btree/shared.rs)               │   │
//! │  │     Arc<RwLock<BTree>>: many readers or one writer       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              BTree (index/btree/tree.rs)                 │   │
//! │  │  config validation, root split (grow), root collapse     │   │
//! │  │  (shrink), search / update delegation, TreeStats         │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Node (index/btree/node.rs)                  │   │
//! │  │  insert + split_child, remove + merge / borrow,          │   │
//! │  │  predecessor / successor, recursive descent              │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (config, Error)
//! - [`index`] - Index structures (B-tree)
//!
//! # Quick Start
//! ```
//! use mwtree::BTree;
//!
//! // Every non-root node holds between t-1 and 2t-1 entries
//! let mut tree = BTree::new(3).unwrap();
//!
//! for k in 0..100 {
//!     tree.insert(k, k * k);
//! }
//!
//! assert_eq!(tree.get(&9), Some(&81));
//! assert!(tree.delete(&9));
//! assert_eq!(tree.get(&9), None);
//! ```

pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_MIN_DEGREE, MIN_DEGREE};
pub use common::{BTreeConfig, Error, Result};

pub use index::btree::{BTree, SharedBTree, StatsSnapshot, TreeStats};
