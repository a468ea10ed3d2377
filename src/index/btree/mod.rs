//! In-memory B-tree index.
//!
//! # Components
//! - [`BTree`] - The ordered map: owns the root, grows and shrinks the tree
//! - `node` - Recursive node with split, merge, borrow and descent logic
//! - `entry` - Key-value pair stored in nodes
//! - [`TreeStats`] - Structural and lookup counters
//! - [`SharedBTree`] - `RwLock`-guarded handle for multi-threaded use

mod entry;
mod node;
mod shared;
mod stats;
mod tree;


pub use shared::SharedBTree;
pub use stats::{StatsSnapshot, TreeStats};
pub use tree::BTree;
