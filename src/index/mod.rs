//! Index structures.
//!
//! - [`btree`] - In-memory B-tree with configurable minimum degree

pub mod btree;
