//! Common types and utilities shared across mwtree.
//!
//! This module contains:
//! - Configuration constants and [`BTreeConfig`]
//! - Error types

pub mod config;
pub mod error;

pub use config::{BTreeConfig, DEFAULT_MIN_DEGREE, MIN_DEGREE};
pub use error::{Error, Result};
