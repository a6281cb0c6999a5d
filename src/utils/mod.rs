//! Utility modules for CFCS scoring
//!
//! Contains shared functionality used across pipeline stages:
//! - Columns: prefix-based role classification and key validation
//! - Stats: pairwise Pearson correlation and rounding
//! - LazyFrame helpers: row partitioning and numeric extraction

pub mod columns;
pub mod stats;
pub mod lazy_helpers;

// Re-export commonly used types
pub use columns::{ColumnRoles, CLIMATE_PREFIX, FUTURES_PREFIX};
pub use stats::{pearson_pairwise, round_to};
pub use lazy_helpers::{partition_rows, numeric_values, Partitions};
