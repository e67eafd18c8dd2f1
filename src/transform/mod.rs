//! Consolidation module.
//!
//! This module handles the flat-to-consolidated transformation:
//! - Plan: grouping and merge specification
//! - Consolidator: one output row per test condition
//! - Pipeline: load, consolidate, export in one call

pub mod consolidator;
pub mod pipeline;
pub mod plan;

pub use consolidator::{consolidate, missing_columns, GroupKey};
pub use pipeline::*;
pub use plan::*;
