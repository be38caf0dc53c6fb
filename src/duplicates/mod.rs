//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Head hash comparison (Phase 2)
//! - Full hash comparison (Phase 3)
//! - Duplicate group management

pub mod finder;
pub mod groups;

pub use finder::{group_by_size, try_group_by_size, DuplicateFinder, FinderConfig};
pub use groups::{DuplicateGroup, HeadGroup, SizeGroup};
