//! Cleaning: per-method deletion strategies and the sequential clean orchestrator.
//!
//! This module provides:
//! - Emptying of cache directories while keeping the directory itself
//! - Pattern-based file deletion and trash emptying
//! - Before/after measurement of what a run reclaimed

mod executor;
mod orchestrator;

pub use executor::{
    delete_pattern_matches, empty_directory, empty_multi_profile_cache, empty_system_trash,
    CleanStatus, Cleaner,
};
pub use orchestrator::{CleanOrchestrator, CleanOutcome, CleanResult, CleanSummary};
