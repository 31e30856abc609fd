//! Measurement pass: size estimation per target and the scan orchestrator.

mod orchestrator;
mod size;

pub use orchestrator::{ScanItem, ScanOrchestrator};
pub use size::{
    multi_profile_cache, pattern_match, plain_directory, system_trash, SizeEstimator,
    PROFILE_CACHE_DIR,
};
