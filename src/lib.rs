//! Cache Sweeper - find and reclaim disk space held by application caches
//!
//! This crate provides functionality for:
//! - A fixed, configurable registry of cache locations
//! - Cancellable size estimation and cleaning of those locations
//! - A JSON event stream for driving runs from a host application

pub mod cancel;
pub mod cleaner;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod scanner;
pub mod shell;
pub mod targets;
pub mod trash;

// Re-export commonly used types
pub use cancel::CancellationToken;
pub use config::Config;
pub use engine::Engine;
pub use error::{Cancelled, ConfigError, Result, SweeperError};
pub use events::{EngineEvent, Request};
pub use targets::{Registry, SafetyClass, Target};
