//! Picsweep - a terminal-based media triage library
//!
//! This crate provides the core functionality for the Picsweep application:
//! swiping through a media library one item at a time, marking items for
//! deletion, and committing the batch to the system trash.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod deletion;
pub mod domain;
pub mod error;
pub mod persist;
pub mod tui;

// Re-export primary types for convenience
pub use catalog::{CatalogReader, FsCatalog, Locator, MediaFilter, MediaItem};
pub use config::UserConfig;
pub use deletion::{DeleteOutcome, DeletionAuthority, DeletionCoordinator};
pub use domain::{Decision, SessionState, TriageEngine};
pub use error::{Result, SweepError};
pub use persist::{PersistenceBridge, SessionSnapshot};
