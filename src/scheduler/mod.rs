//! Scheduler module for bounded analysis execution
//!
//! This module handles:
//! - Limiting the number of analyses running at once
//! - Tracking each submitted job through its lifecycle
//! - Pool-wide cancellation
//! - Writing status transitions and results to an injected storage backend

mod pool;

pub use pool::{AnalysisPool, JobId, SharedStorage};
