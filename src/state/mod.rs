//! State module for tracking analysis jobs
//!
//! # Components
//!
//! - `JobState`: Lifecycle of a single analysis job (pending, analyzing, completed, failed)

mod job_state;

// Re-export main types
pub use job_state::JobState;
