/// Job state definitions for tracking analysis progress
///
/// The same states are used by the in-memory pool and by stored URL records.
use crate::analyzer::AnalysisResult;
use std::fmt;

/// Represents the current state of an analysis job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    // ===== Active States =====
    /// Job is recorded but has not started yet
    Pending,

    /// Job is currently fetching or analyzing the page
    Analyzing,

    // ===== Terminal States =====
    /// Analysis produced a result with a status code (possibly with a caveat)
    Completed,

    /// Analysis could not reach the page at all
    Failed,
}

impl JobState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if this is an active state (job may still be processed)
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Pending | Self::Analyzing)
    }

    /// Returns true if the transition from `self` to `next` is allowed
    ///
    /// Terminal states may restart as `Pending` or `Analyzing` so stored URLs
    /// can be analyzed again.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        match (self, next) {
            (Self::Pending, Self::Analyzing) => true,
            (Self::Pending, Self::Failed) => true,
            (Self::Analyzing, Self::Completed | Self::Failed) => true,
            (Self::Completed | Self::Failed, Self::Pending | Self::Analyzing) => true,
            _ => false,
        }
    }

    /// Derives the terminal state for a finished analysis
    ///
    /// A populated error message with a status code means "completed with a
    /// caveat"; an error message without any status code is a full failure.
    pub fn for_result(result: &AnalysisResult) -> Self {
        if result.error_message.is_some() && result.status_code == 0 {
            Self::Failed
        } else {
            Self::Completed
        }
    }

    /// Converts the job state to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Analyzing => "analyzing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses a job state from a database string representation
    ///
    /// Returns None if the string doesn't match any known state.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "analyzing" => Some(Self::Analyzing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible job states
    pub fn all_states() -> Vec<Self> {
        vec![Self::Pending, Self::Analyzing, Self::Completed, Self::Failed]
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
