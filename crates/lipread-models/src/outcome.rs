//! Result of processing one transcription task.

use serde::{Deserialize, Serialize};

/// Terminal result for exactly one task.
///
/// A worker produces exactly one `Outcome` per claimed task and writes it
/// into the task's result sink. Callers that stop waiting (timeout) never
/// see a second delivery; the late value is simply discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Inference finished and produced a transcription.
    Success { transcription: String },

    /// Inference failed; `error` is a human-readable description.
    Failure { error: String },
}

impl Outcome {
    /// Create a success outcome.
    pub fn success(transcription: impl Into<String>) -> Self {
        Outcome::Success {
            transcription: transcription.into(),
        }
    }

    /// Create a failure outcome.
    pub fn failure(error: impl Into<String>) -> Self {
        Outcome::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    /// The transcription text, if this outcome is a success.
    pub fn transcription(&self) -> Option<&str> {
        match self {
            Outcome::Success { transcription } => Some(transcription),
            Outcome::Failure { .. } => None,
        }
    }
}
