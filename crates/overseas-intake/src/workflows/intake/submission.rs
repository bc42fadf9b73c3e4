use serde::{Deserialize, Serialize};

use super::domain::IntakeRecord;

/// Outbound hand-off of a completed record (API client, queue, file drop...).
pub trait SubmissionSink: Send + Sync {
    fn hand_off(&self, record: &IntakeRecord) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Acknowledgement returned by the submission collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("submission transport unavailable: {0}")]
    Transport(String),
}
