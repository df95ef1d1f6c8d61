use serde::{Deserialize, Serialize};

use super::domain::{SubmissionId, SubmissionStatus};

/// Staff decision on a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub const fn target(self) -> SubmissionStatus {
        match self {
            ReviewDecision::Approved => SubmissionStatus::Approved,
            ReviewDecision::Rejected => SubmissionStatus::Rejected,
        }
    }
}

/// Which status transitions a review may perform.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewPolicy {
    /// Any status may be set from any other, including re-review.
    #[default]
    Open,
    /// Only `pending -> approved | rejected`.
    SinglePass,
}

impl ReviewPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "single-pass" | "single_pass" | "one-shot" => Some(Self::SinglePass),
            _ => None,
        }
    }

    pub fn transition(
        self,
        current: SubmissionStatus,
        decision: ReviewDecision,
    ) -> Result<SubmissionStatus, ReviewError> {
        match (self, current) {
            (ReviewPolicy::Open, _) | (ReviewPolicy::SinglePass, SubmissionStatus::Pending) => {
                Ok(decision.target())
            }
            (ReviewPolicy::SinglePass, reviewed) => Err(ReviewError::AlreadyReviewed {
                current: reviewed,
                requested: decision.target(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReviewError {
    #[error("submission already {}; cannot change it to {}", .current.label(), .requested.label())]
    AlreadyReviewed {
        current: SubmissionStatus,
        requested: SubmissionStatus,
    },
}

/// Store acknowledgement of an applied decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAck {
    pub id: SubmissionId,
    pub previous: SubmissionStatus,
    pub status: SubmissionStatus,
}
