use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A subcontractor declaration including its submission details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullSubcontractorDeclaration {
    pub id: i32,
    pub ukprn: i32,
    pub period: String,
    pub submission_status: SubmissionStatus,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub submitted_by_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    NotSubmitted,
    Submitted,
}

impl SubmissionStatus {
    pub fn name(&self) -> &'static str {
        match self {
            SubmissionStatus::NotSubmitted => "NotSubmitted",
            SubmissionStatus::Submitted => "Submitted",
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
