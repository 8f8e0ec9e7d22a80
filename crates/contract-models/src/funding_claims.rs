use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a funding claim, as returned by the funding claims data API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingClaim {
    pub id: i32,
    pub ukprn: i32,
    pub title: String,
    pub funding_stream_period_code: String,
    pub version: i32,
    pub status: FundingClaimStatus,
    #[serde(default)]
    pub signature_close_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub signed_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub signed_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundingClaimStatus {
    Draft,
    AwaitingSignature,
    Signed,
    Withdrawn,
    Closed,
}

impl FundingClaimStatus {
    pub fn name(&self) -> &'static str {
        match self {
            FundingClaimStatus::Draft => "Draft",
            FundingClaimStatus::AwaitingSignature => "AwaitingSignature",
            FundingClaimStatus::Signed => "Signed",
            FundingClaimStatus::Withdrawn => "Withdrawn",
            FundingClaimStatus::Closed => "Closed",
        }
    }
}

impl std::fmt::Display for FundingClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Year-end reconciliation statement of a funding claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub id: i32,
    pub ukprn: i32,
    pub title: String,
    pub funding_claim_id: i32,
    pub status: ReconciliationStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconciliationStatus {
    Draft,
    Published,
    Withdrawn,
}

impl ReconciliationStatus {
    pub fn name(&self) -> &'static str {
        match self {
            ReconciliationStatus::Draft => "Draft",
            ReconciliationStatus::Published => "Published",
            ReconciliationStatus::Withdrawn => "Withdrawn",
        }
    }
}

impl std::fmt::Display for ReconciliationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
