use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of a contract, as returned by the contracts data API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: i32,
    pub contract_number: String,
    pub contract_version: i32,
    pub ukprn: i32,
    pub title: String,
    pub status: ContractStatus,
    #[serde(default)]
    pub amendment_type: ContractAmendmentType,
    #[serde(default)]
    pub funding_type: ContractFundingType,
    #[serde(default)]
    pub signed_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub signed_by_name: Option<String>,
}

impl Contract {
    /// Word used in notifications to describe this kind of document.
    pub fn document_type(&self) -> &'static str {
        self.funding_type.document_type()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractStatus {
    Draft,
    PublishedToProvider,
    WithdrawnByAgency,
    WithdrawnByProvider,
    ApprovedWaitingConfirmation,
    Approved,
    Replaced,
    Closed,
}

impl ContractStatus {
    pub fn name(&self) -> &'static str {
        match self {
            ContractStatus::Draft => "Draft",
            ContractStatus::PublishedToProvider => "PublishedToProvider",
            ContractStatus::WithdrawnByAgency => "WithdrawnByAgency",
            ContractStatus::WithdrawnByProvider => "WithdrawnByProvider",
            ContractStatus::ApprovedWaitingConfirmation => "ApprovedWaitingConfirmation",
            ContractStatus::Approved => "Approved",
            ContractStatus::Replaced => "Replaced",
            ContractStatus::Closed => "Closed",
        }
    }

    pub fn is_withdrawn(&self) -> bool {
        matches!(
            self,
            ContractStatus::WithdrawnByAgency | ContractStatus::WithdrawnByProvider
        )
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of amendment a contract version represents.
///
/// `Notfication` is spelled the way the upstream API spells it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractAmendmentType {
    #[default]
    None,
    Variation,
    Notfication,
}

impl ContractAmendmentType {
    pub fn name(&self) -> &'static str {
        match self {
            ContractAmendmentType::None => "None",
            ContractAmendmentType::Variation => "Variation",
            ContractAmendmentType::Notfication => "Notfication",
        }
    }
}

impl std::fmt::Display for ContractAmendmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractFundingType {
    #[default]
    Unknown,
    MainstreamFunding,
    Esf,
    Levy,
    NonLevy,
    Aebp,
    Eop,
    Advance,
}

impl ContractFundingType {
    pub fn name(&self) -> &'static str {
        match self {
            ContractFundingType::Unknown => "Unknown",
            ContractFundingType::MainstreamFunding => "MainstreamFunding",
            ContractFundingType::Esf => "Esf",
            ContractFundingType::Levy => "Levy",
            ContractFundingType::NonLevy => "NonLevy",
            ContractFundingType::Aebp => "Aebp",
            ContractFundingType::Eop => "Eop",
            ContractFundingType::Advance => "Advance",
        }
    }

    /// Levy-funded documents are agreements; everything else is a contract.
    pub fn document_type(&self) -> &'static str {
        match self {
            ContractFundingType::Levy => "agreement",
            _ => "contract",
        }
    }
}

impl std::fmt::Display for ContractFundingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One page of contracts which are overdue a signing reminder.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractReminders {
    #[serde(default)]
    pub contracts: Vec<ContractReminderItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractReminderItem {
    pub id: i32,
    pub contract_number: String,
    pub contract_version: i32,
    pub ukprn: i32,
    #[serde(default)]
    pub title: String,
    pub status: ContractStatus,
    #[serde(default)]
    pub amendment_type: ContractAmendmentType,
    #[serde(default)]
    pub funding_type: ContractFundingType,
}
