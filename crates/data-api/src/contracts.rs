use super::{encode_query_value, get_json, patch_json, ApiError, SharedClient};
use contract_models::{Contract, ContractReminderItem, ContractReminders};

/// Operations of the contracts data API used by processors.
#[async_trait::async_trait]
pub trait ContractsApi: Send + Sync {
    async fn get_contract(&self, id: i32) -> Result<Contract, ApiError>;

    /// Fetch a contract by its natural key.
    async fn get_contract_by_key(
        &self,
        contract_number: &str,
        contract_version: i32,
        ukprn: i32,
    ) -> Result<Contract, ApiError>;

    /// Fetch the first page of contracts which are overdue a signing reminder.
    /// Contracts drop out of this set once marked via `mark_reminder_sent`.
    async fn get_overdue_contracts(&self) -> Result<ContractReminders, ApiError>;

    async fn mark_reminder_sent(&self, contract: &ContractReminderItem) -> Result<(), ApiError>;

    /// Ask the data API to prepare the contract's document for signing.
    async fn prepare_document_for_signing(&self, contract: &Contract) -> Result<(), ApiError>;
}

/// ContractsDataProvider implements ContractsApi over a DataApiClient.
#[derive(Clone)]
pub struct ContractsDataProvider {
    client: SharedClient,
    reminder_interval_days: u32,
    page_size: u32,
}

impl ContractsDataProvider {
    pub fn new(client: SharedClient, reminder_interval_days: u32, page_size: u32) -> Self {
        Self {
            client,
            reminder_interval_days,
            page_size,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ContractKeyRequest<'a> {
    id: i32,
    contract_number: &'a str,
    contract_version: i32,
}

#[async_trait::async_trait]
impl ContractsApi for ContractsDataProvider {
    async fn get_contract(&self, id: i32) -> Result<Contract, ApiError> {
        get_json(self.client.as_ref(), &format!("api/contract/{id}")).await
    }

    async fn get_contract_by_key(
        &self,
        contract_number: &str,
        contract_version: i32,
        ukprn: i32,
    ) -> Result<Contract, ApiError> {
        let path = format!(
            "api/contract?contractNumber={}&versionNumber={contract_version}&ukprn={ukprn}",
            encode_query_value(contract_number),
        );
        get_json(self.client.as_ref(), &path).await
    }

    async fn get_overdue_contracts(&self) -> Result<ContractReminders, ApiError> {
        // Always request the first page: contracts which have been reminded
        // no longer match, so the next page slides into first position.
        let path = format!(
            "api/contractReminders?reminderInterval={}&pageNumber=1&pageSize={}&sort=Asc&order=LastUpdatedAt",
            self.reminder_interval_days, self.page_size,
        );
        get_json(self.client.as_ref(), &path).await
    }

    async fn mark_reminder_sent(&self, contract: &ContractReminderItem) -> Result<(), ApiError> {
        let body = ContractKeyRequest {
            id: contract.id,
            contract_number: &contract.contract_number,
            contract_version: contract.contract_version,
        };
        patch_json(self.client.as_ref(), "api/contractReminder", &body).await
    }

    async fn prepare_document_for_signing(&self, contract: &Contract) -> Result<(), ApiError> {
        let body = ContractKeyRequest {
            id: contract.id,
            contract_number: &contract.contract_number,
            contract_version: contract.contract_version,
        };
        patch_json(
            self.client.as_ref(),
            "api/contract/prepareDocumentForSigning",
            &body,
        )
        .await
    }
}
