#![allow(dead_code)]

use contract_models::{
    AuditEntry, Contract, ContractReminderItem, ContractReminders, FullSubcontractorDeclaration,
    FundingClaim, NotificationMessage, Reconciliation, Role, UserContact,
};
use contract_notifications::{
    AuditSink, Dispatcher, MessageSender, NotificationQueue, Notifier, Services, TaggedMessage,
};
use data_api::{
    ApiError, ContractsApi, DirectoryApiError, DirectoryClient, FundingClaimsApi,
    SubcontractorDeclarationsApi,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const UKPRN: i32 = 10001234;

/// Number of overdue contracts returned per request by `FakeContracts`.
pub const OVERDUE_PAGE_SIZE: usize = 2;

fn not_found(path: String) -> ApiError {
    ApiError::Status {
        method: "GET",
        path,
        status: reqwest::StatusCode::NOT_FOUND,
        body: String::new(),
    }
}

fn server_error(method: &'static str, path: String) -> ApiError {
    ApiError::Status {
        method,
        path,
        status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        body: "injected failure".to_string(),
    }
}

#[derive(Default)]
pub struct ContractsInner {
    pub contracts: Vec<Contract>,
    pub overdue: Vec<ContractReminderItem>,
    pub overdue_requests: usize,
    pub fail_mark_reminder: BTreeSet<i32>,
    pub reminded: Vec<i32>,
    pub prepared: Vec<i32>,
}

#[derive(Default, Clone)]
pub struct FakeContracts(pub Arc<Mutex<ContractsInner>>);

impl FakeContracts {
    pub async fn insert(&self, contract: Contract) {
        self.0.lock().await.contracts.push(contract);
    }
}

#[async_trait::async_trait]
impl ContractsApi for FakeContracts {
    async fn get_contract(&self, id: i32) -> Result<Contract, ApiError> {
        let inner = self.0.lock().await;
        inner
            .contracts
            .iter()
            .find(|contract| contract.id == id)
            .cloned()
            .ok_or_else(|| not_found(format!("api/contract/{id}")))
    }

    async fn get_contract_by_key(
        &self,
        contract_number: &str,
        contract_version: i32,
        ukprn: i32,
    ) -> Result<Contract, ApiError> {
        let inner = self.0.lock().await;
        inner
            .contracts
            .iter()
            .find(|contract| {
                contract.contract_number == contract_number
                    && contract.contract_version == contract_version
                    && contract.ukprn == ukprn
            })
            .cloned()
            .ok_or_else(|| not_found(format!("api/contract?contractNumber={contract_number}")))
    }

    // Like the data API, always serves the first page of contracts which
    // haven't been marked as reminded.
    async fn get_overdue_contracts(&self) -> Result<ContractReminders, ApiError> {
        let mut inner = self.0.lock().await;
        inner.overdue_requests += 1;

        Ok(ContractReminders {
            contracts: inner
                .overdue
                .iter()
                .take(OVERDUE_PAGE_SIZE)
                .cloned()
                .collect(),
        })
    }

    async fn mark_reminder_sent(&self, contract: &ContractReminderItem) -> Result<(), ApiError> {
        let mut inner = self.0.lock().await;
        if inner.fail_mark_reminder.contains(&contract.id) {
            return Err(server_error("PATCH", "api/contractReminder".to_string()));
        }
        inner.overdue.retain(|item| item.id != contract.id);
        inner.reminded.push(contract.id);
        Ok(())
    }

    async fn prepare_document_for_signing(&self, contract: &Contract) -> Result<(), ApiError> {
        self.0.lock().await.prepared.push(contract.id);
        Ok(())
    }
}

#[derive(Default)]
pub struct FundingClaimsInner {
    pub claims: Vec<FundingClaim>,
    pub latest_signed: BTreeMap<(i32, String), FundingClaim>,
    pub reconciliations: Vec<Reconciliation>,
}

#[derive(Default, Clone)]
pub struct FakeFundingClaims(pub Arc<Mutex<FundingClaimsInner>>);

#[async_trait::async_trait]
impl FundingClaimsApi for FakeFundingClaims {
    async fn get_funding_claim(&self, id: i32) -> Result<FundingClaim, ApiError> {
        let inner = self.0.lock().await;
        inner
            .claims
            .iter()
            .find(|claim| claim.id == id)
            .cloned()
            .ok_or_else(|| not_found(format!("api/fundingclaim/{id}")))
    }

    async fn get_latest_signed_funding_claim(
        &self,
        ukprn: i32,
        funding_stream_period_code: &str,
    ) -> Result<Option<FundingClaim>, ApiError> {
        let inner = self.0.lock().await;
        Ok(inner
            .latest_signed
            .get(&(ukprn, funding_stream_period_code.to_string()))
            .cloned())
    }

    async fn get_reconciliation(&self, id: i32) -> Result<Option<Reconciliation>, ApiError> {
        let inner = self.0.lock().await;
        Ok(inner.reconciliations.iter().find(|r| r.id == id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct FakeDeclarations(pub Arc<Mutex<Vec<FullSubcontractorDeclaration>>>);

#[async_trait::async_trait]
impl SubcontractorDeclarationsApi for FakeDeclarations {
    async fn get_full_subcontractor_declaration(
        &self,
        id: i32,
    ) -> Result<FullSubcontractorDeclaration, ApiError> {
        let inner = self.0.lock().await;
        inner
            .iter()
            .find(|declaration| declaration.id == id)
            .cloned()
            .ok_or_else(|| not_found(format!("api/subcontractordeclaration/full/{id}")))
    }
}

#[derive(Default)]
pub struct DirectoryInner {
    pub users: Vec<UserContact>,
    pub calls: Vec<(i32, Vec<Role>)>,
}

/// Returns the users holding any of the requested roles, and records each lookup.
#[derive(Default, Clone)]
pub struct FakeDirectory(pub Arc<Mutex<DirectoryInner>>);

impl FakeDirectory {
    pub async fn add_user(&self, email: &str, roles: &[Role]) {
        self.0.lock().await.users.push(UserContact {
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            roles: roles.iter().map(|role| role.name().to_string()).collect(),
        });
    }

    pub async fn calls(&self) -> Vec<(i32, Vec<Role>)> {
        self.0.lock().await.calls.clone()
    }
}

#[async_trait::async_trait]
impl DirectoryClient for FakeDirectory {
    async fn get_user_contacts(
        &self,
        ukprn: i32,
        roles: &[Role],
    ) -> Result<Vec<UserContact>, DirectoryApiError> {
        let mut inner = self.0.lock().await;
        inner.calls.push((ukprn, roles.to_vec()));

        Ok(inner
            .users
            .iter()
            .filter(|user| roles.iter().any(|role| user.has_role(*role)))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct QueueInner {
    pub sent: Vec<NotificationMessage>,
    pub fail: bool,
}

#[derive(Default, Clone)]
pub struct TestQueue(pub Arc<Mutex<QueueInner>>);

impl TestQueue {
    pub async fn take_sent(&self) -> Vec<NotificationMessage> {
        std::mem::take(&mut self.0.lock().await.sent)
    }

    pub async fn set_fail(&self, fail: bool) {
        self.0.lock().await.fail = fail;
    }
}

#[async_trait::async_trait]
impl NotificationQueue for TestQueue {
    async fn send(&self, notification: &NotificationMessage) -> anyhow::Result<()> {
        let mut inner = self.0.lock().await;
        if inner.fail {
            anyhow::bail!("queue is unavailable");
        }
        inner.sent.push(notification.clone());
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct TestAudit(pub Arc<Mutex<Vec<AuditEntry>>>);

impl TestAudit {
    pub async fn take_entries(&self) -> Vec<AuditEntry> {
        std::mem::take(&mut *self.0.lock().await)
    }

    pub async fn messages(&self) -> Vec<String> {
        self.take_entries()
            .await
            .into_iter()
            .map(|entry| entry.message)
            .collect()
    }
}

#[async_trait::async_trait]
impl AuditSink for TestAudit {
    async fn audit(&self, entry: &AuditEntry) -> anyhow::Result<()> {
        self.0.lock().await.push(entry.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct SenderInner {
    pub sent: Vec<TaggedMessage>,
    pub fail: bool,
}

#[derive(Default, Clone)]
pub struct TestSender(pub Arc<Mutex<SenderInner>>);

impl TestSender {
    pub async fn take_sent(&self) -> Vec<TaggedMessage> {
        std::mem::take(&mut self.0.lock().await.sent)
    }
}

#[async_trait::async_trait]
impl MessageSender for TestSender {
    async fn send(&self, message: TaggedMessage) -> anyhow::Result<()> {
        let mut inner = self.0.lock().await;
        if inner.fail {
            anyhow::bail!("message transport is unavailable");
        }
        inner.sent.push(message);
        Ok(())
    }
}

/// Harness wires processors to in-memory collaborators.
#[derive(Default, Clone)]
pub struct Harness {
    pub contracts: FakeContracts,
    pub funding_claims: FakeFundingClaims,
    pub declarations: FakeDeclarations,
    pub directory: FakeDirectory,
    pub queue: TestQueue,
    pub audit: TestAudit,
    pub sender: TestSender,
    pub config: BTreeMap<String, String>,
}

impl Harness {
    pub fn notifier(&self) -> Notifier {
        Notifier::new(
            Arc::new(self.directory.clone()),
            Arc::new(self.queue.clone()),
            Arc::new(self.audit.clone()),
        )
    }

    pub fn services(&self) -> Services {
        Services {
            contracts: Arc::new(self.contracts.clone()),
            funding_claims: Arc::new(self.funding_claims.clone()),
            subcontractor_declarations: Arc::new(self.declarations.clone()),
            config: Arc::new(self.config.clone()),
            notifier: self.notifier(),
        }
    }

    pub fn dispatcher(&self) -> Dispatcher {
        contract_notifications::dispatcher(&self.services())
    }
}

pub fn contract(id: i32, status: &str) -> Contract {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "contractNumber": format!("AEBP-{id:04}"),
        "contractVersion": 2,
        "ukprn": UKPRN,
        "title": "Adult education budget",
        "status": status,
        "fundingType": "Aebp",
    }))
    .unwrap()
}

pub fn funding_claim(id: i32, status: &str) -> FundingClaim {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "ukprn": UKPRN,
        "title": "ASB funding claim",
        "fundingStreamPeriodCode": "ASB2324",
        "version": 1,
        "status": status,
    }))
    .unwrap()
}

pub fn reminder_item(id: i32) -> ContractReminderItem {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "contractNumber": format!("AEBP-{id:04}"),
        "contractVersion": 1,
        "ukprn": UKPRN,
        "status": "PublishedToProvider",
    }))
    .unwrap()
}
