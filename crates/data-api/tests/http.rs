use axum::{
    extract::RawQuery,
    http::{HeaderMap, StatusCode},
    routing::{get, patch},
    Json, Router,
};
use contract_models::{ContractStatus, Role};
use data_api::{
    ApiError, ContractsApi, ContractsDataProvider, DirectoryClient, FundingClaimsApi,
    FundingClaimsDataProvider, HttpDataApiClient, HttpDirectoryClient,
};
use std::sync::Arc;

async fn serve(router: Router) -> url::Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });
    url::Url::parse(&format!("http://{addr}/")).unwrap()
}

fn data_client(base_url: url::Url) -> Arc<HttpDataApiClient> {
    Arc::new(HttpDataApiClient::new(
        base_url,
        reqwest::Client::new(),
        Some("data-token".to_string()),
    ))
}

#[tokio::test]
async fn test_get_contract_and_reminders() {
    let router = Router::new()
        .route(
            "/api/contract/12",
            get(|headers: HeaderMap| async move {
                assert_eq!(headers["authorization"], "Bearer data-token");
                Json(serde_json::json!({
                    "id": 12,
                    "contractNumber": "AEBP-1234",
                    "contractVersion": 2,
                    "ukprn": 10001234,
                    "title": "Adult education budget",
                    "status": "PublishedToProvider",
                    "amendmentType": "Variation",
                    "fundingType": "Aebp",
                }))
            }),
        )
        .route(
            "/api/contractReminders",
            get(|RawQuery(query): RawQuery| async move {
                assert_eq!(
                    query.as_deref(),
                    Some("reminderInterval=14&pageNumber=1&pageSize=50&sort=Asc&order=LastUpdatedAt")
                );
                Json(serde_json::json!({ "contracts": [] }))
            }),
        );
    let provider = ContractsDataProvider::new(data_client(serve(router).await), 14, 50);

    let contract = provider.get_contract(12).await.unwrap();
    assert_eq!(contract.contract_number, "AEBP-1234");
    assert_eq!(contract.status, ContractStatus::PublishedToProvider);
    assert_eq!(contract.document_type(), "contract");

    let reminders = provider.get_overdue_contracts().await.unwrap();
    assert!(reminders.contracts.is_empty());
}

#[tokio::test]
async fn test_contract_by_natural_key_is_query_encoded() {
    let router = Router::new().route(
        "/api/contract",
        get(|RawQuery(query): RawQuery| async move {
            assert_eq!(
                query.as_deref(),
                Some("contractNumber=ESF+0001%2FA&versionNumber=3&ukprn=10001234")
            );
            Json(serde_json::json!({
                "id": 40,
                "contractNumber": "ESF 0001/A",
                "contractVersion": 3,
                "ukprn": 10001234,
                "title": "ESF contract",
                "status": "Approved",
            }))
        }),
    );
    let provider = ContractsDataProvider::new(data_client(serve(router).await), 14, 50);

    let contract = provider
        .get_contract_by_key("ESF 0001/A", 3, 10001234)
        .await
        .unwrap();
    assert_eq!(contract.id, 40);
}

#[tokio::test]
async fn test_not_found_and_failure_statuses() {
    let router = Router::new()
        .route(
            "/api/fundingclaim/latestsigned",
            get(|| async { (StatusCode::NOT_FOUND, "no signed claim") }),
        )
        .route(
            "/api/fundingclaim/9",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route(
            "/api/reconciliation/3",
            get(|| async {
                Json(serde_json::json!({
                    "id": 3,
                    "ukprn": 10001234,
                    "title": "2324 reconciliation",
                    "fundingClaimId": 9,
                    "status": "Published",
                }))
            }),
        );
    let provider = FundingClaimsDataProvider::new(data_client(serve(router).await));

    let latest = provider
        .get_latest_signed_funding_claim(10001234, "ASB2324")
        .await
        .unwrap();
    assert_eq!(latest, None);

    let err = provider.get_funding_claim(9).await.unwrap_err();
    assert_eq!(err.status(), Some(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
    assert!(matches!(err, ApiError::Status { .. }));
    assert_eq!(
        err.to_string(),
        "GET api/fundingclaim/9: 500 Internal Server Error: boom"
    );

    let reconciliation = provider.get_reconciliation(3).await.unwrap().unwrap();
    assert_eq!(reconciliation.funding_claim_id, 9);
}

#[tokio::test]
async fn test_mark_reminder_sent_patches_contract_key() {
    let router = Router::new().route(
        "/api/contractReminder",
        patch(|Json(body): Json<serde_json::Value>| async move {
            if body
                == serde_json::json!({"id": 5, "contractNumber": "LEVY-5", "contractVersion": 1})
            {
                StatusCode::NO_CONTENT
            } else {
                StatusCode::BAD_REQUEST
            }
        }),
    );
    let provider = ContractsDataProvider::new(data_client(serve(router).await), 14, 50);

    let item: contract_models::ContractReminderItem = serde_json::from_value(serde_json::json!({
        "id": 5,
        "contractNumber": "LEVY-5",
        "contractVersion": 1,
        "ukprn": 10001234,
        "status": "PublishedToProvider",
    }))
    .unwrap();

    provider.mark_reminder_sent(&item).await.unwrap();
}

#[tokio::test]
async fn test_directory_lookup_passes_roles_in_order() {
    let router = Router::new().route(
        "/api/organisations/10001234/users",
        get(|RawQuery(query): RawQuery| async move {
            assert_eq!(
                query.as_deref(),
                Some("roles=ViewContractsAndAgreements&roles=SignContractsAndAgreements")
            );
            Json(serde_json::json!({
                "users": [
                    {
                        "email": "signer@provider.test",
                        "firstName": "Sam",
                        "lastName": "Signer",
                        "roles": ["SignContractsAndAgreements"],
                    }
                ]
            }))
        }),
    );
    let directory = HttpDirectoryClient::new(serve(router).await, reqwest::Client::new(), None);

    let users = directory
        .get_user_contacts(
            10001234,
            &[
                Role::ViewContractsAndAgreements,
                Role::SignContractsAndAgreements,
            ],
        )
        .await
        .unwrap();

    assert_eq!(users.len(), 1);
    assert!(users[0].has_role(Role::SignContractsAndAgreements));
}

#[tokio::test]
async fn test_directory_failure_is_an_error() {
    let router = Router::new().route(
        "/api/organisations/10001234/users",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
    );
    let directory = HttpDirectoryClient::new(serve(router).await, reqwest::Client::new(), None);

    let err = directory
        .get_user_contacts(10001234, &[Role::SignContractsAndAgreements])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        data_api::DirectoryApiError::Status { ukprn: 10001234, .. }
    ));
}
