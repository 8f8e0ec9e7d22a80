//! Clients of the upstream data APIs (contracts, funding claims,
//! subcontractor declarations) and of the organisation user directory.
//!
//! Each domain is exposed as an object-safe trait (`ContractsApi`,
//! `FundingClaimsApi`, ...) with an HTTP-backed provider implementation, so
//! that processors can be exercised against in-memory fakes.

use std::sync::Arc;

mod client;
pub mod contracts;
pub mod directory;
pub mod funding_claims;
pub mod subcontractor_declarations;

pub use client::HttpDataApiClient;
pub use contracts::{ContractsApi, ContractsDataProvider};
pub use directory::{DirectoryApiError, DirectoryClient, HttpDirectoryClient};
pub use funding_claims::{FundingClaimsApi, FundingClaimsDataProvider};
pub use subcontractor_declarations::{
    SubcontractorDeclarationsApi, SubcontractorDeclarationsDataProvider,
};

/// Error of a data API request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{method} {path}: {status}: {body}")]
    Status {
        method: &'static str,
        path: String,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{method} {path}: request failed")]
    Transport {
        method: &'static str,
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {path}: invalid request URL")]
    Url {
        method: &'static str,
        path: String,
        #[source]
        source: url::ParseError,
    },
    #[error("{method} {path}: decoding response body")]
    Decode {
        method: &'static str,
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{method} {path}: encoding request body")]
    Encode {
        method: &'static str,
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// HTTP status of a non-success response, if that's what this error is.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// DataApiClient performs authenticated requests against a data API.
/// Non-success statuses are returned as `ApiError::Status`.
#[async_trait::async_trait]
pub trait DataApiClient: Send + Sync {
    /// GET `path` (relative to the API base URL) and return the raw body.
    async fn get(&self, path: &str) -> Result<String, ApiError>;

    /// PATCH `path` with a JSON `body`.
    async fn patch(&self, path: &str, body: serde_json::Value) -> Result<(), ApiError>;
}

/// GET `path` and decode its JSON body as `T`.
pub async fn get_json<T>(client: &dyn DataApiClient, path: &str) -> Result<T, ApiError>
where
    T: serde::de::DeserializeOwned,
{
    let body = client.get(path).await?;
    serde_json::from_str(&body).map_err(|source| ApiError::Decode {
        method: "GET",
        path: path.to_string(),
        source,
    })
}

/// Like `get_json`, but maps a 404 Not Found into `None`.
pub async fn get_json_optional<T>(
    client: &dyn DataApiClient,
    path: &str,
) -> Result<Option<T>, ApiError>
where
    T: serde::de::DeserializeOwned,
{
    match get_json(client, path).await {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.status() == Some(reqwest::StatusCode::NOT_FOUND) => {
            tracing::debug!(%path, "data API returned not found");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// PATCH `path` with `body` encoded as JSON.
pub async fn patch_json<B>(client: &dyn DataApiClient, path: &str, body: &B) -> Result<(), ApiError>
where
    B: serde::Serialize + ?Sized,
{
    let body = serde_json::to_value(body).map_err(|source| ApiError::Encode {
        method: "PATCH",
        path: path.to_string(),
        source,
    })?;
    client.patch(path, body).await
}

/// Shared handle to a DataApiClient.
pub type SharedClient = Arc<dyn DataApiClient>;

/// Percent-encode a value for use within a query string.
pub(crate) fn encode_query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
