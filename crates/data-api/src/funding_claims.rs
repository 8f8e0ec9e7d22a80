use super::{encode_query_value, get_json, get_json_optional, ApiError, SharedClient};
use contract_models::{FundingClaim, Reconciliation};

/// Operations of the funding claims data API used by processors.
#[async_trait::async_trait]
pub trait FundingClaimsApi: Send + Sync {
    async fn get_funding_claim(&self, id: i32) -> Result<FundingClaim, ApiError>;

    /// Latest signed funding claim of the organisation for a funding stream
    /// period, or None if none was ever signed.
    async fn get_latest_signed_funding_claim(
        &self,
        ukprn: i32,
        funding_stream_period_code: &str,
    ) -> Result<Option<FundingClaim>, ApiError>;

    async fn get_reconciliation(&self, id: i32) -> Result<Option<Reconciliation>, ApiError>;
}

#[derive(Clone)]
pub struct FundingClaimsDataProvider {
    client: SharedClient,
}

impl FundingClaimsDataProvider {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl FundingClaimsApi for FundingClaimsDataProvider {
    async fn get_funding_claim(&self, id: i32) -> Result<FundingClaim, ApiError> {
        get_json(self.client.as_ref(), &format!("api/fundingclaim/{id}")).await
    }

    async fn get_latest_signed_funding_claim(
        &self,
        ukprn: i32,
        funding_stream_period_code: &str,
    ) -> Result<Option<FundingClaim>, ApiError> {
        let path = format!(
            "api/fundingclaim/latestsigned?ukprn={ukprn}&fundingStreamPeriodCode={}",
            encode_query_value(funding_stream_period_code),
        );
        get_json_optional(self.client.as_ref(), &path).await
    }

    async fn get_reconciliation(&self, id: i32) -> Result<Option<Reconciliation>, ApiError> {
        get_json_optional(self.client.as_ref(), &format!("api/reconciliation/{id}")).await
    }
}
