use super::{get_json, ApiError, SharedClient};
use contract_models::FullSubcontractorDeclaration;

#[async_trait::async_trait]
pub trait SubcontractorDeclarationsApi: Send + Sync {
    async fn get_full_subcontractor_declaration(
        &self,
        id: i32,
    ) -> Result<FullSubcontractorDeclaration, ApiError>;
}

#[derive(Clone)]
pub struct SubcontractorDeclarationsDataProvider {
    client: SharedClient,
}

impl SubcontractorDeclarationsDataProvider {
    pub fn new(client: SharedClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl SubcontractorDeclarationsApi for SubcontractorDeclarationsDataProvider {
    async fn get_full_subcontractor_declaration(
        &self,
        id: i32,
    ) -> Result<FullSubcontractorDeclaration, ApiError> {
        get_json(
            self.client.as_ref(),
            &format!("api/subcontractordeclaration/full/{id}"),
        )
        .await
    }
}
