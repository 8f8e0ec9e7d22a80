use contract_models::{Role, UserContact};

/// Error of a user directory lookup.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryApiError {
    #[error("directory lookup for organisation {ukprn} failed: {status}: {body}")]
    Status {
        ukprn: i32,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("directory lookup for organisation {ukprn} failed")]
    Transport {
        ukprn: i32,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid directory URL")]
    Url(#[from] url::ParseError),
}

/// DirectoryClient resolves the users of an organisation who hold any of
/// the given roles.
#[async_trait::async_trait]
pub trait DirectoryClient: Send + Sync {
    async fn get_user_contacts(
        &self,
        ukprn: i32,
        roles: &[Role],
    ) -> Result<Vec<UserContact>, DirectoryApiError>;
}

#[derive(Clone)]
pub struct HttpDirectoryClient {
    base_url: url::Url,
    http_client: reqwest::Client,
    bearer_token: Option<String>,
}

impl HttpDirectoryClient {
    pub fn new(
        base_url: url::Url,
        http_client: reqwest::Client,
        bearer_token: Option<String>,
    ) -> Self {
        Self {
            base_url,
            http_client,
            bearer_token,
        }
    }
}

impl std::fmt::Debug for HttpDirectoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDirectoryClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.bearer_token.is_some())
            .finish()
    }
}

#[derive(serde::Deserialize)]
struct UsersResponse {
    #[serde(default)]
    users: Vec<UserContact>,
}

#[async_trait::async_trait]
impl DirectoryClient for HttpDirectoryClient {
    #[tracing::instrument(skip(self), err)]
    async fn get_user_contacts(
        &self,
        ukprn: i32,
        roles: &[Role],
    ) -> Result<Vec<UserContact>, DirectoryApiError> {
        let url = self
            .base_url
            .join(&format!("api/organisations/{ukprn}/users"))?;
        let query: Vec<(&str, &str)> = roles.iter().map(|role| ("roles", role.name())).collect();

        let mut builder = self.http_client.get(url).query(&query);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let transport = |source| DirectoryApiError::Transport { ukprn, source };
        let response = builder.send().await.map_err(transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.map_err(transport)?;
            return Err(DirectoryApiError::Status {
                ukprn,
                status,
                body,
            });
        }
        let UsersResponse { users } = response.json().await.map_err(transport)?;

        tracing::debug!(users = users.len(), "resolved organisation users");
        Ok(users)
    }
}
