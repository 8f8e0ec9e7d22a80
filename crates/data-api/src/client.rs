use super::{ApiError, DataApiClient};

/// HttpDataApiClient issues requests to a data API rooted at `base_url`.
#[derive(Clone)]
pub struct HttpDataApiClient {
    // Base URL against which request paths are joined. Should end with '/'.
    base_url: url::Url,
    // HTTP client to use for REST requests.
    http_client: reqwest::Client,
    // Bearer token presented with every request, if any.
    bearer_token: Option<String>,
}

impl std::fmt::Debug for HttpDataApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpDataApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.bearer_token.is_some())
            .finish()
    }
}

impl HttpDataApiClient {
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

    fn request(
        &self,
        method: &'static str,
        path: &str,
        builder: impl FnOnce(url::Url) -> reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.base_url.join(path).map_err(|source| ApiError::Url {
            method,
            path: path.to_string(),
            source,
        })?;
        let mut builder = builder(url);
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    async fn execute(
        &self,
        method: &'static str,
        path: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<String, ApiError> {
        let transport = |source| ApiError::Transport {
            method,
            path: path.to_string(),
            source,
        };
        let request = builder.build().map_err(transport)?;
        tracing::debug!(url = %request.url(), method, "sending request");

        let response = self.http_client.execute(request).await.map_err(transport)?;
        let status = response.status();
        let body = response.text().await.map_err(transport)?;

        if status.is_success() {
            tracing::trace!(%status, body_len = body.len(), "got successful response");
            Ok(body)
        } else {
            Err(ApiError::Status {
                method,
                path: path.to_string(),
                status,
                body,
            })
        }
    }
}

#[async_trait::async_trait]
impl DataApiClient for HttpDataApiClient {
    async fn get(&self, path: &str) -> Result<String, ApiError> {
        let builder = self.request("GET", path, |url| self.http_client.get(url))?;
        self.execute("GET", path, builder).await
    }

    async fn patch(&self, path: &str, body: serde_json::Value) -> Result<(), ApiError> {
        let builder = self.request("PATCH", path, |url| self.http_client.patch(url).json(&body))?;
        let _ = self.execute("PATCH", path, builder).await?;
        Ok(())
    }
}
