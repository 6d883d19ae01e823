//! REST client for the Generative Language video endpoints.
//!
//! Wraps the long-running predict call, operation polling and the
//! authenticated file download using [`reqwest`].

use std::time::Duration;

use clipstudio_core::request::GenerationRequest;

use crate::backend::VideoGenerationBackend;
use crate::error::{classify_http_failure, GenerationError};
use crate::operation::{Operation, PredictRequest};

/// Public API root.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Video model used when none is configured.
pub const DEFAULT_MODEL: &str = "veo-3.0-generate-001";

/// Default per-request timeout. Downloads of finished clips dominate.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client bound to one API key and model.
pub struct VeoApi {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: String,
}

impl VeoApi {
    /// Create a client with its own connection pool.
    ///
    /// * `api_base` - API root, e.g. [`DEFAULT_API_BASE`].
    /// * `model`    - model id, e.g. [`DEFAULT_MODEL`].
    pub fn new(
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, api_base, model, api_key))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_base: impl Into<String>,
        model: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn predict_url(&self) -> String {
        format!("{}/models/{}:predictLongRunning", self.api_base, self.model)
    }

    fn operation_url(&self, name: &str) -> String {
        format!("{}/{}", self.api_base, name.trim_start_matches('/'))
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code, classifying the body
    /// into a [`GenerationError`] otherwise.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(classify_http_failure(status, &body));
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into an [`Operation`].
    async fn parse_operation(response: reqwest::Response) -> Result<Operation, GenerationError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<Operation>().await?)
    }
}

#[async_trait::async_trait]
impl VideoGenerationBackend for VeoApi {
    async fn submit(&self, request: &GenerationRequest) -> Result<Operation, GenerationError> {
        tracing::debug!(
            model = %self.model,
            aspect_ratio = %request.aspect_ratio(),
            generate_audio = request.generate_audio(),
            has_image = request.image().is_some(),
            "Submitting generation request",
        );

        let response = self
            .client
            .post(self.predict_url())
            .header(API_KEY_HEADER, self.api_key.as_str())
            .json(&PredictRequest::from_request(request))
            .send()
            .await?;

        Self::parse_operation(response).await
    }

    async fn get_operation(&self, name: &str) -> Result<Operation, GenerationError> {
        let response = self
            .client
            .get(self.operation_url(name))
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .await?;

        Self::parse_operation(response).await
    }

    /// The file URI is only accessible with the key as a `key` query
    /// parameter.
    async fn download(&self, uri: &str) -> Result<Vec<u8>, GenerationError> {
        let response = self
            .client
            .get(uri)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let response = Self::ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}
