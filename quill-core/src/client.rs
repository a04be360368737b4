use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::ServiceError;
use crate::types::{CompletionItem, ExecutionResult, ReviewReport};
use crate::wire::{
    AutocompleteRequest, AutocompleteResponse, CodeRequest, CompileResponse, GenerateRequest,
    GenerateResponse, ReviewResponse,
};

/// Base URL used when no service endpoint is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

/// Per-request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The remote suggestion/generation/review/execution service.
///
/// Object safe so the session can hold an `Arc<dyn AssistService>` and tests
/// can substitute an in-process fake.
#[async_trait]
pub trait AssistService: Send + Sync {
    /// Succeeds when the service answers its status probe with a 2xx.
    async fn status(&self) -> Result<(), ServiceError>;

    async fn autocomplete(
        &self,
        request: AutocompleteRequest,
    ) -> Result<Vec<CompletionItem>, ServiceError>;

    /// Returns the generated code, possibly empty.
    async fn generate(&self, request: GenerateRequest) -> Result<String, ServiceError>;

    async fn review(&self, request: CodeRequest) -> Result<ReviewReport, ServiceError>;

    async fn execute(&self, request: CodeRequest) -> Result<ExecutionResult, ServiceError>;
}

/// [`AssistService`] over JSON/HTTP.
#[derive(Debug, Clone)]
pub struct HttpAssistClient {
    http: Client,
    base_url: String,
}

impl HttpAssistClient {
    /// Builds a client rooted at `base_url` (e.g. `http://localhost:5000/api`).
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Transport` if the TLS backend cannot initialize.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post_json<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ServiceError>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = self.url(path);
        let started = tokio::time::Instant::now();
        let resp = self.http.post(&url).json(body).send().await?;
        let status = resp.status();
        debug!(%url, %status, elapsed = ?started.elapsed(), "service call completed");

        if !status.is_success() {
            return Err(ServiceError::Status(status.as_u16()));
        }
        // Read the body first so shape mismatches surface as Decode, not Transport.
        let raw = resp.text().await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

#[async_trait]
impl AssistService for HttpAssistClient {
    async fn status(&self) -> Result<(), ServiceError> {
        let resp = self.http.get(self.url("status")).send().await?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ServiceError::Status(resp.status().as_u16()))
        }
    }

    async fn autocomplete(
        &self,
        request: AutocompleteRequest,
    ) -> Result<Vec<CompletionItem>, ServiceError> {
        let resp: AutocompleteResponse = self.post_json("autocomplete", &request).await?;
        Ok(resp.data.into_iter().map(CompletionItem::from).collect())
    }

    async fn generate(&self, request: GenerateRequest) -> Result<String, ServiceError> {
        let resp: GenerateResponse = self.post_json("generate", &request).await?;
        Ok(resp.generated_code)
    }

    async fn review(&self, request: CodeRequest) -> Result<ReviewReport, ServiceError> {
        let resp: ReviewResponse = self.post_json("review", &request).await?;
        Ok(resp.into())
    }

    async fn execute(&self, request: CodeRequest) -> Result<ExecutionResult, ServiceError> {
        let resp: CompileResponse = self.post_json("compile", &request).await?;
        Ok(resp.into())
    }
}
