//! HTTP client service
//!
//! Encapsulates HTTP communication with the upstream chat completion
//! API

use crate::config::credentials::{Provider, ResolvedCredential};
use crate::config::settings::GatewayConfig;
use crate::models::chat::{CompletionRequest, CompletionResponse, UpstreamErrorResponse};
use crate::utils::error::{GatewayError, GatewayResult};
use crate::utils::logging::create_request_log_summary;
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, error, info};

/// Authenticated client for one OpenAI-compatible provider
///
/// Created at most once per process by the gateway; callers never
/// construct one directly for gateway traffic.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    credential: ResolvedCredential,
}

impl ChatClient {
    /// Create a client bound to an already resolved credential
    pub fn new(credential: ResolvedCredential, config: &GatewayConfig) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("aigateway/", env!("CARGO_PKG_VERSION")))
            .build()?;

        info!("🤖 AI client initialized ({})", credential.provider.name());

        Ok(Self { client, credential })
    }

    /// Selected provider
    pub fn provider(&self) -> Provider {
        self.credential.provider
    }

    /// Model used when the caller does not pick one explicitly
    pub fn default_model(&self) -> &str {
        &self.credential.model
    }

    /// Send one chat completion request
    pub async fn chat_completion(
        &self,
        request: &CompletionRequest,
    ) -> GatewayResult<CompletionResponse> {
        debug!(
            "Sending chat completion request: {}",
            create_request_log_summary(request)
        );

        let url = format!("{}/chat/completions", self.credential.provider.base_url());

        let mut builder = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.credential.api_key))
            .header("Content-Type", "application/json");

        // OpenRouter requires attribution headers
        if self.credential.provider == Provider::OpenRouter {
            builder = builder
                .header("HTTP-Referer", "https://vibecoder.dev")
                .header("X-Title", "VibeCoder Architect");
        }

        let response = builder.json(request).send().await?;

        self.handle_response(response).await
    }

    /// Handle HTTP response
    async fn handle_response(&self, response: Response) -> GatewayResult<CompletionResponse> {
        let status = response.status();

        if status.is_success() {
            let completion: CompletionResponse = response.json().await?;
            debug!("Chat completion request succeeded");
            return Ok(completion);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GatewayError::RateLimited);
        }

        let body = response.text().await.unwrap_or_default();

        // Try to parse as a structured provider error
        let message = match serde_json::from_str::<UpstreamErrorResponse>(&body) {
            Ok(parsed) => parsed.error.message,
            Err(_) => body,
        };

        error!("Upstream API error: {} - {}", status, message);
        Err(GatewayError::Upstream {
            status: status.as_u16(),
            message,
        })
    }
}
