use crate::config::LlmConfig;
use crate::error::AppError;
use crate::logging::Logger;
use crate::providers::LlmProvider;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

/// Protocol version sent with every request
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Token budget for one recommendation reply
pub const MAX_TOKENS: u32 = 2048;

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    logger: Logger,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider from configuration
    pub fn new(config: &LlmConfig, logger: Logger) -> Result<Self, AppError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .ok_or_else(|| {
                AppError::Internal("ANTHROPIC_API_KEY not found in config or environment".into())
            })?;

        Ok(AnthropicProvider {
            client: Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            logger: logger.scoped("ingredient_recognition::llm"),
        })
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: MAX_TOKENS,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        self.logger.debug(format_args!(
            "Invoking model {} with {} byte prompt",
            self.model,
            prompt.len()
        ));

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                self.logger
                    .error(format_args!("Model invocation failed: {}", e));
                AppError::Upstream(format!("failed to invoke model: {e}"))
            })?;

        let status = response.status();
        let response_body: Value = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("failed to parse model response: {e}")))?;
        self.logger
            .debug(format_args!("Anthropic response: {:?}", response_body));

        // Check for API error response
        if let Some(error) = response_body.get("error") {
            let error_type = error["type"].as_str().unwrap_or("unknown");
            let error_message = error["message"].as_str().unwrap_or("Unknown error");
            self.logger.error(format_args!(
                "Anthropic API error ({}): {}",
                error_type, error_message
            ));
            return Err(AppError::Upstream(format!(
                "Anthropic API error ({error_type}): {error_message}"
            )));
        }

        if !status.is_success() {
            return Err(AppError::Upstream(format!(
                "Anthropic API returned status {status}"
            )));
        }

        let text = response_body["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                self.logger
                    .error(format_args!("Unexpected response format from model"));
                AppError::Upstream("unexpected response format".to_string())
            })?
            .to_string();

        self.logger.debug(format_args!(
            "Extracted {} bytes of text from model response",
            text.len()
        ));

        Ok(text)
    }
}
