mod anthropic;
mod prompt;

pub use anthropic::{AnthropicProvider, ANTHROPIC_VERSION, MAX_TOKENS};
pub use prompt::{build_recipe_prompt, RECIPE_PROMPT_TEMPLATE};

use async_trait::async_trait;

use crate::error::AppError;

/// A hosted language model that answers a single prompt
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "anthropic")
    fn provider_name(&self) -> &str;

    /// Send one user message and return the text of the first content block
    async fn complete(&self, prompt: &str) -> Result<String, AppError>;
}
