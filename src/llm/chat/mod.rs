pub mod gemini;

use async_trait::async_trait;
use std::sync::Arc;
use super::{ GatewayError, LlmConfig };
use self::gemini::GeminiChatClient;
use crate::config::prompt::PromptConfig;
use crate::models::chat::ChatMessage;

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Generates the assistant reply to `user_text`, given every message that
    /// preceded it.
    async fn respond(
        &self,
        user_text: &str,
        history: &[ChatMessage]
    ) -> Result<String, GatewayError>;

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> String;
}

pub fn new_client(
    config: &LlmConfig,
    prompts: Arc<PromptConfig>
) -> Result<Arc<dyn ChatClient>, GatewayError> {
    let client = GeminiChatClient::from_config(config, prompts)?;
    Ok(Arc::new(client))
}
