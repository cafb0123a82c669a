use clap::Parser;
use std::time::Duration;

use crate::llm::chat::gemini::{ DEFAULT_BASE_URL, DEFAULT_MODEL };
use crate::llm::{
    LlmConfig,
    DEFAULT_MAX_OUTPUT_TOKENS,
    DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_TEMPERATURE,
};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Chat LLM Provider Args ---
    /// API key for the Gemini generateContent endpoint. Without it every reply falls back to the offline support message.
    #[arg(long, env = "GEMINI_API_KEY")]
    pub gemini_api_key: Option<String>,

    /// Gemini model name (e.g., gemini-pro, gemini-1.5-flash)
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    pub gemini_model: String,

    /// Base URL of the Gemini models API; the model name and `:generateContent` are appended.
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub gemini_base_url: String,

    /// Sampling temperature for replies.
    #[arg(long, env = "CHAT_TEMPERATURE", default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    /// Upper bound on generated reply length, in tokens.
    #[arg(long, env = "CHAT_MAX_OUTPUT_TOKENS", default_value_t = DEFAULT_MAX_OUTPUT_TOKENS)]
    pub max_output_tokens: u32,

    /// Deadline for a single model request, in seconds.
    #[arg(long, env = "CHAT_REQUEST_TIMEOUT_SECS", default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs())]
    pub request_timeout_secs: u64,

    // --- History Store Args ---
    /// Chat history storage type (file, memory)
    #[arg(long, env = "HISTORY_TYPE", default_value = "file")]
    pub history_type: String,

    /// Directory holding the file-backed chat history.
    #[arg(long, env = "HISTORY_DIR", default_value = ".mindcheck")]
    pub history_dir: String,

    /// Namespace key the conversation is stored under.
    #[arg(long, env = "HISTORY_KEY", default_value = "mindcheck_chat_history")]
    pub history_key: String,

    // --- General App Args ---
    /// Optional JSON file overriding the built-in prompts, welcome texts and quick actions.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,
}

impl Args {
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.gemini_api_key.clone().filter(|k| !k.trim().is_empty()),
            completion_model: Some(self.gemini_model.clone()),
            base_url: Some(self.gemini_base_url.clone()),
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }
}
