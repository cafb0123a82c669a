pub mod chat;

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 500;
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Missing credential or an unusable client setup. Retrying will not help.
    #[error("chat gateway is not configured: {0}")]
    Configuration(String),
    /// The remote call failed or returned nothing usable.
    #[error("chat gateway upstream error: {0}")]
    Upstream(String),
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Upstream(format!("request timed out: {}", err))
        } else {
            GatewayError::Upstream(err.to_string())
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub completion_model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub request_timeout: Duration,
}
