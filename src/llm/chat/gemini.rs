use async_trait::async_trait;
use log::{ debug, info };
use reqwest::{ Client as HttpClient, StatusCode };
use serde::{ Deserialize, Serialize };
use std::sync::Arc;
use std::time::Duration;

use super::ChatClient;
use crate::config::prompt::PromptConfig;
use crate::llm::{ GatewayError, LlmConfig };
use crate::models::chat::{ ChatMessage, Role };

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-pro";

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    role: GeminiRole,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

/// Gemini's two-party vocabulary: our assistant speaks as `model`.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum GeminiRole {
    User,
    Model,
}

impl From<Role> for GeminiRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => GeminiRole::User,
            Role::Assistant => GeminiRole::Model,
        }
    }
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
}

#[derive(Deserialize)]
struct GoogleCandidate {
    content: Option<GoogleContent>,
}

#[derive(Deserialize)]
struct GoogleContent {
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Deserialize)]
struct GooglePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct GoogleErrorBody {
    error: Option<GoogleErrorDetail>,
}

#[derive(Deserialize)]
struct GoogleErrorDetail {
    message: Option<String>,
}

fn content<'a>(role: GeminiRole, text: &'a str) -> GeminiContent<'a> {
    GeminiContent {
        role,
        parts: vec![GeminiPart { text }],
    }
}

fn build_contents<'a>(
    prompts: &'a PromptConfig,
    history: &'a [ChatMessage],
    user_text: &'a str
) -> Vec<GeminiContent<'a>> {
    let mut contents = Vec::with_capacity(history.len() + 3);
    contents.push(content(GeminiRole::User, &prompts.system_directive));
    contents.push(content(GeminiRole::Model, &prompts.acknowledgement));
    contents.extend(history.iter().map(|msg| content(msg.role.into(), &msg.content)));
    contents.push(content(GeminiRole::User, user_text));
    contents
}

fn first_candidate_text(response: GeminiResponse) -> Option<String> {
    response.candidates
        .into_iter()
        .next()?
        .content?
        .parts.into_iter()
        .next()?
        .text.filter(|text| !text.is_empty())
}

fn upstream_error_message(status: StatusCode, body: &str) -> String {
    serde_json
        ::from_str::<GoogleErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("Failed to get response from AI (HTTP {})", status))
}

pub struct GeminiChatClient {
    http: HttpClient,
    api_key: Option<String>,
    model: String,
    base_url: String,
    temperature: f32,
    max_output_tokens: u32,
    prompts: Arc<PromptConfig>,
}

impl GeminiChatClient {
    pub fn new(
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>,
        temperature: f32,
        max_output_tokens: u32,
        request_timeout: Duration,
        prompts: Arc<PromptConfig>
    ) -> Result<Self, GatewayError> {
        let http = HttpClient::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| GatewayError::Configuration(format!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            temperature,
            max_output_tokens,
            prompts,
        })
    }

    pub fn from_config(config: &LlmConfig, prompts: Arc<PromptConfig>) -> Result<Self, GatewayError> {
        Self::new(
            config.api_key.clone(),
            config.completion_model.clone(),
            config.base_url.clone(),
            config.temperature,
            config.max_output_tokens,
            config.request_timeout,
            prompts
        )
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    async fn respond(
        &self,
        user_text: &str,
        history: &[ChatMessage]
    ) -> Result<String, GatewayError> {
        let api_key = self.api_key
            .as_deref()
            .ok_or_else(|| {
                GatewayError::Configuration(
                    "Gemini API key not configured. Set GEMINI_API_KEY.".to_string()
                )
            })?;

        let payload = GeminiRequest {
            contents: build_contents(&self.prompts, history, user_text),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };
        info!(
            "GeminiChatClient::respond() → model={} history_len={}",
            self.model,
            history.len()
        );

        let resp = self.http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&payload)
            .send().await
            .map_err(|e| GatewayError::from(e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            debug!("Gemini error body: {}", body);
            return Err(GatewayError::Upstream(upstream_error_message(status, &body)));
        }

        let parsed: GeminiResponse = resp
            .json().await
            .map_err(|e| GatewayError::Upstream(format!("malformed response: {}", e.without_url())))?;

        first_candidate_text(parsed).ok_or_else(|| {
            GatewayError::Upstream("No response from AI".to_string())
        })
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}
