use crate::traits::ChatModel;
use crate::LlmError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

pub const DEFAULT_OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_APP_URL: &str = "http://localhost";
pub const DEFAULT_APP_TITLE: &str = "tech-notes-rag-bot";
pub const DEFAULT_LLM_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection settings for an OpenAI-compatible chat completions provider.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub app_url: String,
    pub app_title: String,
    pub timeout: Duration,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_OPENROUTER_BASE_URL.to_string(),
            model: String::new(),
            app_url: DEFAULT_APP_URL.to_string(),
            app_title: DEFAULT_APP_TITLE.to_string(),
            timeout: DEFAULT_LLM_TIMEOUT,
        }
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// OpenRouter chat client. Credentials are checked on each call, and each call
/// uses its own short-lived HTTP client.
pub struct OpenRouterChat {
    settings: LlmSettings,
}

impl OpenRouterChat {
    pub fn new(settings: LlmSettings) -> Self {
        Self { settings }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }

    fn check_settings(&self) -> Result<(), LlmError> {
        if self.settings.api_key.trim().is_empty() {
            return Err(LlmError::MissingSetting("OPENROUTER_API_KEY"));
        }
        if self.settings.model.trim().is_empty() {
            return Err(LlmError::MissingSetting("OPENROUTER_MODEL"));
        }
        Ok(())
    }
}

pub fn user_message(question: &str, context: &str) -> String {
    format!("CONTEXT:\n{context}\n\nQUESTION:\n{question}")
}

pub fn build_messages(system: &str, question: &str, context: &str) -> Vec<Value> {
    vec![
        json!({ "role": "system", "content": system }),
        json!({ "role": "user", "content": user_message(question, context) }),
    ]
}

#[async_trait]
impl ChatModel for OpenRouterChat {
    async fn complete(&self, system: &str, question: &str, context: &str) -> Result<String, LlmError> {
        self.check_settings()?;

        let client = Client::builder().timeout(self.settings.timeout).build()?;
        let response = client
            .post(self.endpoint())
            .bearer_auth(&self.settings.api_key)
            .header("HTTP-Referer", &self.settings.app_url)
            .header("X-Title", &self.settings.app_title)
            .json(&json!({
                "model": self.settings.model,
                "messages": build_messages(system, question, context),
                "temperature": 0.0,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ProviderResponse {
                provider: "openrouter".to_string(),
                details: format!("{status}: {body}"),
            });
        }

        let parsed: CompletionResponse = response.json().await?;
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}
