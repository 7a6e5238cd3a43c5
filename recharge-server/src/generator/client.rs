//! OpenAI-compatible chat-completions client.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::error::GeneratorError;
use super::prompt::response_format;
use super::{ChatMessage, PlanGenerator};

/// Default base URL; any OpenAI-compatible endpoint works.
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

const DEFAULT_MODEL: &str = "z-ai/glm-4.5";

/// Configuration for the chat client.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Bearer token
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// Request timeout in seconds. Reasoning models are slow.
    pub timeout_secs: u64,
}

impl ChatConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 300,
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    response_format: Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client producing recharging plans.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    url: String,
    model: String,
}

impl ChatClient {
    /// Create a new chat client with the given configuration.
    pub fn new(config: ChatConfig) -> Result<Self, GeneratorError> {
        let mut headers = HeaderMap::new();

        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key)).map_err(|_| {
            GeneratorError::Api {
                status: 0,
                message: "Invalid API key format".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, bearer);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model,
        })
    }

    /// Send the conversation and return the answer text.
    pub async fn complete(&self, conversation: &[ChatMessage]) -> Result<String, GeneratorError> {
        let request = ChatRequest {
            model: &self.model,
            messages: conversation,
            response_format: response_format(),
        };

        info!(model = %self.model, messages = conversation.len(), "requesting plan");
        let response = self.http.post(&self.url).json(&request).send().await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(GeneratorError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeneratorError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeneratorError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let reply: ChatResponse =
            serde_json::from_str(&body).map_err(|e| GeneratorError::Json {
                message: e.to_string(),
            })?;

        let content = extract_content(reply)?;
        debug!(chars = content.len(), "received plan answer");
        Ok(content)
    }
}

fn extract_content(reply: ChatResponse) -> Result<String, GeneratorError> {
    reply
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or(GeneratorError::EmptyReply)
}

impl PlanGenerator for ChatClient {
    async fn generate(&self, conversation: &[ChatMessage]) -> Result<String, GeneratorError> {
        self.complete(conversation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder() {
        let config = ChatConfig::new("sk-test")
            .with_base_url("http://localhost:11434/v1/")
            .with_model("qwen3")
            .with_timeout(60);

        assert_eq!(config.api_key, "sk-test");
        assert_eq!(config.model, "qwen3");
        assert_eq!(config.timeout_secs, 60);

        let client = ChatClient::new(config).unwrap();
        assert_eq!(client.url, "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn config_defaults() {
        let config = ChatConfig::new("sk-test");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn request_body_shape() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("plan")];
        let request = ChatRequest {
            model: "m",
            messages: &messages,
            response_format: response_format(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "m");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["response_format"]["type"], "json_schema");
    }

    #[test]
    fn reply_content_extraction() {
        let reply: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"reason\":\"\"}"}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_content(reply).unwrap(), r#"{"reason":""}"#);

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(extract_content(empty), Err(GeneratorError::EmptyReply)));

        let null: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(extract_content(null), Err(GeneratorError::EmptyReply)));
    }
}
