//! OpenAI-compatible chat-completions client used for intent classification.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use airdesk_core::config::LlmConfig;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("llm api key is not configured")]
    MissingApiKey,
    #[error("llm transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("llm returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("llm response had no choices")]
    EmptyResponse,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system", content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user", content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant", content: content.into() }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_text(self) -> Result<String, LlmError> {
        self.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or(LlmError::EmptyResponse)
    }
}

pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl OpenAiCompatibleClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url, model: model.into(), api_key })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.api_key.clone().ok_or(LlmError::MissingApiKey)?;
        Self::new(
            config.base_url.clone(),
            config.model.clone(),
            api_key,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) =
            HeaderValue::from_str(&format!("Bearer {}", self.api_key.expose_secret()))
        {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let body = ChatCompletionRequest { model: &self.model, messages, temperature: 0.0 };

        debug!(model = %self.model, messages = messages.len(), "llm chat completion");

        let response =
            self.http.post(self.endpoint()).headers(self.headers()).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status: status.as_u16(), body });
        }

        response.json::<ChatCompletionResponse>().await?.into_text()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use airdesk_core::config::{LlmConfig, DEFAULT_LLM_BASE_URL, DEFAULT_MODEL};

    use super::{ChatCompletionResponse, ChatMessage, LlmError, OpenAiCompatibleClient};

    #[test]
    fn endpoint_joins_base_url_without_double_slash() {
        let client = OpenAiCompatibleClient::new(
            "https://llm.example.test/v1/",
            DEFAULT_MODEL,
            SecretString::from("sk-test".to_string()),
            Duration::from_secs(5),
        )
        .expect("client");

        assert_eq!(client.endpoint(), "https://llm.example.test/v1/chat/completions");
        assert_eq!(client.model(), "gemini-2.0-flash");
    }

    #[test]
    fn bearer_header_carries_api_key() {
        let client = OpenAiCompatibleClient::new(
            DEFAULT_LLM_BASE_URL,
            DEFAULT_MODEL,
            SecretString::from("sk-test".to_string()),
            Duration::from_secs(5),
        )
        .expect("client");

        let headers = client.headers();
        assert_eq!(
            headers.get(reqwest::header::AUTHORIZATION).and_then(|value| value.to_str().ok()),
            Some("Bearer sk-test")
        );
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let config = LlmConfig {
            api_key: None,
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: 10,
        };

        assert!(matches!(
            OpenAiCompatibleClient::from_config(&config),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[test]
    fn first_choice_content_is_returned() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"booking"}}]}"#,
        )
        .expect("decode");
        assert_eq!(response.into_text().expect("text"), "booking");

        let empty: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[]}"#).expect("decode");
        assert!(matches!(empty.into_text(), Err(LlmError::EmptyResponse)));
    }

    #[test]
    fn messages_serialize_with_openai_roles() {
        let encoded = serde_json::to_value([
            ChatMessage::system("classify"),
            ChatMessage::user("book a seat"),
        ])
        .expect("encode");

        assert_eq!(encoded[0]["role"], "system");
        assert_eq!(encoded[1]["content"], "book a seat");
    }
}
