//! Cloud chat completions client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use munim_core::config::LlmConfig;
use munim_core::types::Message;
use munim_core::{MunimError, Result};

use crate::prompt::SYSTEM_PROMPT;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Client for an OpenAI-compatible chat completions endpoint.
pub struct ChatClient {
    client: reqwest::Client,
    config: LlmConfig,
    api_key: Option<String>,
}

impl ChatClient {
    pub fn new(config: LlmConfig, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| MunimError::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Complete the conversation. The fixed system prompt is prepended;
    /// `history` carries only user and assistant turns.
    pub async fn complete(&self, history: &[Message]) -> Result<String> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(WireMessage {
            role: "system",
            content: SYSTEM_PROMPT,
        });
        for msg in history {
            messages.push(WireMessage {
                role: msg.role.as_str(),
                content: &msg.content,
            });
        }

        let request = ChatRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let mut builder = self.client.post(&self.config.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| MunimError::Llm(format!("Chat request failed: {}", e)))?;

        let status = response.status();
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| MunimError::Llm(format!("Invalid chat response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(MunimError::Llm(error.message));
        }
        if !status.is_success() {
            return Err(MunimError::Llm(format!(
                "Chat endpoint returned {}",
                status
            )));
        }

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| MunimError::Llm("Chat response had no content".to_string()))?;

        debug!(chars = content.len(), "Chat completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_openai_shape() {
        let request = ChatRequest {
            model: "meta-llama/llama-3.3-70b-instruct",
            messages: vec![
                WireMessage {
                    role: "system",
                    content: "prompt",
                },
                WireMessage {
                    role: "user",
                    content: "stock dikhao",
                },
            ],
            temperature: 0.7,
            max_tokens: 300,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "meta-llama/llama-3.3-70b-instruct");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "stock dikhao");
        assert_eq!(json["max_tokens"], 300);
    }

    #[test]
    fn test_response_parses_choices() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "Namaste!"}}]}"#,
        )
        .unwrap();
        assert_eq!(body.choices[0].message.content.as_deref(), Some("Namaste!"));
        assert!(body.error.is_none());
    }

    #[test]
    fn test_response_parses_error_shape() {
        let body: ChatResponse =
            serde_json::from_str(r#"{"error": {"message": "rate limited", "code": 429}}"#).unwrap();
        assert_eq!(body.error.unwrap().message, "rate limited");
        assert!(body.choices.is_empty());
    }
}
