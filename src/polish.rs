use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::StudioConfig;
use crate::error::PolishError;

const POLISH_INSTRUCTION: &str = "Rewrite the following image-generation prompt as one richly detailed prompt. \
Describe the subject, composition, lighting, art style and mood. \
Reply with the rewritten prompt only, without quotes or commentary.\n\nPrompt: {input}";

const FALLBACK_TEMPLATE: &str =
    "An enhanced, highly-detailed, and photorealistic version of: {input}";

/// Render an instruction template, substituting `{input}`.
pub fn render(template: &str, input: &str) -> String {
    template.replace("{input}", input)
}

/// The deterministic elaboration used whenever the remote service fails.
pub fn fallback_polish(raw_prompt: &str) -> String {
    render(FALLBACK_TEMPLATE, raw_prompt)
}

/// Turns a raw prompt into an elaborated one via an OpenAI-compatible chat
/// completions endpoint.
///
/// Polishing is advisory: [`PromptPolisher::polish`] never fails and falls
/// back to a templated elaboration after a single unsuccessful attempt.
#[derive(Debug, Clone)]
pub struct PromptPolisher {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl PromptPolisher {
    pub fn new(config: &StudioConfig) -> Self {
        Self {
            http: Client::new(),
            endpoint: config.polish_endpoint.trim_end_matches('/').to_string(),
            api_key: config.polish_api_key.clone(),
            model: config.polish_model.clone(),
            timeout: config.request_timeout,
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    /// Polish `raw_prompt`, absorbing every failure.
    pub async fn polish(&self, raw_prompt: &str) -> String {
        match self.try_polish(raw_prompt).await {
            Ok(polished) => {
                debug!(model = %self.model, "Prompt polished");
                polished
            }
            Err(e) => {
                warn!(error = %e, "Prompt polishing failed, using template");
                fallback_polish(raw_prompt)
            }
        }
    }

    /// One attempt against the remote service.
    pub async fn try_polish(&self, raw_prompt: &str) -> Result<String, PolishError> {
        let api_key = self.api_key.as_deref().ok_or(PolishError::NotConfigured)?;

        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "user", "content": render(POLISH_INSTRUCTION, raw_prompt)}
            ],
            "stream": false,
        });

        let url = format!("{}/chat/completions", self.endpoint);
        let resp = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| PolishError::Network {
                context: format!("Failed to connect to polish service at {}", url),
                source: e,
            })?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PolishError::Http { status, body });
        }

        let json: Value = resp.json().await.map_err(|e| PolishError::Network {
            context: "Failed to parse polish service response".into(),
            source: e,
        })?;

        parse_completion(&json).ok_or(PolishError::EmptyCompletion)
    }
}

/// Extract the assistant text from a chat completions response.
fn parse_completion(json: &Value) -> Option<String> {
    let raw = json.pointer("/choices/0/message/content")?.as_str()?;
    let cleaned = strip_thinking(raw);
    let cleaned = cleaned.trim().trim_matches('"').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Drop a leading `<think>...</think>` reasoning block if the model emits one.
fn strip_thinking(text: &str) -> String {
    match (text.find("<think>"), text.find("</think>")) {
        (Some(start), Some(end)) if end > start => {
            let mut cleaned = String::new();
            cleaned.push_str(&text[..start]);
            cleaned.push_str(&text[end + "</think>".len()..]);
            cleaned
        }
        _ => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_template() {
        assert_eq!(
            fallback_polish("a cat"),
            "An enhanced, highly-detailed, and photorealistic version of: a cat"
        );
    }

    #[test]
    fn test_instruction_embeds_prompt() {
        let rendered = render(POLISH_INSTRUCTION, "a lighthouse");
        assert!(rendered.ends_with("Prompt: a lighthouse"));
    }

    #[test]
    fn test_parse_completion() {
        let json: Value = serde_json::from_str(
            r#"{
            "id": "gen-1",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "\"A tabby cat on a sunlit windowsill\"\n"}}
            ]
        }"#,
        )
        .unwrap();
        assert_eq!(
            parse_completion(&json).as_deref(),
            Some("A tabby cat on a sunlit windowsill")
        );
    }

    #[test]
    fn test_parse_completion_strips_thinking() {
        let json = json!({"choices": [{"message": {"content": "<think>hmm</think> A red fox"}}]});
        assert_eq!(parse_completion(&json).as_deref(), Some("A red fox"));
    }

    #[test]
    fn test_parse_completion_empty() {
        assert!(parse_completion(&json!({"choices": []})).is_none());
        let blank = json!({"choices": [{"message": {"content": "  "}}]});
        assert!(parse_completion(&blank).is_none());
    }

    #[tokio::test]
    async fn test_polish_without_api_key_uses_template() {
        let polisher = PromptPolisher::new(&StudioConfig::default());
        assert!(matches!(
            polisher.try_polish("a cat").await,
            Err(PolishError::NotConfigured)
        ));
        assert_eq!(polisher.polish("a cat").await, fallback_polish("a cat"));
    }

    #[tokio::test]
    async fn test_polish_unreachable_service_uses_template() {
        let config = StudioConfig::builder()
            .with_polish_endpoint("http://127.0.0.1:9")
            .with_polish_api_key("sk-test")
            .with_request_timeout(Duration::from_secs(2))
            .build();
        let polisher = PromptPolisher::new(&config);
        assert_eq!(polisher.polish("a cat").await, fallback_polish("a cat"));
    }
}
