//! OpenAI-compatible language-model stage.
//!
//! `ApiLlm` calls any `/v1/chat/completions` endpoint (Ollama in OpenAI mode,
//! OpenAI, Groq, LM Studio, vLLM …) and re-streams the reply as word tokens,
//! so it can replace [`MockLlm`](crate::stages::MockLlm) without any change
//! to the orchestrator.  All connection details come from [`LlmConfig`].

use async_stream::stream;

use crate::config::LlmConfig;
use crate::stages::llm::tokenize_response;
use crate::stages::stage::{LlmStage, LlmStream, StageError};
use crate::stages::types::ChatMessage;

pub struct ApiLlm {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ApiLlm {
    /// Build from config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`; a default client is the fallback if the builder
    /// fails.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// One non-streaming completion request.
    async fn request(&self, messages: &[ChatMessage]) -> Result<String, StageError> {
        let body = serde_json::json!({
            "model":       self.config.model,
            "messages":    messages,
            "stream":      false,
            "temperature": self.config.temperature,
            "max_tokens":  self.config.max_tokens,
        });

        let mut req = self.client.post(self.endpoint()).json(&body);

        // Bearer auth only for a non-empty key; local providers need none.
        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?.error_for_status()?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| StageError::Parse(e.to_string()))?;

        extract_content(&json)
    }
}

/// Pull `choices[0].message.content` out of a completion response.
fn extract_content(json: &serde_json::Value) -> Result<String, StageError> {
    let content = json["choices"][0]["message"]["content"]
        .as_str()
        .ok_or(StageError::EmptyResponse)?
        .trim();

    if content.is_empty() {
        return Err(StageError::EmptyResponse);
    }
    Ok(content.to_string())
}

impl LlmStage for ApiLlm {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> Result<LlmStream<'a>, StageError> {
        let tokens = stream! {
            match self.request(messages).await {
                Ok(reply) => {
                    log::debug!("api llm: {} chars from {}", reply.len(), self.config.model);
                    for token in tokenize_response(&reply) {
                        yield Ok(token);
                    }
                }
                Err(e) => {
                    log::warn!("api llm: request failed: {e}");
                    yield Err(e);
                }
            }
        };

        let tokens: LlmStream<'a> = Box::pin(tokens);
        Ok(tokens)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmProvider;
    use futures::StreamExt;
    use serde_json::json;

    fn make_config(base_url: &str, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            provider: LlmProvider::OpenAiCompatible,
            base_url: base_url.into(),
            api_key: api_key.map(|s| s.to_string()),
            model: "qwen2.5:3b".into(),
            temperature: 0.7,
            max_tokens: 256,
            timeout_secs: 2,
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let _llm = ApiLlm::from_config(&make_config("http://localhost:11434", None));
        let _llm = ApiLlm::from_config(&make_config("http://localhost:11434", Some("")));
        let _llm = ApiLlm::from_config(&make_config("https://api.openai.com", Some("sk-test")));
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let llm = ApiLlm::from_config(&make_config("http://localhost:11434/", None));
        assert_eq!(llm.endpoint(), "http://localhost:11434/v1/chat/completions");
    }

    #[test]
    fn extract_content_trims() {
        let json = json!({ "choices": [{ "message": { "content": "  Hello there.\n" } }] });
        assert_eq!(extract_content(&json).unwrap(), "Hello there.");
    }

    #[test]
    fn extract_content_missing_is_empty_response() {
        assert_eq!(extract_content(&json!({})), Err(StageError::EmptyResponse));
        let blank = json!({ "choices": [{ "message": { "content": "   " } }] });
        assert_eq!(extract_content(&blank), Err(StageError::EmptyResponse));
    }

    #[test]
    fn api_llm_is_object_safe() {
        let llm: Box<dyn LlmStage> =
            Box::new(ApiLlm::from_config(&make_config("http://localhost:11434", None)));
        drop(llm);
    }

    /// Nothing listens on port 9 of the loopback; the stream must surface a
    /// single `Err` item instead of panicking.
    #[tokio::test]
    async fn unreachable_backend_yields_single_error() {
        let llm = ApiLlm::from_config(&make_config("http://127.0.0.1:9", None));
        let messages = [ChatMessage::user("hello")];
        let items: Vec<_> = llm.complete(&messages).unwrap().collect().await;
        assert_eq!(items.len(), 1);
        assert!(items[0].is_err());
    }
}
