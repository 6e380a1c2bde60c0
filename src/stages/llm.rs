//! Mock language-model stage.
//!
//! [`MockLlm`] picks a canned reply and streams it one word at a time.  The
//! pool is chosen by keyword: if any message (system prompt included)
//! mentions a healthcare term, the reply comes from [`HEALTHCARE_RESPONSES`],
//! otherwise from [`GENERAL_RESPONSES`].

use std::sync::Arc;

use async_stream::stream;
use rand::Rng;

use crate::stages::stage::{LlmStage, LlmStream, StageError};
use crate::stages::timing::{DelayRange, Jitter, StageTiming};
use crate::stages::types::{ChatMessage, LlmToken};

pub const GENERAL_RESPONSES: [&str; 5] = [
    "I understand you're having issues with your account. Let me help you with that.",
    "I'd be happy to help you schedule an appointment. What time works best for you?",
    "Let me check your order status for you right away.",
    "I'm sorry to hear about the technical difficulties. Let's troubleshoot this together.",
    "I can help you update your information. What would you like to change?",
];

pub const HEALTHCARE_RESPONSES: [&str; 5] = [
    "Thank you for calling our healthcare facility. How can I assist you today?",
    "I understand you'd like to discuss your symptoms. Can you tell me more about what you're experiencing?",
    "Let me help you schedule that appointment with the appropriate specialist.",
    "Based on what you've described, I'd recommend speaking with one of our medical professionals.",
    "I'll need to collect some basic information first to ensure we provide you with the best care.",
];

/// Matched case-insensitively as substrings.
pub const HEALTHCARE_KEYWORDS: [&str; 4] = ["medical", "health", "doctor", "symptom"];

/// `true` when any message mentions a healthcare keyword.
///
/// ```
/// use voice_agent_sim::stages::{is_healthcare, ChatMessage};
///
/// assert!(is_healthcare(&[ChatMessage::system("You are a Medical intake bot.")]));
/// assert!(!is_healthcare(&[ChatMessage::user("Where is my parcel?")]));
/// ```
pub fn is_healthcare(messages: &[ChatMessage]) -> bool {
    messages.iter().any(|m| {
        let lower = m.content.to_lowercase();
        HEALTHCARE_KEYWORDS.iter().any(|kw| lower.contains(kw))
    })
}

/// Split a reply into word tokens.
///
/// Every token after the first carries a leading space; only the last has
/// `done = true`.  Concatenating the tokens reproduces `response`.
pub fn tokenize_response(response: &str) -> Vec<LlmToken> {
    let words: Vec<&str> = response.split(' ').collect();
    let last = words.len() - 1;
    words
        .into_iter()
        .enumerate()
        .map(|(i, word)| LlmToken {
            token: if i > 0 {
                format!(" {word}")
            } else {
                word.to_string()
            },
            done: i == last,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// MockLlm
// ---------------------------------------------------------------------------

pub struct MockLlm {
    startup: DelayRange,
    per_token: DelayRange,
    jitter: Arc<Jitter>,
}

impl MockLlm {
    pub fn new(timing: &StageTiming, jitter: Arc<Jitter>) -> Self {
        Self {
            startup: timing.llm_startup,
            per_token: timing.llm_token,
            jitter,
        }
    }

    fn pick_response(&self, messages: &[ChatMessage]) -> &'static str {
        let pool: &[&'static str] = if is_healthcare(messages) {
            &HEALTHCARE_RESPONSES
        } else {
            &GENERAL_RESPONSES
        };
        let idx = self.jitter.rng().gen_range(0..pool.len());
        pool[idx]
    }
}

impl LlmStage for MockLlm {
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> Result<LlmStream<'a>, StageError> {
        let tokens = stream! {
            self.jitter.pause(self.startup).await;

            let response = self.pick_response(messages);
            log::trace!("mock llm: streaming {:?}", response);

            for token in tokenize_response(response) {
                self.jitter.pause(self.per_token).await;
                yield Ok::<_, StageError>(token);
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
    use futures::StreamExt;

    fn instant_llm(seed: u64) -> MockLlm {
        MockLlm::new(&StageTiming::default(), Arc::new(Jitter::instant(seed)))
    }

    async fn run(llm: &MockLlm, messages: &[ChatMessage]) -> Vec<LlmToken> {
        llm.complete(messages)
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
            .await
    }

    fn joined(tokens: &[LlmToken]) -> String {
        tokens.iter().map(|t| t.token.as_str()).collect()
    }

    // ---- keyword detection ---

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert!(is_healthcare(&[ChatMessage::user("Call my DOCTOR")]));
    }

    #[test]
    fn keyword_match_is_substring() {
        assert!(is_healthcare(&[ChatMessage::user("healthcare plans")]));
        assert!(is_healthcare(&[ChatMessage::user("my symptoms got worse")]));
    }

    #[test]
    fn keyword_in_any_message_counts() {
        let messages = [
            ChatMessage::system("You are a medical intake assistant."),
            ChatMessage::user("Can you help me with my order status?"),
        ];
        assert!(is_healthcare(&messages));
    }

    #[test]
    fn no_keyword_is_general() {
        assert!(!is_healthcare(&[
            ChatMessage::system("You are a helpful assistant."),
            ChatMessage::user("I'd like to update my personal information."),
        ]));
    }

    // ---- tokenisation ---

    #[test]
    fn tokens_rebuild_response() {
        for response in GENERAL_RESPONSES.iter().chain(HEALTHCARE_RESPONSES.iter()) {
            assert_eq!(joined(&tokenize_response(response)), *response);
        }
    }

    #[test]
    fn only_last_token_is_done() {
        let tokens = tokenize_response("one two three");
        assert_eq!(
            tokens.iter().map(|t| t.done).collect::<Vec<_>>(),
            vec![false, false, true]
        );
        assert_eq!(tokens[0].token, "one");
        assert_eq!(tokens[1].token, " two");
    }

    #[test]
    fn single_word_is_single_done_token() {
        let tokens = tokenize_response("Hi");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].done);
    }

    // ---- streaming ---

    #[tokio::test]
    async fn healthcare_prompt_selects_healthcare_pool() {
        let messages = [
            ChatMessage::system("You are a medical intake assistant."),
            ChatMessage::user("Can you help me with my order status?"),
        ];
        for seed in 0..10 {
            let reply = joined(&run(&instant_llm(seed), &messages).await);
            assert!(HEALTHCARE_RESPONSES.contains(&reply.as_str()), "{reply}");
        }
    }

    #[tokio::test]
    async fn general_prompt_selects_general_pool() {
        let messages = [
            ChatMessage::system("You are a helpful assistant."),
            ChatMessage::user("Can you help me with my order status?"),
        ];
        for seed in 0..10 {
            let reply = joined(&run(&instant_llm(seed), &messages).await);
            assert!(GENERAL_RESPONSES.contains(&reply.as_str()), "{reply}");
        }
    }

    #[tokio::test]
    async fn stream_ends_with_done_token() {
        let tokens = run(&instant_llm(4), &[ChatMessage::user("hello")]).await;
        assert!(tokens.last().unwrap().done);
        assert!(tokens[..tokens.len() - 1].iter().all(|t| !t.done));
    }
}
