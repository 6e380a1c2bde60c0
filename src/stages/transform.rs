//! Mock data-transform stage.
//!
//! Strings are analysed into a [`TextAnalysis`] record (cleaned text, word
//! count, a coin-flip sentiment label and pattern-matched entities).  Any
//! other JSON value passes through untouched.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stages::stage::{StageError, TransformStage};
use crate::stages::timing::{DelayRange, Jitter, StageTiming};
use crate::stages::types::TransformOutput;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Email,
    Phone,
    Date,
}

impl EntityKind {
    /// Fixed confidence reported for every match of this kind.
    pub fn confidence(self) -> f64 {
        match self {
            EntityKind::Email => 0.95,
            EntityKind::Phone => 0.90,
            EntityKind::Date => 0.85,
        }
    }

    fn pattern(self) -> &'static Regex {
        static EMAIL: OnceLock<Regex> = OnceLock::new();
        static PHONE: OnceLock<Regex> = OnceLock::new();
        static DATE: OnceLock<Regex> = OnceLock::new();

        match self {
            EntityKind::Email => EMAIL.get_or_init(|| {
                Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
                    .expect("email pattern is valid")
            }),
            EntityKind::Phone => PHONE.get_or_init(|| {
                Regex::new(r"\b\d{3}-\d{3}-\d{4}\b").expect("phone pattern is valid")
            }),
            EntityKind::Date => DATE.get_or_init(|| {
                Regex::new(r"\b\d{1,2}/\d{1,2}/\d{4}\b").expect("date pattern is valid")
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub value: String,
    pub confidence: f64,
}

/// Find emails, `ddd-ddd-dddd` phone numbers and `d/d/dddd` dates.
///
/// Results are grouped by kind (emails, then phones, then dates), each group
/// in order of appearance.
///
/// ```
/// use voice_agent_sim::stages::{extract_entities, EntityKind};
///
/// let found = extract_entities("Contact me at a@b.com or 555-123-4567");
/// assert_eq!(found[0].kind, EntityKind::Email);
/// assert_eq!(found[0].value, "a@b.com");
/// assert_eq!(found[1].value, "555-123-4567");
/// ```
pub fn extract_entities(text: &str) -> Vec<Entity> {
    [EntityKind::Email, EntityKind::Phone, EntityKind::Date]
        .into_iter()
        .flat_map(|kind| {
            kind.pattern().find_iter(text).map(move |m| Entity {
                kind,
                value: m.as_str().to_string(),
                confidence: kind.confidence(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// TextAnalysis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAnalysis {
    pub original: String,
    /// Lowercased and trimmed.
    pub cleaned: String,
    /// Number of single-space separated pieces.
    pub word_count: usize,
    pub sentiment: Sentiment,
    pub entities: Vec<Entity>,
}

impl TextAnalysis {
    pub fn analyze<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Self {
        let sentiment = if rng.gen_bool(0.5) {
            Sentiment::Positive
        } else {
            Sentiment::Negative
        };

        Self {
            original: text.to_string(),
            cleaned: text.to_lowercase().trim().to_string(),
            word_count: text.split(' ').count(),
            sentiment,
            entities: extract_entities(text),
        }
    }
}

// ---------------------------------------------------------------------------
// MockTransform
// ---------------------------------------------------------------------------

pub struct MockTransform {
    delay: DelayRange,
    jitter: Arc<Jitter>,
}

impl MockTransform {
    pub fn new(timing: &StageTiming, jitter: Arc<Jitter>) -> Self {
        Self {
            delay: timing.transform,
            jitter,
        }
    }
}

#[async_trait]
impl TransformStage for MockTransform {
    async fn transform(&self, data: Value) -> Result<TransformOutput, StageError> {
        self.jitter.pause(self.delay).await;

        let data = match data {
            Value::String(text) => {
                let analysis = TextAnalysis::analyze(&text, &mut *self.jitter.rng());
                serde_json::to_value(analysis).map_err(|e| StageError::failed(e.to_string()))?
            }
            other => other,
        };

        Ok(TransformOutput { data })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn instant_transform(seed: u64) -> MockTransform {
        MockTransform::new(&StageTiming::default(), Arc::new(Jitter::instant(seed)))
    }

    #[test]
    fn extracts_email_and_phone() {
        let found = extract_entities("Contact me at a@b.com or 555-123-4567");
        assert_eq!(
            found,
            vec![
                Entity {
                    kind: EntityKind::Email,
                    value: "a@b.com".into(),
                    confidence: 0.95,
                },
                Entity {
                    kind: EntityKind::Phone,
                    value: "555-123-4567".into(),
                    confidence: 0.90,
                },
            ]
        );
    }

    #[test]
    fn extracts_dates() {
        let found = extract_entities("Seen on 3/14/2024 and again 12/1/2025.");
        let dates: Vec<_> = found.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(dates, vec!["3/14/2024", "12/1/2025"]);
        assert!(found.iter().all(|e| e.kind == EntityKind::Date && e.confidence == 0.85));
    }

    #[test]
    fn phone_requires_exact_grouping() {
        assert!(extract_entities("call 5551234567 or 55-123-4567").is_empty());
    }

    #[test]
    fn plain_text_has_no_entities() {
        assert!(extract_entities("nothing to see here").is_empty());
    }

    #[test]
    fn analysis_cleans_and_counts() {
        let mut rng = rand::rngs::mock::StepRng::new(0, 1);
        let a = TextAnalysis::analyze("  Hello World ", &mut rng);
        assert_eq!(a.cleaned, "hello world");
        // "", "", "Hello", "World", "": single-space split counts empties
        assert_eq!(a.word_count, 5);
    }

    #[tokio::test]
    async fn string_payload_becomes_analysis() {
        let out = instant_transform(1)
            .transform(json!("Contact me at a@b.com or 555-123-4567"))
            .await
            .unwrap()
            .data;

        assert_eq!(out["original"], "Contact me at a@b.com or 555-123-4567");
        assert_eq!(out["cleaned"], "contact me at a@b.com or 555-123-4567");
        assert_eq!(out["wordCount"], 6);
        let sentiment = out["sentiment"].as_str().unwrap();
        assert!(sentiment == "positive" || sentiment == "negative");
        assert_eq!(out["entities"][0]["type"], "email");
        assert_eq!(out["entities"][0]["value"], "a@b.com");
        assert_eq!(out["entities"][1]["type"], "phone");
        assert_eq!(out["entities"][1]["value"], "555-123-4567");
    }

    #[tokio::test]
    async fn non_string_payload_passes_through() {
        let payload = json!({ "count": 3, "tags": ["a", "b"] });
        let out = instant_transform(2).transform(payload.clone()).await.unwrap();
        assert_eq!(out.data, payload);
    }
}
