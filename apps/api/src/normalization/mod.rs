//! AI normalization: an external endpoint re-reads the posting and returns an
//! ExtractedDraft-shaped record with per-field confidence.
//!
//! `AppState` holds an `Arc<dyn AiNormalizer>`: `HttpAiNormalizer` when an
//! endpoint is configured, `DisabledNormalizer` otherwise. Callers go through
//! [`normalize_with_fallback`], which turns every failure into a warning so the
//! heuristic draft always survives.

pub mod merge;
pub mod prompts;

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::ai_client::{AiClient, AiError, AiRequest};
use crate::models::draft::ExtractedDraft;

pub use merge::merge;

/// Field name (camelCase) → confidence in [0, 1].
pub type ConfidenceMap = HashMap<String, f64>;

const CONFIDENCE_KEY: &str = "_confidence";
const UNKNOWN_MARKER: &str = "不明";

pub const FALLBACK_WARNING: &str =
    "AI補正を利用できなかったため、ルールベースの抽出結果のみを反映しました";

/// One decoded endpoint response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AiRecord {
    pub draft: ExtractedDraft,
    pub confidence: ConfidenceMap,
}

impl AiRecord {
    /// Decodes a response body. Placeholder values ("" / 不明 / null) are
    /// stripped first; a field whose value still does not fit its type is
    /// dropped on its own instead of failing the whole record.
    pub fn from_value(value: Value) -> Result<Self, AiError> {
        let mut object: Map<String, Value> = serde_json::from_value(value)?;
        let confidence = object
            .remove(CONFIDENCE_KEY)
            .map(parse_confidence)
            .unwrap_or_default();

        let mut fields = Map::new();
        for (key, value) in object {
            let Some(value) = strip_placeholders(value) else {
                continue;
            };
            let mut probe = Map::new();
            probe.insert(key.clone(), value.clone());
            if let Err(e) = serde_json::from_value::<ExtractedDraft>(Value::Object(probe)) {
                warn!(field = %key, "dropping AI field with unexpected shape: {e}");
                continue;
            }
            fields.insert(key, value);
        }

        Ok(Self {
            draft: serde_json::from_value(Value::Object(fields))?,
            confidence,
        })
    }
}

fn parse_confidence(value: Value) -> ConfidenceMap {
    let Value::Object(entries) = value else {
        return ConfidenceMap::new();
    };
    entries
        .into_iter()
        .filter_map(|(key, value)| {
            let score = value.as_f64().filter(|score| score.is_finite())?;
            Some((key, score.clamp(0.0, 1.0)))
        })
        .collect()
}

/// Removes empty strings, 不明 and nulls, recursing into arrays and objects.
/// Containers left empty are removed too.
fn strip_placeholders(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() || trimmed == UNKNOWN_MARKER {
                None
            } else {
                Some(Value::String(s))
            }
        }
        Value::Array(items) => {
            let items: Vec<Value> = items.into_iter().filter_map(strip_placeholders).collect();
            (!items.is_empty()).then_some(Value::Array(items))
        }
        Value::Object(entries) => {
            let entries: Map<String, Value> = entries
                .into_iter()
                .filter_map(|(key, value)| strip_placeholders(value).map(|value| (key, value)))
                .collect();
            (!entries.is_empty()).then_some(Value::Object(entries))
        }
        other => Some(other),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The AI normalization backend. Implement this to swap backends without
/// touching handlers or the merge step.
#[async_trait]
pub trait AiNormalizer: Send + Sync {
    async fn normalize(&self, raw_text: &str, draft: &ExtractedDraft)
        -> Result<AiRecord, AiError>;

    /// Short backend name for logs and responses.
    fn backend(&self) -> &'static str;
}

/// Calls the configured HTTP endpoint.
pub struct HttpAiNormalizer {
    client: AiClient,
}

impl HttpAiNormalizer {
    pub fn new(client: AiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AiNormalizer for HttpAiNormalizer {
    async fn normalize(
        &self,
        raw_text: &str,
        draft: &ExtractedDraft,
    ) -> Result<AiRecord, AiError> {
        let request = AiRequest {
            instruction: prompts::NORMALIZE_INSTRUCTION,
            data: draft,
            raw_text: Some(raw_text),
        };
        let value: Value = self.client.call_json(&request).await?;
        AiRecord::from_value(value)
    }

    fn backend(&self) -> &'static str {
        "http"
    }
}

/// Used when no endpoint is configured.
pub struct DisabledNormalizer;

#[async_trait]
impl AiNormalizer for DisabledNormalizer {
    async fn normalize(
        &self,
        _raw_text: &str,
        _draft: &ExtractedDraft,
    ) -> Result<AiRecord, AiError> {
        Err(AiError::Disabled)
    }

    fn backend(&self) -> &'static str {
        "disabled"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback wrapper
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct AiOutcome {
    pub record: Option<AiRecord>,
    pub warning: Option<String>,
}

/// Runs the normalizer under `limit`. Any error or timeout yields no record
/// and a user-facing warning.
pub async fn normalize_with_fallback(
    normalizer: &dyn AiNormalizer,
    raw_text: &str,
    draft: &ExtractedDraft,
    limit: Duration,
) -> AiOutcome {
    let result = match tokio::time::timeout(limit, normalizer.normalize(raw_text, draft)).await {
        Ok(result) => result,
        Err(_) => Err(AiError::Timeout(limit)),
    };

    match result {
        Ok(record) => {
            info!(
                backend = normalizer.backend(),
                fields = record.draft.detected_count(),
                "AI normalization succeeded"
            );
            AiOutcome {
                record: Some(record),
                warning: None,
            }
        }
        Err(e) => {
            warn!(backend = normalizer.backend(), "AI normalization failed: {e}");
            AiOutcome {
                record: None,
                warning: Some(FALLBACK_WARNING.to_string()),
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::stub::StubNormalizer;
    use super::*;
    use crate::models::draft::{LanguagePair, PcProvision, WorkStyle};
    use serde_json::json;

    #[test]
    fn test_record_strips_placeholders() {
        let record = AiRecord::from_value(json!({
            "title": "決済API開発",
            "location": "不明",
            "workingHours": "",
            "paymentTerms": null,
            "mustSkills": ["Java", "", "不明", "AWS"],
            "niceSkills": ["不明"],
        }))
        .unwrap();
        assert_eq!(record.draft.title.as_deref(), Some("決済API開発"));
        assert_eq!(record.draft.location, None);
        assert_eq!(record.draft.working_hours, None);
        assert_eq!(record.draft.payment_terms, None);
        assert_eq!(
            record.draft.must_skills,
            Some(vec!["Java".to_string(), "AWS".to_string()])
        );
        assert_eq!(record.draft.nice_skills, None);
    }

    #[test]
    fn test_record_reads_confidence_and_clamps() {
        let record = AiRecord::from_value(json!({
            "budgetMin": 60,
            "workStyle": "remote",
            "_confidence": {"budgetMin": 0.7, "workStyle": 1.4, "title": "high"},
        }))
        .unwrap();
        assert_eq!(record.draft.budget_min, Some(60));
        assert_eq!(record.draft.work_style, Some(WorkStyle::Remote));
        assert_eq!(record.confidence.get("budgetMin"), Some(&0.7));
        assert_eq!(record.confidence.get("workStyle"), Some(&1.0));
        assert!(!record.confidence.contains_key("title"));
    }

    #[test]
    fn test_record_drops_mistyped_field_only() {
        let record = AiRecord::from_value(json!({
            "title": "インフラ構築",
            "budgetMin": "応相談",
            "pcProvided": "要相談",
            "languageYears": "Java 3年, Go",
        }))
        .unwrap();
        assert_eq!(record.draft.title.as_deref(), Some("インフラ構築"));
        assert_eq!(record.draft.budget_min, None);
        assert_eq!(
            record.draft.pc_provided,
            Some(PcProvision::Pending("要相談".to_string()))
        );
        assert_eq!(
            record.draft.language_years,
            Some(vec![LanguagePair::new("Java", "3年"), LanguagePair::new("Go", "")])
        );
    }

    #[test]
    fn test_record_rejects_non_object() {
        assert!(matches!(
            AiRecord::from_value(json!(["title"])),
            Err(AiError::Parse(_))
        ));
    }

    #[tokio::test]
    async fn test_fallback_passes_record_through() {
        let record = AiRecord {
            draft: ExtractedDraft {
                title: Some("Go開発".to_string()),
                ..Default::default()
            },
            confidence: ConfidenceMap::new(),
        };
        let normalizer = StubNormalizer::returning(record.clone());
        let outcome = normalize_with_fallback(
            &normalizer,
            "本文",
            &ExtractedDraft::default(),
            Duration::from_secs(5),
        )
        .await;
        assert_eq!(outcome.record, Some(record));
        assert!(outcome.warning.is_none());
    }

    #[tokio::test]
    async fn test_fallback_on_error_warns() {
        let outcome = normalize_with_fallback(
            &StubNormalizer::failing(),
            "本文",
            &ExtractedDraft::default(),
            Duration::from_secs(5),
        )
        .await;
        assert!(outcome.record.is_none());
        assert_eq!(outcome.warning.as_deref(), Some(FALLBACK_WARNING));
    }

    #[tokio::test]
    async fn test_fallback_when_disabled() {
        let outcome = normalize_with_fallback(
            &DisabledNormalizer,
            "本文",
            &ExtractedDraft::default(),
            Duration::from_secs(5),
        )
        .await;
        assert!(outcome.record.is_none());
        assert!(outcome.warning.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_on_timeout() {
        let normalizer = StubNormalizer {
            record: Some(AiRecord::default()),
            delay: Duration::from_secs(60),
        };
        let outcome = normalize_with_fallback(
            &normalizer,
            "本文",
            &ExtractedDraft::default(),
            Duration::from_secs(20),
        )
        .await;
        assert!(outcome.record.is_none());
        assert!(outcome.warning.is_some());
    }
}
