use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::extraction::parse;
use crate::models::draft::ExtractedDraft;
use crate::models::form::FormState;
use crate::normalization::{merge, normalize_with_fallback, AiNormalizer};

/// One form instance: its state plus the token of the newest extract request.
#[derive(Debug, Default)]
pub struct FormSession {
    pub form: FormState,
    latest_token: u64,
}

impl FormSession {
    /// Starts a new extract request. Every earlier token becomes stale.
    pub fn begin_request(&mut self) -> u64 {
        self.latest_token += 1;
        self.latest_token
    }

    pub fn is_current(&self, token: u64) -> bool {
        token == self.latest_token
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExtractSettings {
    pub ai_timeout: Duration,
    pub threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractStatus {
    /// The result was merged into the form.
    Applied,
    /// A newer request started while this one waited on the AI call.
    Stale,
}

#[derive(Debug, Serialize)]
pub struct ExtractOutcome {
    pub status: ExtractStatus,
    pub draft: ExtractedDraft,
    pub form: FormState,
    pub warnings: Vec<String>,
}

/// Parses `raw_text`, asks the AI normalizer, and merges both into the form:
/// the AI record first (confidence-gated), then the heuristic draft into
/// whatever is still empty. The session lock is released while the AI call
/// is pending; if another request started meanwhile, nothing is merged.
pub async fn run_extract(
    session: &Mutex<FormSession>,
    normalizer: &dyn AiNormalizer,
    raw_text: &str,
    settings: ExtractSettings,
) -> ExtractOutcome {
    let token = session.lock().await.begin_request();
    let draft = parse(raw_text);
    debug!(token, detected = draft.detected_count(), "extract started");

    let ai = normalize_with_fallback(normalizer, raw_text, &draft, settings.ai_timeout).await;
    let warnings: Vec<String> = ai.warning.into_iter().collect();

    let mut guard = session.lock().await;
    if !guard.is_current(token) {
        info!(token, "discarding stale extract result");
        return ExtractOutcome {
            status: ExtractStatus::Stale,
            draft,
            form: guard.form.clone(),
            warnings,
        };
    }

    let mut form = std::mem::take(&mut guard.form);
    if let Some(record) = &ai.record {
        form = merge(form, &record.draft, Some(&record.confidence), settings.threshold);
    }
    form = merge(form, &draft, None, settings.threshold);
    guard.form = form.clone();

    ExtractOutcome {
        status: ExtractStatus::Applied,
        draft,
        form,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::draft::WorkStyle;
    use crate::normalization::stub::StubNormalizer;
    use crate::normalization::{AiRecord, ConfidenceMap, FALLBACK_WARNING};

    const SETTINGS: ExtractSettings = ExtractSettings {
        ai_timeout: Duration::from_secs(20),
        threshold: 0.6,
    };

    fn ai_record(title: &str, confidence: f64) -> AiRecord {
        AiRecord {
            draft: ExtractedDraft {
                title: Some(title.to_string()),
                work_style: Some(WorkStyle::Remote),
                ..Default::default()
            },
            confidence: ConfidenceMap::from([("title".to_string(), confidence)]),
        }
    }

    #[test]
    fn test_tokens_increase_and_invalidate() {
        let mut session = FormSession::default();
        let first = session.begin_request();
        let second = session.begin_request();
        assert!(second > first);
        assert!(!session.is_current(first));
        assert!(session.is_current(second));
    }

    #[tokio::test]
    async fn test_ai_value_wins_over_heuristic() {
        let session = Mutex::new(FormSession::default());
        let normalizer = StubNormalizer::returning(ai_record("AI案件名", 0.9));
        let outcome = run_extract(&session, &normalizer, "案件名：手書き案件名\n単価：60万", SETTINGS).await;

        assert_eq!(outcome.status, ExtractStatus::Applied);
        assert_eq!(outcome.draft.title.as_deref(), Some("手書き案件名"));
        assert_eq!(outcome.form.title.as_deref(), Some("AI案件名"));
        assert_eq!(outcome.form.budget_min, Some(60));
        assert!(outcome.warnings.is_empty());
        assert_eq!(session.lock().await.form, outcome.form);
    }

    #[tokio::test]
    async fn test_low_confidence_ai_value_falls_back_to_heuristic() {
        let session = Mutex::new(FormSession::default());
        let normalizer = StubNormalizer::returning(ai_record("AI案件名", 0.3));
        let outcome = run_extract(&session, &normalizer, "案件名：手書き案件名", SETTINGS).await;
        assert_eq!(outcome.form.title.as_deref(), Some("手書き案件名"));
        assert_eq!(outcome.form.work_style, WorkStyle::Remote);
    }

    #[tokio::test]
    async fn test_ai_failure_keeps_heuristic_and_warns() {
        let session = Mutex::new(FormSession::default());
        let outcome = run_extract(
            &session,
            &StubNormalizer::failing(),
            "案件名：Java案件\n単価：70万",
            SETTINGS,
        )
        .await;
        assert_eq!(outcome.status, ExtractStatus::Applied);
        assert_eq!(outcome.form.title.as_deref(), Some("Java案件"));
        assert_eq!(outcome.form.budget_min, Some(70));
        assert_eq!(outcome.warnings, vec![FALLBACK_WARNING.to_string()]);
    }

    #[tokio::test]
    async fn test_user_edits_survive_extract() {
        let session = Mutex::new(FormSession::default());
        session.lock().await.form.title = Some("ユーザー入力".to_string());
        let normalizer = StubNormalizer::returning(ai_record("AI案件名", 0.95));
        let outcome = run_extract(&session, &normalizer, "案件名：別名", SETTINGS).await;
        assert_eq!(outcome.form.title.as_deref(), Some("ユーザー入力"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_result_is_discarded() {
        let session = Arc::new(Mutex::new(FormSession::default()));
        let slow = Arc::new(StubNormalizer {
            record: Some(ai_record("古い結果", 1.0)),
            delay: Duration::from_secs(10),
        });

        let first = tokio::spawn({
            let session = Arc::clone(&session);
            let slow = Arc::clone(&slow);
            async move { run_extract(&session, slow.as_ref(), "案件名：古い案件", SETTINGS).await }
        });
        // Let the first request take its token and park on the AI call.
        tokio::task::yield_now().await;

        let fast = StubNormalizer::returning(ai_record("新しい結果", 1.0));
        let second = run_extract(&session, &fast, "案件名：新しい案件", SETTINGS).await;
        assert_eq!(second.status, ExtractStatus::Applied);

        let first = first.await.unwrap();
        assert_eq!(first.status, ExtractStatus::Stale);
        assert_eq!(first.form.title.as_deref(), Some("新しい結果"));
        assert_eq!(session.lock().await.form.title.as_deref(), Some("新しい結果"));
    }
}
