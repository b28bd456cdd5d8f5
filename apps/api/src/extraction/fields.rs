//! Single-purpose scalar extractors. Each takes normalized text and returns
//! `None` (or `WorkStyle::Unspecified`) when nothing is detected.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extraction::normalize::normalize_inline;
use crate::extraction::sections::{
    is_known_heading, pick_value, ATTENDANCE_LABELS, FOREIGNER_LABELS, LOCATION_LABELS,
    PAYMENT_TERMS_LABELS, PC_LABELS, TITLE_LABELS, WORKING_DAYS_LABELS, WORKING_HOURS_LABELS,
};
use crate::models::draft::{PcProvision, WorkStyle};

pub const FULL_REMOTE: &str = "フルリモート";
const MAX_TITLE_CHARS: usize = 60;

// ────────────────────────────────────────────────────────────────────────────
// Work style
// ────────────────────────────────────────────────────────────────────────────

static REMOTE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)フルリモート|完全リモート|完全在宅|フル在宅|常時リモート|full\s*remote|fully\s*remote")
        .unwrap()
});
static HYBRID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)ハイブリッド|リモート併用|一部リモート|リモート可|在宅併用|週\s*[1-4]\s*(?:日|回)?\s*(?:程度)?\s*出社|週\s*\d\s*(?:日|回)?\s*(?:程度)?\s*(?:リモート|在宅)|月\s*\d+\s*(?:日|回)?\s*(?:程度)?\s*出社|hybrid",
    )
    .unwrap()
});
static ONSITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)フル出社|常駐|出社|オンサイト|客先|on-?site").unwrap()
});

/// Classifies work style by keyword set. Sets are checked in the order
/// remote, hybrid, onsite; the first hit wins.
pub fn classify_work_style(text: &str) -> WorkStyle {
    if REMOTE_RE.is_match(text) {
        WorkStyle::Remote
    } else if HYBRID_RE.is_match(text) {
        WorkStyle::Hybrid
    } else if ONSITE_RE.is_match(text) {
        WorkStyle::Onsite
    } else {
        WorkStyle::Unspecified
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Japanese yes/no coercion
// ────────────────────────────────────────────────────────────────────────────

// Checked before the affirmative tokens: 不可 contains 可.
const NEGATIVE_TOKENS: &[&str] = &["不可", "なし", "無し", "持参"];
const AFFIRMATIVE_TOKENS: &[&str] = &["可能", "あり", "有り", "可", "貸与", "支給"];
// Whole-value matches only: 無 and 有 also start words like 無償 and 有償.
const NEGATIVE_WORDS: &[&str] = &["no", "false", "無"];
const AFFIRMATIVE_WORDS: &[&str] = &["yes", "true", "有"];
const PENDING_TOKENS: &[&str] = &["要相談", "確認中"];

/// Maps 可/不可-style answers to a boolean.
pub fn coerce_bool_ja(text: &str) -> Option<bool> {
    let value = text.trim().to_lowercase();
    if value.is_empty() {
        return None;
    }
    if NEGATIVE_WORDS.contains(&value.as_str()) {
        return Some(false);
    }
    if AFFIRMATIVE_WORDS.contains(&value.as_str()) {
        return Some(true);
    }
    if NEGATIVE_TOKENS.iter().any(|t| value.contains(t)) {
        return Some(false);
    }
    if AFFIRMATIVE_TOKENS.iter().any(|t| value.contains(t)) {
        return Some(true);
    }
    None
}

/// Like [`coerce_bool_ja`], but 要相談 / 確認中 are kept as literals.
pub fn coerce_pc_provision(text: &str) -> Option<PcProvision> {
    if let Some(pending) = PENDING_TOKENS.iter().find(|t| text.contains(*t)) {
        return Some(PcProvision::Pending(pending.to_string()));
    }
    coerce_bool_ja(text).map(PcProvision::Flag)
}

/// Text following the first occurrence of any label on the first line that
/// mentions one. Used when the label is not formatted as a heading
/// ("外国籍不可", "PC貸与あり").
fn trailing_after_label<'a>(text: &'a str, labels: &[&str]) -> Option<&'a str> {
    text.lines().find_map(|line| {
        labels
            .iter()
            .find_map(|label| line.find(label).map(|idx| &line[idx + label.len()..]))
    })
}

pub fn extract_foreigner_acceptable(text: &str) -> Option<bool> {
    if let Some(value) = pick_value(text, FOREIGNER_LABELS) {
        if let Some(flag) = coerce_bool_ja(&value) {
            return Some(flag);
        }
    }
    trailing_after_label(text, FOREIGNER_LABELS).and_then(coerce_bool_ja)
}

pub fn extract_pc_provided(text: &str) -> Option<PcProvision> {
    if let Some(value) = pick_value(text, PC_LABELS) {
        if let Some(pc) = coerce_pc_provision(&value) {
            return Some(pc);
        }
    }
    trailing_after_label(text, PC_LABELS).and_then(coerce_pc_provision)
}

// ────────────────────────────────────────────────────────────────────────────
// Integers
// ────────────────────────────────────────────────────────────────────────────

static AGE_LIMIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s*歳\s*(?:まで|以下)").unwrap());
static INTERVIEW_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"面談(?:回数)?\s*[:：]?\s*(\d+)").unwrap());

fn first_number(re: &Regex, text: &str) -> Option<u32> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// `45歳まで` / `45歳以下` → 45.
pub fn extract_age_limit(text: &str) -> Option<u32> {
    first_number(&AGE_LIMIT_RE, text)
}

/// `面談：2回` / `面談回数1` → count.
pub fn extract_interview_count(text: &str) -> Option<u32> {
    first_number(&INTERVIEW_COUNT_RE, text)
}

// ────────────────────────────────────────────────────────────────────────────
// Labelled single-line values
// ────────────────────────────────────────────────────────────────────────────

fn labelled(text: &str, labels: &[&str]) -> Option<String> {
    pick_value(text, labels)
        .map(|value| normalize_inline(&value))
        .filter(|value| !value.is_empty())
}

/// Explicit location label, else フルリモート when the posting says so.
pub fn extract_location(text: &str) -> Option<String> {
    labelled(text, LOCATION_LABELS).or_else(|| full_remote_fallback(text))
}

/// Explicit attendance label, else フルリモート when the posting says so.
pub fn extract_attendance_frequency(text: &str) -> Option<String> {
    labelled(text, ATTENDANCE_LABELS).or_else(|| full_remote_fallback(text))
}

fn full_remote_fallback(text: &str) -> Option<String> {
    text.contains(FULL_REMOTE).then(|| FULL_REMOTE.to_string())
}

pub fn extract_working_hours(text: &str) -> Option<String> {
    labelled(text, WORKING_HOURS_LABELS)
}

pub fn extract_working_days(text: &str) -> Option<String> {
    labelled(text, WORKING_DAYS_LABELS)
}

pub fn extract_payment_terms(text: &str) -> Option<String> {
    labelled(text, PAYMENT_TERMS_LABELS)
}

/// Title label, else the first short line that is not a heading.
pub fn extract_title(text: &str) -> Option<String> {
    labelled(text, TITLE_LABELS).or_else(|| {
        text.lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .filter(|line| !is_known_heading(line) && line.chars().count() <= MAX_TITLE_CHARS)
            .map(str::to_string)
    })
}
