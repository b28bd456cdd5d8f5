//! ProjectTextParser: raw posting text in, `ExtractedDraft` out.
//!
//! Normalizes once, slices sections, then runs every field extractor against
//! the normalized text. Parsing never fails: a posting with nothing
//! recognisable yields an empty draft.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::extraction::budget::{extract_budget, extract_payment_range};
use crate::extraction::fields::{
    classify_work_style, extract_age_limit, extract_attendance_frequency,
    extract_foreigner_acceptable, extract_interview_count, extract_location, extract_pc_provided,
    extract_payment_terms, extract_title, extract_working_days, extract_working_hours,
};
use crate::extraction::languages::extract_language_years;
use crate::extraction::normalize::normalize;
use crate::extraction::sections::{
    pick_section, BACKGROUND_LABELS, DESCRIPTION_LABELS, DUTIES_LABELS, ENVIRONMENT_LABELS,
    LANGUAGE_LABELS, MUST_SKILL_LABELS, NG_LABELS, NICE_SKILL_LABELS,
};
use crate::extraction::skills::split_skills;
use crate::models::draft::{ExtractedDraft, LanguagePair};

const SUMMARY_BULLETS: usize = 3;
const SUMMARY_MIN_BULLETS: usize = 2;
const SUMMARY_MAX_CHARS: usize = 120;

static BULLET_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[・\-−*＊●○■□◆◇▼▶►※]|\d+[.)]|[①-⑳])").unwrap());

#[derive(Debug, Default)]
struct Sections {
    description: Option<String>,
    duties: Option<String>,
    background: Option<String>,
    environment: Option<String>,
    ng: Option<String>,
    must_skills: Option<String>,
    nice_skills: Option<String>,
    languages: Option<String>,
}

impl Sections {
    fn slice(text: &str) -> Self {
        Self {
            description: pick_section(text, DESCRIPTION_LABELS),
            duties: pick_section(text, DUTIES_LABELS),
            background: pick_section(text, BACKGROUND_LABELS),
            environment: pick_section(text, ENVIRONMENT_LABELS),
            ng: pick_section(text, NG_LABELS),
            must_skills: pick_section(text, MUST_SKILL_LABELS),
            nice_skills: pick_section(text, NICE_SKILL_LABELS),
            languages: pick_section(text, LANGUAGE_LABELS),
        }
    }
}

/// Parses one posting.
pub fn parse(raw: &str) -> ExtractedDraft {
    let text = normalize(raw);
    if text.is_empty() {
        return ExtractedDraft::default();
    }
    let sections = Sections::slice(&text);
    let budget = extract_budget(&text);
    let work_style = classify_work_style(&text);

    let draft = ExtractedDraft {
        title: extract_title(&text),
        description: summarize(sections.description.as_deref().or(sections.duties.as_deref())),
        detailed_description: sections.duties.clone(),
        recruitment_background: sections.background.clone(),
        must_skills: split_skills(sections.must_skills.as_deref()),
        nice_skills: split_skills(sections.nice_skills.as_deref()),
        budget_min: budget.and_then(|b| b.min),
        budget_max: budget.and_then(|b| b.max),
        work_style: work_style.is_specified().then_some(work_style),
        location: extract_location(&text),
        working_hours: extract_working_hours(&text),
        working_days: extract_working_days(&text),
        attendance_frequency: extract_attendance_frequency(&text),
        interview_count: extract_interview_count(&text),
        payment_range: extract_payment_range(&text),
        payment_terms: extract_payment_terms(&text),
        age_limit: extract_age_limit(&text),
        foreigner_acceptable: extract_foreigner_acceptable(&text),
        pc_provided: extract_pc_provided(&text),
        ng_conditions: sections.ng.clone(),
        development_environment: sections.environment.clone(),
        language_years: language_years(&text, &sections),
    };

    info!(
        chars = text.chars().count(),
        detected = draft.detected_count(),
        "posting parsed"
    );
    draft
}

/// Preference: explicit 使用言語 line, then the skill and environment
/// sections, then the whole posting. The first non-empty result wins.
fn language_years(text: &str, sections: &Sections) -> Option<Vec<LanguagePair>> {
    let scoped: Vec<&str> = [sections.must_skills.as_deref(), sections.environment.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    let scoped = scoped.join("\n");

    let candidates = [
        ("language_label", sections.languages.as_deref()),
        ("skill_sections", Some(scoped.as_str()).filter(|s| !s.is_empty())),
        ("whole_text", Some(text)),
    ];
    for (source, candidate) in candidates {
        let Some(candidate) = candidate else {
            continue;
        };
        let pairs = extract_language_years(candidate);
        if !pairs.is_empty() {
            debug!(source, count = pairs.len(), "language years detected");
            return Some(pairs);
        }
    }
    None
}

/// Short description: the first bullet lines of the section when it is a
/// bullet list, else its opening characters.
fn summarize(section: Option<&str>) -> Option<String> {
    let section = section?;
    let bullets: Vec<&str> = section
        .lines()
        .map(str::trim)
        .filter(|line| BULLET_LINE_RE.is_match(line))
        .collect();
    if bullets.len() >= SUMMARY_MIN_BULLETS {
        return Some(bullets.into_iter().take(SUMMARY_BULLETS).collect::<Vec<_>>().join("\n"));
    }
    let summary: String = section.chars().take(SUMMARY_MAX_CHARS).collect();
    Some(summary.trim().to_string()).filter(|s| !s.is_empty())
}
