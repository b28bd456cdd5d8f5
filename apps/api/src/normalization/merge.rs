//! Confidence-gated merge of an extracted record into the live form.
//!
//! A value is adopted only when the source has it, its confidence (if any)
//! meets the threshold, and the form field is still empty. Skill lists are
//! unioned instead. Dates are never touched.

use tracing::debug;

use crate::models::draft::{ExtractedDraft, PcProvision};
use crate::models::form::FormState;
use crate::normalization::ConfidenceMap;

pub const DEFAULT_THRESHOLD: f64 = 0.6;

trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.trim().is_empty()
    }
}

impl Blank for u32 {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Blank for bool {
    fn is_blank(&self) -> bool {
        false
    }
}

impl Blank for PcProvision {
    fn is_blank(&self) -> bool {
        matches!(self, PcProvision::Pending(s) if s.trim().is_empty())
    }
}

fn is_empty<T: Blank>(value: &Option<T>) -> bool {
    value.as_ref().map_or(true, Blank::is_blank)
}

fn union_into(target: &mut Vec<String>, incoming: &[String]) {
    for item in incoming {
        if !target.contains(item) {
            target.push(item.clone());
        }
    }
}

/// Folds `source` into `form`. `confidence` keys are camelCase field names;
/// a field without an entry is treated as confident.
pub fn merge(
    mut form: FormState,
    source: &ExtractedDraft,
    confidence: Option<&ConfidenceMap>,
    threshold: f64,
) -> FormState {
    let accepts = |key: &str| {
        confidence
            .and_then(|map| map.get(key))
            .map_or(true, |score| *score >= threshold)
    };
    let mut adopted: Vec<&'static str> = Vec::new();

    macro_rules! fill {
        ($($field:ident => $key:literal),* $(,)?) => {
            $(
                if is_empty(&form.$field) && accepts($key) {
                    if let Some(value) = &source.$field {
                        form.$field = Some(value.clone());
                        adopted.push($key);
                    }
                }
            )*
        };
    }
    fill!(
        title => "title",
        description => "description",
        detailed_description => "detailedDescription",
        recruitment_background => "recruitmentBackground",
        budget_min => "budgetMin",
        budget_max => "budgetMax",
        location => "location",
        working_hours => "workingHours",
        working_days => "workingDays",
        attendance_frequency => "attendanceFrequency",
        interview_count => "interviewCount",
        payment_range => "paymentRange",
        payment_terms => "paymentTerms",
        age_limit => "ageLimit",
        foreigner_acceptable => "foreignerAcceptable",
        pc_provided => "pcProvided",
        ng_conditions => "ngConditions",
        development_environment => "developmentEnvironment",
    );

    if !form.work_style.is_specified() && accepts("workStyle") {
        if let Some(style) = source.work_style.filter(|style| style.is_specified()) {
            form.work_style = style;
            adopted.push("workStyle");
        }
    }

    if let Some(skills) = source.must_skills.as_deref().filter(|_| accepts("mustSkills")) {
        union_into(&mut form.must_skills, skills);
        adopted.push("mustSkills");
    }
    if let Some(skills) = source.nice_skills.as_deref().filter(|_| accepts("niceSkills")) {
        union_into(&mut form.nice_skills, skills);
        adopted.push("niceSkills");
    }

    if !form.has_skill_years() && accepts("languageYears") {
        if let Some(pairs) = source.language_years.as_ref().filter(|pairs| !pairs.is_empty()) {
            form.set_languages(pairs.clone());
            adopted.push("languageYears");
        }
    }

    debug!(?adopted, threshold, "merged into form");
    form
}
