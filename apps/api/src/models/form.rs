//! FormState: the live, user-editable record behind one intake form.
//!
//! Skill/years data lives in three views (combined string, pair list, names
//! string). Only one of them is written at a time; the setters re-derive the
//! other two through the codec so a read never sees them disagree.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::extraction::codec::{
    join_pairs_to_years_list, names_from_years_list, pairs_from_names, pairs_from_years_list,
};
use crate::models::draft::{ExtractedDraft, LanguagePair, PcProvision, WorkStyle};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillYearsViews {
    language_years: String,
    languages: Vec<LanguagePair>,
    language: String,
}

impl SkillYearsViews {
    fn from_pairs(pairs: Vec<LanguagePair>) -> Self {
        let language_years = join_pairs_to_years_list(&pairs);
        let language = names_from_years_list(&language_years);
        Self {
            language_years,
            languages: pairs,
            language,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormState {
    pub title: Option<String>,
    pub description: Option<String>,
    pub detailed_description: Option<String>,
    pub recruitment_background: Option<String>,
    pub must_skills: Vec<String>,
    pub nice_skills: Vec<String>,
    pub budget_min: Option<u32>,
    pub budget_max: Option<u32>,
    pub work_style: WorkStyle,
    pub location: Option<String>,
    pub working_hours: Option<String>,
    pub working_days: Option<String>,
    pub attendance_frequency: Option<String>,
    pub interview_count: Option<u32>,
    pub payment_range: Option<String>,
    pub payment_terms: Option<String>,
    pub age_limit: Option<u32>,
    pub foreigner_acceptable: Option<bool>,
    pub pc_provided: Option<PcProvision>,
    pub ng_conditions: Option<String>,
    pub development_environment: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(flatten)]
    skill_years: SkillYearsViews,
}

/// A partial user edit. Fields left out of the request are untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormEdit {
    #[serde(flatten)]
    pub fields: ExtractedDraft,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

/// Exactly one skill/years view, as edited by the user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SkillYearsEdit {
    LanguageYears(String),
    Languages(Vec<LanguagePair>),
    Language(String),
}

/// Flattened record handed to the persistence API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistenceRecord {
    pub title: Option<String>,
    pub description: Option<String>,
    pub detailed_description: Option<String>,
    pub recruitment_background: Option<String>,
    pub must_skills: Vec<String>,
    pub nice_skills: Vec<String>,
    pub budget_min: Option<u32>,
    pub budget_max: Option<u32>,
    pub work_style: WorkStyle,
    pub location: Option<String>,
    pub working_hours: Option<String>,
    pub working_days: Option<String>,
    pub attendance_frequency: Option<String>,
    pub interview_count: Option<u32>,
    pub payment_range: Option<String>,
    pub payment_terms: Option<String>,
    pub age_limit: Option<u32>,
    pub foreigner_acceptable: Option<bool>,
    pub pc_provided: Option<PcProvision>,
    pub ng_conditions: Option<String>,
    pub development_environment: Option<String>,
    pub language_years: String,
    pub language: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl FormState {
    pub fn language_years(&self) -> &str {
        &self.skill_years.language_years
    }

    pub fn languages(&self) -> &[LanguagePair] {
        &self.skill_years.languages
    }

    pub fn language_names(&self) -> &str {
        &self.skill_years.language
    }

    pub fn has_skill_years(&self) -> bool {
        !self.skill_years.is_empty()
    }

    /// The combined string is authoritative; pairs and names follow it.
    pub fn set_language_years(&mut self, years_list: &str) {
        self.skill_years = SkillYearsViews::from_pairs(pairs_from_years_list(years_list));
    }

    /// The pair list is authoritative; rows with blank names are dropped.
    pub fn set_languages(&mut self, pairs: Vec<LanguagePair>) {
        let pairs = pairs
            .into_iter()
            .filter(|pair| !pair.name.trim().is_empty())
            .map(|pair| LanguagePair::new(pair.name.trim(), pair.years.trim()))
            .collect();
        self.skill_years = SkillYearsViews::from_pairs(pairs);
    }

    /// The names string is authoritative. Names already known keep their years.
    pub fn set_language_names(&mut self, names: &str) {
        let pairs = pairs_from_names(names, &self.skill_years.languages);
        self.skill_years = SkillYearsViews::from_pairs(pairs);
    }

    pub fn apply_skill_edit(&mut self, edit: SkillYearsEdit) {
        match edit {
            SkillYearsEdit::LanguageYears(s) => self.set_language_years(&s),
            SkillYearsEdit::Languages(pairs) => self.set_languages(pairs),
            SkillYearsEdit::Language(names) => self.set_language_names(&names),
        }
    }

    /// Applies a user edit. Every provided field overwrites the current value.
    pub fn apply_edit(&mut self, edit: FormEdit) {
        let FormEdit {
            fields,
            start_date,
            end_date,
        } = edit;

        macro_rules! overwrite {
            ($($field:ident),* $(,)?) => {
                $(if fields.$field.is_some() { self.$field = fields.$field; })*
            };
        }
        overwrite!(
            title,
            description,
            detailed_description,
            recruitment_background,
            budget_min,
            budget_max,
            location,
            working_hours,
            working_days,
            attendance_frequency,
            interview_count,
            payment_range,
            payment_terms,
            age_limit,
            foreigner_acceptable,
            pc_provided,
            ng_conditions,
            development_environment,
        );

        if let Some(skills) = fields.must_skills {
            self.must_skills = skills;
        }
        if let Some(skills) = fields.nice_skills {
            self.nice_skills = skills;
        }
        if let Some(style) = fields.work_style {
            self.work_style = style;
        }
        if let Some(pairs) = fields.language_years {
            self.set_languages(pairs);
        }
        if start_date.is_some() {
            self.start_date = start_date;
        }
        if end_date.is_some() {
            self.end_date = end_date;
        }
    }

    pub fn to_record(&self) -> PersistenceRecord {
        PersistenceRecord {
            title: self.title.clone(),
            description: self.description.clone(),
            detailed_description: self.detailed_description.clone(),
            recruitment_background: self.recruitment_background.clone(),
            must_skills: self.must_skills.clone(),
            nice_skills: self.nice_skills.clone(),
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            work_style: self.work_style,
            location: self.location.clone(),
            working_hours: self.working_hours.clone(),
            working_days: self.working_days.clone(),
            attendance_frequency: self.attendance_frequency.clone(),
            interview_count: self.interview_count,
            payment_range: self.payment_range.clone(),
            payment_terms: self.payment_terms.clone(),
            age_limit: self.age_limit,
            foreigner_acceptable: self.foreigner_acceptable,
            pc_provided: self.pc_provided.clone(),
            ng_conditions: self.ng_conditions.clone(),
            development_environment: self.development_environment.clone(),
            language_years: self.skill_years.language_years.clone(),
            language: self.skill_years.language.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_language_years_derives_other_views() {
        let mut form = FormState::default();
        form.set_language_years("Java 3年, Python 2年以上");
        assert_eq!(
            form.languages(),
            &[LanguagePair::new("Java", "3年"), LanguagePair::new("Python", "2年以上")]
        );
        assert_eq!(form.language_names(), "Java, Python");
    }

    #[test]
    fn test_set_languages_derives_string_views() {
        let mut form = FormState::default();
        form.set_languages(vec![
            LanguagePair::new(" Go ", "1年"),
            LanguagePair::new("", "3年"),
            LanguagePair::new("Rust", ""),
        ]);
        assert_eq!(form.language_years(), "Go 1年, Rust");
        assert_eq!(form.language_names(), "Go, Rust");
        assert_eq!(form.languages().len(), 2);
    }

    #[test]
    fn test_set_language_names_keeps_years_of_remaining_names() {
        let mut form = FormState::default();
        form.set_language_years("Java 3年, Python 2年");
        form.set_language_names("Python, TypeScript");
        assert_eq!(form.language_years(), "Python 2年, TypeScript");
        assert_eq!(
            form.languages(),
            &[LanguagePair::new("Python", "2年"), LanguagePair::new("TypeScript", "")]
        );
    }

    #[test]
    fn test_apply_skill_edit_last_write_wins() {
        let mut form = FormState::default();
        form.apply_skill_edit(SkillYearsEdit::Language("Java".to_string()));
        form.apply_skill_edit(SkillYearsEdit::LanguageYears("Kotlin 2年".to_string()));
        assert_eq!(form.language_names(), "Kotlin");
        assert_eq!(form.languages(), &[LanguagePair::new("Kotlin", "2年")]);
    }

    #[test]
    fn test_skill_edit_deserializes_from_tagged_json() {
        let edit: SkillYearsEdit =
            serde_json::from_str(r#"{"languageYears": "Java 3年"}"#).unwrap();
        assert_eq!(edit, SkillYearsEdit::LanguageYears("Java 3年".to_string()));
        let edit: SkillYearsEdit =
            serde_json::from_str(r#"{"languages": [{"name": "Go", "years": "1年"}]}"#).unwrap();
        assert_eq!(edit, SkillYearsEdit::Languages(vec![LanguagePair::new("Go", "1年")]));
    }

    #[test]
    fn test_apply_edit_only_touches_provided_fields() {
        let mut form = FormState {
            title: Some("旧タイトル".to_string()),
            location: Some("東京".to_string()),
            ..Default::default()
        };
        let edit: FormEdit = serde_json::from_str(
            r#"{"title": "新タイトル", "budgetMax": 90, "startDate": "2026-11-01"}"#,
        )
        .unwrap();
        form.apply_edit(edit);
        assert_eq!(form.title.as_deref(), Some("新タイトル"));
        assert_eq!(form.location.as_deref(), Some("東京"));
        assert_eq!(form.budget_max, Some(90));
        assert_eq!(form.start_date, NaiveDate::from_ymd_opt(2026, 11, 1));
    }

    #[test]
    fn test_record_serializes_dates_and_numbers() {
        let mut form = FormState {
            budget_min: Some(60),
            work_style: WorkStyle::Remote,
            start_date: NaiveDate::from_ymd_opt(2026, 12, 1),
            ..Default::default()
        };
        form.set_language_years("Java 3年");
        let json = serde_json::to_value(form.to_record()).unwrap();
        assert_eq!(json["budgetMin"], 60);
        assert_eq!(json["workStyle"], "remote");
        assert_eq!(json["startDate"], "2026-12-01");
        assert_eq!(json["languageYears"], "Java 3年");
        assert_eq!(json["language"], "Java");
    }

    #[test]
    fn test_form_state_serializes_all_three_views() {
        let mut form = FormState::default();
        form.set_language_years("Go 2年");
        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["languageYears"], "Go 2年");
        assert_eq!(json["language"], "Go");
        assert_eq!(json["languages"][0]["name"], "Go");
    }
}
