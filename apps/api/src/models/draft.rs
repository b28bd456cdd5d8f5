//! ExtractedDraft: the immutable result of one parse request.
//!
//! Every field is optional. `None` means "not detected"; extractors never emit
//! placeholder strings such as "" or "不明".

use serde::{Deserialize, Serialize};

use crate::extraction::codec;

/// How the engineer is expected to work. `Unspecified` is the classifier's
/// explicit "no style detected" answer and serializes as `""`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkStyle {
    Remote,
    Onsite,
    Hybrid,
    #[default]
    #[serde(rename = "")]
    Unspecified,
}

impl WorkStyle {
    pub fn is_specified(self) -> bool {
        self != WorkStyle::Unspecified
    }
}

/// PC provision is either a yes/no answer or a pending literal (要相談 / 確認中).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PcProvision {
    Flag(bool),
    Pending(String),
}

/// One technology with its required years of experience.
/// `years` is `"<N>年"`, `"<N>年以上"` or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub name: String,
    #[serde(default)]
    pub years: String,
}

impl LanguagePair {
    pub fn new(name: impl Into<String>, years: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            years: years.into(),
        }
    }

    pub fn has_years(&self) -> bool {
        !self.years.is_empty()
    }
}

/// Budget bounds in 万円. Either side may be missing ("~120万" has no minimum).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetRange {
    pub min: Option<u32>,
    pub max: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detailed_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recruitment_background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must_skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nice_skills: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_min: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_style: Option<WorkStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_days: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interview_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreigner_acceptable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pc_provided: Option<PcProvision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ng_conditions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub development_environment: Option<String>,
    /// Accepts either a pair array or a `"Java 3年, Python"` string on input.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "codec::deserialize_optional_pairs"
    )]
    pub language_years: Option<Vec<LanguagePair>>,
}

impl ExtractedDraft {
    /// Number of detected fields, used for logging and the extract response.
    pub fn detected_count(&self) -> usize {
        [
            self.title.is_some(),
            self.description.is_some(),
            self.detailed_description.is_some(),
            self.recruitment_background.is_some(),
            self.must_skills.is_some(),
            self.nice_skills.is_some(),
            self.budget_min.is_some(),
            self.budget_max.is_some(),
            self.work_style.is_some(),
            self.location.is_some(),
            self.working_hours.is_some(),
            self.working_days.is_some(),
            self.attendance_frequency.is_some(),
            self.interview_count.is_some(),
            self.payment_range.is_some(),
            self.payment_terms.is_some(),
            self.age_limit.is_some(),
            self.foreigner_acceptable.is_some(),
            self.pc_provided.is_some(),
            self.ng_conditions.is_some(),
            self.development_environment.is_some(),
            self.language_years.is_some(),
        ]
        .iter()
        .filter(|detected| **detected)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_omitted_on_serialize() {
        let draft = ExtractedDraft {
            title: Some("Java開発".to_string()),
            budget_min: Some(80),
            ..Default::default()
        };
        let json = serde_json::to_value(&draft).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["title"], "Java開発");
        assert_eq!(obj["budgetMin"], 80);
    }

    #[test]
    fn test_work_style_serde() {
        assert_eq!(serde_json::to_string(&WorkStyle::Remote).unwrap(), r#""remote""#);
        assert_eq!(serde_json::to_string(&WorkStyle::Unspecified).unwrap(), r#""""#);
        let parsed: WorkStyle = serde_json::from_str(r#""hybrid""#).unwrap();
        assert_eq!(parsed, WorkStyle::Hybrid);
    }

    #[test]
    fn test_pc_provision_untagged() {
        let flag: PcProvision = serde_json::from_str("true").unwrap();
        assert_eq!(flag, PcProvision::Flag(true));
        let pending: PcProvision = serde_json::from_str(r#""要相談""#).unwrap();
        assert_eq!(pending, PcProvision::Pending("要相談".to_string()));
    }

    #[test]
    fn test_language_years_accepts_string_or_array() {
        let from_string: ExtractedDraft =
            serde_json::from_str(r#"{"languageYears": "Java 3年, Python"}"#).unwrap();
        let from_array: ExtractedDraft = serde_json::from_str(
            r#"{"languageYears": [{"name": "Java", "years": "3年"}, {"name": "Python"}]}"#,
        )
        .unwrap();
        let expected = vec![LanguagePair::new("Java", "3年"), LanguagePair::new("Python", "")];
        assert_eq!(from_string.language_years, Some(expected.clone()));
        assert_eq!(from_array.language_years, Some(expected));
    }

    #[test]
    fn test_detected_count() {
        let draft = ExtractedDraft {
            work_style: Some(WorkStyle::Hybrid),
            age_limit: Some(45),
            language_years: Some(vec![]),
            ..Default::default()
        };
        assert_eq!(draft.detected_count(), 3);
        assert_eq!(ExtractedDraft::default().detected_count(), 0);
    }
}
