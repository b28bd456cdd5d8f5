//! Conversions between the three views of skill/years data a form carries:
//! the combined `"Java 3年, Python 2年以上"` string, the list of
//! [`LanguagePair`]s, and the names-only `"Java, Python"` string.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};

use crate::models::draft::LanguagePair;

static LIST_SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,、，]").unwrap());

// "Java 3年" / "Python2年以上" / "Go 1 年"
static NAME_YEARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*(\d+)\s*年(以上)?$").unwrap());

fn list_tokens(s: &str) -> impl Iterator<Item = &str> {
    LIST_SEPARATOR_RE
        .split(s)
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Formats a year count the way every view stores it: `"3年"` or `"3年以上"`.
pub fn format_years(count: u32, or_more: bool) -> String {
    if or_more {
        format!("{count}年以上")
    } else {
        format!("{count}年")
    }
}

/// Splits a combined years list into pairs. Tokens without a year suffix
/// become pairs with empty years.
pub fn pairs_from_years_list(s: &str) -> Vec<LanguagePair> {
    list_tokens(s)
        .map(|token| match NAME_YEARS_RE.captures(token) {
            Some(caps) => {
                let name = caps[1].trim();
                match caps[2].parse::<u32>() {
                    Ok(count) if !name.is_empty() => {
                        LanguagePair::new(name, format_years(count, caps.get(3).is_some()))
                    }
                    _ => LanguagePair::new(token, ""),
                }
            }
            None => LanguagePair::new(token, ""),
        })
        .collect()
}

/// Joins pairs as `"<name> <years>"`, dropping the years token when empty.
pub fn join_pairs_to_years_list(pairs: &[LanguagePair]) -> String {
    pairs
        .iter()
        .filter(|pair| !pair.name.trim().is_empty())
        .map(|pair| {
            if pair.has_years() {
                format!("{} {}", pair.name.trim(), pair.years)
            } else {
                pair.name.trim().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Strips every year suffix and returns the deduplicated names.
pub fn names_from_years_list(s: &str) -> String {
    let mut names: Vec<String> = Vec::new();
    for pair in pairs_from_years_list(s) {
        if !names.contains(&pair.name) {
            names.push(pair.name);
        }
    }
    names.join(", ")
}

/// Rebuilds pairs from a names-only edit. Names that already had years in
/// `previous` keep them; new names get empty years.
pub fn pairs_from_names(names: &str, previous: &[LanguagePair]) -> Vec<LanguagePair> {
    let mut pairs: Vec<LanguagePair> = Vec::new();
    for name in list_tokens(names) {
        if pairs.iter().any(|pair| pair.name == name) {
            continue;
        }
        let years = previous
            .iter()
            .find(|pair| pair.name == name)
            .map(|pair| pair.years.clone())
            .unwrap_or_default();
        pairs.push(LanguagePair::new(name, years));
    }
    pairs
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PairsOrYearsList {
    YearsList(String),
    Pairs(Vec<LanguagePair>),
}

/// Serde helper for `languageYears`: accepts a pair array or a combined years
/// string. An empty string or array deserializes to `None`.
pub fn deserialize_optional_pairs<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<LanguagePair>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<PairsOrYearsList>::deserialize(deserializer)?;
    let pairs = match raw {
        Some(PairsOrYearsList::YearsList(s)) => pairs_from_years_list(&s),
        Some(PairsOrYearsList::Pairs(pairs)) => pairs
            .into_iter()
            .filter(|pair| !pair.name.trim().is_empty())
            .collect(),
        None => return Ok(None),
    };
    Ok(if pairs.is_empty() { None } else { Some(pairs) })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pairs_from_years_list_mixed() {
        let pairs = pairs_from_years_list("Java 3年, Python 2年以上, Go");
        assert_eq!(
            pairs,
            vec![
                LanguagePair::new("Java", "3年"),
                LanguagePair::new("Python", "2年以上"),
                LanguagePair::new("Go", ""),
            ]
        );
    }

    #[test]
    fn test_pairs_from_years_list_tolerates_spacing_and_ja_commas() {
        let pairs = pairs_from_years_list(" Java3年 、 C# 5 年以上 ,, ");
        assert_eq!(
            pairs,
            vec![LanguagePair::new("Java", "3年"), LanguagePair::new("C#", "5年以上")]
        );
    }

    #[test]
    fn test_pairs_from_empty_list() {
        assert!(pairs_from_years_list("").is_empty());
        assert!(pairs_from_years_list(" , ").is_empty());
    }

    #[test]
    fn test_join_omits_empty_years() {
        let pairs = vec![
            LanguagePair::new("Java", "3年"),
            LanguagePair::new("Go", ""),
            LanguagePair::new("  ", "2年"),
        ];
        assert_eq!(join_pairs_to_years_list(&pairs), "Java 3年, Go");
    }

    #[test]
    fn test_round_trip_pairs_preserve_order() {
        let pairs = vec![
            LanguagePair::new("TypeScript", "2年以上"),
            LanguagePair::new("Java", "3年"),
            LanguagePair::new("SQL", ""),
            LanguagePair::new("C++", "10年"),
        ];
        assert_eq!(pairs_from_years_list(&join_pairs_to_years_list(&pairs)), pairs);
    }

    #[test]
    fn test_round_trip_string_up_to_whitespace() {
        let s = "Java  3年,Python 2年以上 ,  Go";
        assert_eq!(
            join_pairs_to_years_list(&pairs_from_years_list(s)),
            "Java 3年, Python 2年以上, Go"
        );
    }

    #[test]
    fn test_names_from_years_list_dedupes() {
        assert_eq!(
            names_from_years_list("Java 3年, Python, Java 5年以上"),
            "Java, Python"
        );
    }

    #[test]
    fn test_pairs_from_names_keeps_known_years() {
        let previous = vec![LanguagePair::new("Java", "3年"), LanguagePair::new("Go", "1年")];
        let pairs = pairs_from_names("Java, Rust, Java", &previous);
        assert_eq!(
            pairs,
            vec![LanguagePair::new("Java", "3年"), LanguagePair::new("Rust", "")]
        );
    }

    #[test]
    fn test_format_years() {
        assert_eq!(format_years(3, false), "3年");
        assert_eq!(format_years(5, true), "5年以上");
    }
}
