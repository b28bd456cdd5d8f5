//! Detects `{technology: years}` pairs in posting text.
//!
//! Two passes feed one accumulator keyed by canonical name:
//! 1. segment pass: split on list delimiters, find alias mentions in each
//!    segment, then look for adjacent years (after the name, in parens,
//!    after 経験, before the name);
//! 2. whole-text pass: case-sensitive `(lang, years)`, `(years, lang)` and
//!    `(lang 経験 years)` patterns catch what segmenting missed, including
//!    technologies missing from the alias table.
//!
//! A years-bearing value replaces a bare one for the same name, never the
//! reverse. Languages without years are still returned, with empty years.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::extraction::codec::format_years;
use crate::extraction::normalize::normalize;
use crate::models::draft::LanguagePair;

/// Canonical name → lowercase aliases.
const LANGUAGE_ALIASES: &[(&str, &[&str])] = &[
    ("JavaScript", &["javascript", "js", "node.js", "nodejs", "node"]),
    ("TypeScript", &["typescript", "ts"]),
    ("Java", &["java"]),
    ("Python", &["python", "python3"]),
    ("Go", &["go", "golang", "go言語"]),
    ("Ruby on Rails", &["ruby on rails", "rails", "ror"]),
    ("Ruby", &["ruby"]),
    ("PHP", &["php"]),
    ("C#", &["c#", "csharp"]),
    ("C++", &["c++", "cpp"]),
    ("C", &["c言語"]),
    ("Kotlin", &["kotlin"]),
    ("Swift", &["swift"]),
    ("Objective-C", &["objective-c", "objc"]),
    ("Scala", &["scala"]),
    ("Rust", &["rust"]),
    ("Perl", &["perl"]),
    ("Dart", &["dart"]),
    ("VB.NET", &["vb.net"]),
    ("VBA", &["vba"]),
    ("COBOL", &["cobol"]),
    ("SQL", &["sql"]),
    ("React", &["react", "react.js", "reactjs"]),
    ("Vue.js", &["vue", "vue.js", "vuejs"]),
    ("Angular", &["angular", "angularjs"]),
    ("Next.js", &["next.js", "nextjs"]),
    ("Spring Boot", &["spring boot", "springboot", "spring"]),
    ("Laravel", &["laravel"]),
    ("Django", &["django"]),
    ("Flutter", &["flutter"]),
];

/// Capitalized words the whole-text pass must not mistake for technologies.
const NON_TECH_WORDS: &[&str] = &["PC", "SE", "PG", "PM", "PL", "PMO", "IT", "OK", "NG", "Web"];

const MAX_YEARS: u32 = 50;

/// Aliases sorted longest first so "node.js" claims its span before "node".
static ALIAS_INDEX: Lazy<Vec<(&'static str, &'static str)>> = Lazy::new(|| {
    let mut index: Vec<(&str, &str)> = LANGUAGE_ALIASES
        .iter()
        .flat_map(|(canonical, aliases)| aliases.iter().map(move |alias| (*alias, *canonical)))
        .collect();
    index.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    index
});

static SEGMENT_DELIMITER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[,、\n・/;；]").unwrap());

// Segment pass, applied to the text right after a mention.
static AFTER_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:での|の)?\s*(?:開発|実務)?\s*[:：]?\s*(\d{1,2})\s*年(以上)?").unwrap()
});
static IN_PARENS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[（(]\s*(?:経験|実務)?\s*[:：]?\s*(\d{1,2})\s*年(以上)?").unwrap()
});
static AFTER_EXPERIENCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\D{0,12}?経験(?:年数)?\s*[:：]?\s*(\d{1,2})\s*年(以上)?").unwrap()
});
// Applied to the text right before a mention.
static BEFORE_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{1,2})\s*年(以上)?\s*(?:以上)?\s*(?:の)?\s*(?:実務)?\s*(?:経験)?\s*(?:の)?\s*$")
        .unwrap()
});

// Whole-text pass. (years, lang) needs a の connector; "3年 Kotlin" is too ambiguous.
static LANG_YEARS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z][A-Za-z0-9+#.]*)\s*[:：]?\s*[（(]?\s*(\d{1,2})\s*年(以上)?").unwrap()
});
static YEARS_LANG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(\d{1,2})\s*年(以上)?\s*(?:の)?\s*(?:実務)?\s*(?:経験)?\s*の\s*([A-Za-z][A-Za-z0-9+#.]*)",
    )
    .unwrap()
});
static LANG_EXPERIENCE_YEARS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([A-Za-z][A-Za-z0-9+#.]*)\s*(?:での|の)?\s*(?:開発|実務)?\s*経験\s*(?:年数)?\s*[:：]?\s*(\d{1,2})\s*年(以上)?",
    )
    .unwrap()
});

// ────────────────────────────────────────────────────────────────────────────
// Alias lookup
// ────────────────────────────────────────────────────────────────────────────

/// Resolves an alias ("node.js", "JS", "golang") to its canonical name.
pub fn canonical_language(name: &str) -> Option<&'static str> {
    let lowered = name.trim().to_lowercase();
    ALIAS_INDEX
        .iter()
        .find(|(alias, _)| *alias == lowered)
        .map(|(_, canonical)| *canonical)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '#' | '+')
}

#[derive(Debug)]
struct Mention {
    start: usize,
    end: usize,
    canonical: &'static str,
}

/// Alias mentions in a lowercased segment, ordered by position.
fn find_mentions(segment: &str) -> Vec<Mention> {
    let mut mentions: Vec<Mention> = Vec::new();
    for &(alias, canonical) in ALIAS_INDEX.iter() {
        for (start, _) in segment.match_indices(alias) {
            let end = start + alias.len();
            let clean_before = segment[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !is_name_char(c) && c != '.');
            let clean_after = segment[end..].chars().next().map_or(true, |c| !is_name_char(c));
            let overlaps = mentions.iter().any(|m| start < m.end && m.start < end);
            if clean_before && clean_after && !overlaps {
                mentions.push(Mention {
                    start,
                    end,
                    canonical,
                });
            }
        }
    }
    mentions.sort_by_key(|m| m.start);
    mentions
}

// ────────────────────────────────────────────────────────────────────────────
// Accumulator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct LanguageAccumulator {
    pairs: Vec<LanguagePair>,
}

impl LanguageAccumulator {
    /// Inserts a new name, or upgrades a bare entry with years.
    fn offer(&mut self, name: &str, years: Option<String>) {
        match self.pairs.iter_mut().find(|pair| pair.name == name) {
            Some(existing) => {
                if !existing.has_years() {
                    if let Some(years) = years {
                        existing.years = years;
                    }
                }
            }
            None => self
                .pairs
                .push(LanguagePair::new(name, years.unwrap_or_default())),
        }
    }
}

fn years_from(caps: &Captures, count_group: usize, or_more_group: usize) -> Option<String> {
    let count: u32 = caps.get(count_group)?.as_str().parse().ok()?;
    if count == 0 || count > MAX_YEARS {
        return None;
    }
    Some(format_years(count, caps.get(or_more_group).is_some()))
}

// ────────────────────────────────────────────────────────────────────────────
// Passes
// ────────────────────────────────────────────────────────────────────────────

fn segment_pass(text: &str, acc: &mut LanguageAccumulator) {
    let lowered = text.to_lowercase();
    for segment in SEGMENT_DELIMITER_RE.split(&lowered) {
        let mentions = find_mentions(segment);
        // Years already claimed by an earlier mention are not re-read as a
        // before-name prefix of the next one.
        let mut cursor = 0;
        for (i, mention) in mentions.iter().enumerate() {
            let window_end = mentions.get(i + 1).map_or(segment.len(), |next| next.start);
            let after = &segment[mention.end..window_end];

            let after_hit = [&*AFTER_LABEL_RE, &*IN_PARENS_RE, &*AFTER_EXPERIENCE_RE]
                .into_iter()
                .find_map(|re| {
                    let caps = re.captures(after)?;
                    let years = years_from(&caps, 1, 2)?;
                    Some((years, caps.get(0).map_or(0, |m| m.end())))
                });

            let years = match after_hit {
                Some((years, consumed)) => {
                    cursor = mention.end + consumed;
                    Some(years)
                }
                None => {
                    let before = &segment[cursor.min(mention.start)..mention.start];
                    cursor = mention.end;
                    BEFORE_NAME_RE
                        .captures(before)
                        .filter(|caps| {
                            caps.get(1)
                                .is_some_and(|count| !preceded_by_digit(before, count.start()))
                        })
                        .and_then(|caps| years_from(&caps, 1, 2))
                }
            };
            acc.offer(mention.canonical, years);
        }
    }
}

/// Multi-word alias ("spring boot", "ruby on rails") whose last word ends at
/// `end`; the name regex only ever captures that last word.
fn multi_word_alias_ending_at(text: &str, end: usize) -> Option<&'static str> {
    let head = text[..end].to_lowercase();
    ALIAS_INDEX
        .iter()
        .filter(|(alias, _)| alias.contains(' '))
        .find(|(alias, _)| head.ends_with(alias))
        .map(|(_, canonical)| *canonical)
}

/// Canonical name for a whole-text capture, or `None` for non-technology words.
fn resolve_captured_name(raw: &str) -> Option<String> {
    let name = raw.trim_end_matches('.');
    if let Some(canonical) = canonical_language(name) {
        return Some(canonical.to_string());
    }
    let starts_upper = name.chars().next().is_some_and(|c| c.is_ascii_uppercase());
    if !starts_upper || name.len() < 2 || NON_TECH_WORDS.contains(&name) {
        return None;
    }
    Some(name.to_string())
}

fn preceded_by_digit(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_digit())
}

fn whole_text_pass(text: &str, acc: &mut LanguageAccumulator) {
    // (regex, name group, years group, 以上 group)
    let patterns: [(&Regex, usize, usize, usize); 3] = [
        (&*LANG_YEARS_RE, 1, 2, 3),
        (&*YEARS_LANG_RE, 3, 1, 2),
        (&*LANG_EXPERIENCE_YEARS_RE, 1, 2, 3),
    ];
    for (re, name_group, years_group, or_more_group) in patterns {
        for caps in re.captures_iter(text) {
            let (Some(name), Some(count)) = (caps.get(name_group), caps.get(years_group)) else {
                continue;
            };
            if preceded_by_digit(text, count.start()) || preceded_by_name_char(text, name.start())
            {
                continue;
            }
            let resolved = multi_word_alias_ending_at(text, name.end())
                .map(str::to_string)
                .or_else(|| resolve_captured_name(name.as_str()));
            let Some(name) = resolved else {
                continue;
            };
            if let Some(years) = years_from(&caps, years_group, or_more_group) {
                acc.offer(&name, Some(years));
            }
        }
    }
}

fn preceded_by_name_char(text: &str, start: usize) -> bool {
    text[..start].chars().next_back().is_some_and(is_name_char)
}

/// Extracts technology/years pairs in first-seen order.
pub fn extract_language_years(text: &str) -> Vec<LanguagePair> {
    let text = normalize(text);
    let mut acc = LanguageAccumulator::default();
    segment_pass(&text, &mut acc);
    whole_text_pass(&text, &mut acc);
    debug!(count = acc.pairs.len(), "language years extracted");
    acc.pairs
}
