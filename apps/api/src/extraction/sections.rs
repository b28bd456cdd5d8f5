//! Heading-tolerant section slicing.
//!
//! A section is found either inline (`■業務内容：Java開発`) or as a block
//! (`【業務内容】` on its own line, followed by body lines up to the next known
//! heading). Headings may carry leading bullets, 【】/[] brackets and a colon.

use once_cell::sync::Lazy;
use regex::Regex;

// ────────────────────────────────────────────────────────────────────────────
// Label groups
// ────────────────────────────────────────────────────────────────────────────

pub const DESCRIPTION_LABELS: &[&str] = &["案件概要", "プロジェクト概要", "案件内容", "概要"];
pub const DUTIES_LABELS: &[&str] = &["業務内容", "作業内容", "仕事内容", "担当業務", "業務詳細"];
pub const BACKGROUND_LABELS: &[&str] = &["募集背景", "背景"];
pub const ENVIRONMENT_LABELS: &[&str] = &["開発環境", "技術環境", "使用技術", "環境"];
pub const NG_LABELS: &[&str] = &["NG条件", "NG事項", "不可条件", "NG"];
pub const MUST_SKILL_LABELS: &[&str] =
    &["必須スキル", "必須要件", "必須条件", "必須経験", "必須"];
pub const NICE_SKILL_LABELS: &[&str] =
    &["歓迎スキル", "尚可スキル", "歓迎要件", "歓迎条件", "尚可", "歓迎"];

pub const TITLE_LABELS: &[&str] = &["案件名", "件名", "タイトル"];
pub const BUDGET_LABELS: &[&str] = &["月単価", "単価", "予算", "報酬"];
pub const LOCATION_LABELS: &[&str] = &["勤務地", "就業場所", "作業場所", "最寄り駅", "最寄駅"];
pub const WORKING_HOURS_LABELS: &[&str] = &["勤務時間", "就業時間", "作業時間"];
pub const WORKING_DAYS_LABELS: &[&str] = &["勤務曜日", "勤務日", "稼働日"];
pub const ATTENDANCE_LABELS: &[&str] = &["出社頻度", "出社日数", "出社"];
pub const PAYMENT_TERMS_LABELS: &[&str] =
    &["支払いサイト", "支払サイト", "支払い条件", "支払条件"];
pub const PAYMENT_RANGE_LABELS: &[&str] = &["精算幅", "精算"];
pub const INTERVIEW_LABELS: &[&str] = &["面談回数", "面談"];
pub const AGE_LABELS: &[&str] = &["年齢制限", "年齢"];
pub const FOREIGNER_LABELS: &[&str] = &["外国籍", "外国人"];
pub const PC_LABELS: &[&str] = &["PC貸与", "貸与PC", "PC"];
pub const LANGUAGE_LABELS: &[&str] = &["使用言語", "言語"];

/// Headings that only end other sections; nothing is extracted from them.
const TERMINATOR_LABELS: &[&str] = &[
    "期間",
    "開始時期",
    "稼働開始",
    "募集人数",
    "人数",
    "商流",
    "契約形態",
    "勤務形態",
    "作業形態",
    "リモート",
    "備考",
];

const ALL_LABEL_GROUPS: &[&[&str]] = &[
    DESCRIPTION_LABELS,
    DUTIES_LABELS,
    BACKGROUND_LABELS,
    ENVIRONMENT_LABELS,
    NG_LABELS,
    MUST_SKILL_LABELS,
    NICE_SKILL_LABELS,
    TITLE_LABELS,
    BUDGET_LABELS,
    LOCATION_LABELS,
    WORKING_HOURS_LABELS,
    WORKING_DAYS_LABELS,
    ATTENDANCE_LABELS,
    PAYMENT_TERMS_LABELS,
    PAYMENT_RANGE_LABELS,
    INTERVIEW_LABELS,
    AGE_LABELS,
    FOREIGNER_LABELS,
    PC_LABELS,
    LANGUAGE_LABELS,
    TERMINATOR_LABELS,
];

const MARKERS: &str = r"(?:[■□◆◇●○◎▼▶►*＊・\-−]\s*)*";

// ────────────────────────────────────────────────────────────────────────────
// Pattern construction
// ────────────────────────────────────────────────────────────────────────────

/// Regex alternation of the labels, longest first so "必須スキル" beats "必須".
fn label_alternation<'a>(labels: impl IntoIterator<Item = &'a str>) -> String {
    let mut labels: Vec<&str> = labels.into_iter().collect();
    labels.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
    labels.dedup();
    labels
        .iter()
        .map(|label| regex::escape(label))
        .collect::<Vec<_>>()
        .join("|")
}

fn inline_pattern(alternation: &str) -> String {
    format!(
        r"^{MARKERS}(?:[【\[]\s*(?:{alternation})\s*[】\]]\s*[:：]?|(?:{alternation})\s*[:：])\s*([^:：\s].*?)\s*$"
    )
}

fn heading_pattern(alternation: &str) -> String {
    format!(r"^{MARKERS}[【\[]?\s*(?:{alternation})\s*[】\]]?\s*[:：]?\s*$")
}

static ANY_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = label_alternation(ALL_LABEL_GROUPS.iter().flat_map(|g| g.iter().copied()));
    Regex::new(&format!(
        r"^{MARKERS}(?:[【\[]\s*(?:{alternation})\s*[】\]]|(?:{alternation})\s*(?:[:：]|$))"
    ))
    .unwrap()
});

/// True when the line starts with any known heading (bracketed, or followed
/// by a colon or end of line).
pub fn is_known_heading(line: &str) -> bool {
    ANY_HEADING_RE.is_match(line.trim())
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Inline form only: the body trailing the first `label: body` line.
pub fn pick_inline(text: &str, labels: &[&str]) -> Option<String> {
    if labels.is_empty() {
        return None;
    }
    let re = Regex::new(&inline_pattern(&label_alternation(labels.iter().copied()))).ok()?;
    text.lines()
        .find_map(|line| re.captures(line.trim()))
        .map(|caps| caps[1].to_string())
}

/// Block form only: body lines under the first heading-only line, up to the
/// next known heading.
pub fn pick_block(text: &str, labels: &[&str]) -> Option<String> {
    if labels.is_empty() {
        return None;
    }
    let re = Regex::new(&heading_pattern(&label_alternation(labels.iter().copied()))).ok()?;
    let mut lines = text.lines();
    lines.by_ref().find(|line| re.is_match(line.trim()))?;

    let body: Vec<&str> = lines
        .take_while(|line| !is_known_heading(line))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if body.is_empty() {
        None
    } else {
        Some(body.join("\n"))
    }
}

/// Extracts the section labelled by any of `labels`. An inline match always
/// wins over a block match.
pub fn pick_section(text: &str, labels: &[&str]) -> Option<String> {
    pick_inline(text, labels).or_else(|| pick_block(text, labels))
}

/// Single-line value lookup: the inline body, else the first line of the block.
pub fn pick_value(text: &str, labels: &[&str]) -> Option<String> {
    pick_inline(text, labels).or_else(|| {
        pick_block(text, labels).and_then(|block| block.lines().next().map(str::to_string))
    })
}
