//! Budget (万円) and payment-range (精算幅) extraction.
//!
//! Both extractors walk an ordered strategy list and stop at the first
//! strategy that yields a usable value. The order is the precedence rule.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::models::draft::BudgetRange;

const BUDGET_LINE_KEYWORDS: &[&str] = &["予算", "単価", "報酬"];
const PAYMENT_LINE_KEYWORD: &str = "精算";
const MONTHLY_HOURS: std::ops::RangeInclusive<u32> = 80..=259;
const YEN_PER_MAN: f64 = 10_000.0;

static MAN_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*(?:万円?)?\s*[~〜～\-－ー]\s*(\d+(?:\.\d+)?)\s*万").unwrap()
});
static YEN_RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d[\d,]*)\s*円\s*[~〜～\-－ー]\s*(\d[\d,]*)\s*円").unwrap());
static MAN_MAX_ONLY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[~〜～]\s*(\d+(?:\.\d+)?)\s*万").unwrap());
static MAN_SINGLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*万").unwrap());
static YEN_SINGLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d[\d,]*)\s*円").unwrap());

static CLOCK_RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{1,2}\s*:\s*\d{2}\s*[~〜～\-－ー]\s*\d{1,2}\s*:\s*\d{2}").unwrap()
});
static HOURS_BOTH_UNITS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{2,3})\s*(?:h|時間)\s*[~〜～\-－ー]\s*(\d{2,3})\s*(?:h|時間)").unwrap()
});
static HOURS_TAIL_UNIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d{2,3})\s*[~〜～\-－ー]\s*(\d{2,3})\s*(?:h|時間)").unwrap()
});
static HOURS_LABELLED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)精算(?:幅)?\s*[:：]?\s*(\d{2,3})\s*(?:h|時間)?\s*[~〜～\-－ー]\s*(\d{2,3})\s*(?:h|時間)?",
    )
    .unwrap()
});

// ────────────────────────────────────────────────────────────────────────────
// Budget
// ────────────────────────────────────────────────────────────────────────────

type BudgetStrategy = fn(&str) -> Option<BudgetRange>;

const BUDGET_STRATEGIES: &[(&str, BudgetStrategy)] = &[
    ("man_range", man_range),
    ("yen_range", yen_range),
    ("man_max_only", man_max_only),
    ("man_single", man_single),
    ("yen_single", yen_single),
];

fn parse_man(s: &str) -> Option<u32> {
    let value: f64 = s.parse().ok()?;
    let rounded = value.round();
    if rounded <= 0.0 || rounded > u32::MAX as f64 {
        return None;
    }
    Some(rounded as u32)
}

fn parse_yen_as_man(s: &str) -> Option<u32> {
    let yen: f64 = s.replace(',', "").parse().ok()?;
    let man = (yen / YEN_PER_MAN).round();
    if man <= 0.0 || man > u32::MAX as f64 {
        return None;
    }
    Some(man as u32)
}

fn man_range(window: &str) -> Option<BudgetRange> {
    let caps = MAN_RANGE_RE.captures(window)?;
    Some(BudgetRange {
        min: Some(parse_man(&caps[1])?),
        max: Some(parse_man(&caps[2])?),
    })
}

fn yen_range(window: &str) -> Option<BudgetRange> {
    let caps = YEN_RANGE_RE.captures(window)?;
    Some(BudgetRange {
        min: Some(parse_yen_as_man(&caps[1])?),
        max: Some(parse_yen_as_man(&caps[2])?),
    })
}

fn man_max_only(window: &str) -> Option<BudgetRange> {
    let caps = MAN_MAX_ONLY_RE.captures(window)?;
    Some(BudgetRange {
        min: None,
        max: Some(parse_man(&caps[1])?),
    })
}

fn man_single(window: &str) -> Option<BudgetRange> {
    let caps = MAN_SINGLE_RE.captures(window)?;
    Some(BudgetRange {
        min: Some(parse_man(&caps[1])?),
        max: None,
    })
}

fn yen_single(window: &str) -> Option<BudgetRange> {
    let caps = YEN_SINGLE_RE.captures(window)?;
    Some(BudgetRange {
        min: Some(parse_yen_as_man(&caps[1])?),
        max: None,
    })
}

/// Lines mentioning the budget, or the whole text when none do.
fn budget_window(text: &str) -> String {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| BUDGET_LINE_KEYWORDS.iter().any(|kw| line.contains(kw)))
        .collect();
    if lines.is_empty() {
        text.to_string()
    } else {
        lines.join("\n")
    }
}

/// Extracts the monthly budget in 万円. Zero-valued matches count as misses.
pub fn extract_budget(text: &str) -> Option<BudgetRange> {
    let window = budget_window(text);
    BUDGET_STRATEGIES.iter().find_map(|(name, strategy)| {
        let range = strategy(&window)?;
        debug!(strategy = name, ?range, "budget matched");
        Some(range)
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Payment range
// ────────────────────────────────────────────────────────────────────────────

static PAYMENT_RANGE_STRATEGIES: &[(&str, &Lazy<Regex>)] = &[
    ("hours_both_units", &HOURS_BOTH_UNITS_RE),
    ("hours_tail_unit", &HOURS_TAIL_UNIT_RE),
    ("hours_labelled", &HOURS_LABELLED_RE),
];

fn monthly_hour_band(re: &Regex, window: &str) -> Option<(u32, u32)> {
    re.captures_iter(window).find_map(|caps| {
        let low: u32 = caps[1].parse().ok()?;
        let high: u32 = caps[2].parse().ok()?;
        (MONTHLY_HOURS.contains(&low) && MONTHLY_HOURS.contains(&high)).then_some((low, high))
    })
}

/// Extracts the billing hour band (`"140h-180h"`) from 精算 lines.
/// Clock ranges such as `10:00~19:00` are removed before matching.
pub fn extract_payment_range(text: &str) -> Option<String> {
    let window = text
        .lines()
        .filter(|line| line.contains(PAYMENT_LINE_KEYWORD))
        .map(|line| CLOCK_RANGE_RE.replace_all(line, " ").into_owned())
        .collect::<Vec<_>>()
        .join("\n");
    if window.is_empty() {
        return None;
    }

    PAYMENT_RANGE_STRATEGIES.iter().find_map(|(name, re)| {
        let (low, high) = monthly_hour_band(re, &window)?;
        debug!(strategy = name, low, high, "payment range matched");
        Some(format!("{low}h-{high}h"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::normalize::normalize;

    fn budget(text: &str) -> Option<BudgetRange> {
        extract_budget(&normalize(text))
    }

    #[test]
    fn test_budget_man_range() {
        assert_eq!(
            budget("予算：80万〜120万円"),
            Some(BudgetRange { min: Some(80), max: Some(120) })
        );
    }

    #[test]
    fn test_budget_range_with_unit_only_on_upper_bound() {
        assert_eq!(
            budget("単価：60〜70万円（スキル見合い）"),
            Some(BudgetRange { min: Some(60), max: Some(70) })
        );
    }

    #[test]
    fn test_budget_full_width_digits() {
        assert_eq!(
            budget("月単価：６５万～７５万"),
            Some(BudgetRange { min: Some(65), max: Some(75) })
        );
    }

    #[test]
    fn test_budget_yen_range_is_converted() {
        assert_eq!(
            budget("報酬：650,000円〜749,999円"),
            Some(BudgetRange { min: Some(65), max: Some(75) })
        );
    }

    #[test]
    fn test_budget_max_only() {
        assert_eq!(budget("単価：〜90万"), Some(BudgetRange { min: None, max: Some(90) }));
    }

    #[test]
    fn test_budget_single_man_is_min() {
        assert_eq!(
            budget("単価：75万円（税別）"),
            Some(BudgetRange { min: Some(75), max: None })
        );
    }

    #[test]
    fn test_budget_single_yen() {
        assert_eq!(
            budget("報酬 800,000円"),
            Some(BudgetRange { min: Some(80), max: None })
        );
    }

    #[test]
    fn test_budget_window_ignores_other_lines() {
        let text = "社員数：1000万人規模のサービス\n単価：70万";
        assert_eq!(budget(text), Some(BudgetRange { min: Some(70), max: None }));
    }

    #[test]
    fn test_budget_falls_back_to_whole_text() {
        assert_eq!(
            budget("Java開発 50万〜60万 即日"),
            Some(BudgetRange { min: Some(50), max: Some(60) })
        );
    }

    #[test]
    fn test_budget_zero_is_not_found() {
        assert_eq!(budget("単価：0万"), None);
        assert_eq!(budget("単価：500円"), None);
    }

    #[test]
    fn test_budget_absent() {
        assert_eq!(budget("単価：スキル見合い"), None);
        assert_eq!(budget(""), None);
    }

    #[test]
    fn test_payment_range_skips_clock_range() {
        let text = normalize("勤務時間：10:00〜17:00、精算：140h〜180h");
        assert_eq!(extract_payment_range(&text).as_deref(), Some("140h-180h"));
    }

    #[test]
    fn test_payment_range_tail_unit() {
        let text = normalize("精算：140〜180h");
        assert_eq!(extract_payment_range(&text).as_deref(), Some("140h-180h"));
    }

    #[test]
    fn test_payment_range_labelled_without_units() {
        let text = normalize("精算幅：１４０－１８０");
        assert_eq!(extract_payment_range(&text).as_deref(), Some("140h-180h"));
    }

    #[test]
    fn test_payment_range_japanese_hour_unit() {
        let text = normalize("精算：160時間〜200時間");
        assert_eq!(extract_payment_range(&text).as_deref(), Some("160h-200h"));
    }

    #[test]
    fn test_payment_range_rejects_implausible_hours() {
        let text = normalize("精算：10h〜20h");
        assert_eq!(extract_payment_range(&text), None);
        let text = normalize("精算：300h〜400h");
        assert_eq!(extract_payment_range(&text), None);
    }

    #[test]
    fn test_payment_range_requires_seisan_line() {
        let text = normalize("稼働：140h〜180h");
        assert_eq!(extract_payment_range(&text), None);
    }

    #[test]
    fn test_payment_range_clock_only_line() {
        let text = normalize("精算あり 9:00〜18:00");
        assert_eq!(extract_payment_range(&text), None);
    }
}
