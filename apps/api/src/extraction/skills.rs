use once_cell::sync::Lazy;
use regex::Regex;

static SKILL_DELIMITER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[、，,・･•/／\n]").unwrap());

// Leading bullet / dash / numbering markers: "- ", "■", "1. ", "①"
static LEADING_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[\-ー−*＊■□◆◇●○◎▼▶►※]+|\d+[.)]|[①-⑳])\s*").unwrap()
});

static PARENTHETICAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[（(][^（()）]*[)）]").unwrap());

/// Splits a skill block into a deduplicated, order-preserving list.
///
/// Returns `None` when there is no block (absent or whitespace-only) and
/// `Some(vec![])` when a block exists but holds no usable items.
pub fn split_skills(block: Option<&str>) -> Option<Vec<String>> {
    let block = block?;
    if block.trim().is_empty() {
        return None;
    }

    let mut skills: Vec<String> = Vec::new();
    for raw in SKILL_DELIMITER_RE.split(block) {
        let item = LEADING_MARKER_RE.replace(raw.trim(), "");
        let item = PARENTHETICAL_RE.replace_all(&item, "");
        let item = item.trim();
        if item.is_empty() || skills.iter().any(|s| s == item) {
            continue;
        }
        skills.push(item.to_string());
    }
    Some(skills)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_dedupes_across_delimiters() {
        assert_eq!(
            split_skills(Some("React、React, Vue・Vue")),
            Some(vec!["React".to_string(), "Vue".to_string()])
        );
    }

    #[test]
    fn test_split_strips_bullets_and_parentheticals() {
        let block = "・Java（3年以上）\n- Spring Boot (実務)\n■ AWS\n1. Docker";
        assert_eq!(
            split_skills(Some(block)),
            Some(vec![
                "Java".to_string(),
                "Spring Boot".to_string(),
                "AWS".to_string(),
                "Docker".to_string(),
            ])
        );
    }

    #[test]
    fn test_split_slash_and_full_width_comma() {
        assert_eq!(
            split_skills(Some("Linux／Windows，MySQL")),
            Some(vec!["Linux".to_string(), "Windows".to_string(), "MySQL".to_string()])
        );
    }

    #[test]
    fn test_absent_or_blank_block_is_none() {
        assert_eq!(split_skills(None), None);
        assert_eq!(split_skills(Some("  \n ")), None);
    }

    #[test]
    fn test_block_with_only_delimiters_is_empty_list() {
        assert_eq!(split_skills(Some("、・ , /")), Some(vec![]));
    }
}
