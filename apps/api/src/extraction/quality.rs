//! Quality gate for text extracted from PDFs upstream.
//!
//! Broken font maps produce control characters, U+FFFD and private-use code
//! points. Short texts are held to a stricter weird-character bound because a
//! handful of garbage characters dominates them.

use serde::Serialize;

const SHORT_TEXT_CHARS: usize = 100;
const MAX_WEIRD_RATIO: f64 = 0.8;
const MAX_WEIRD_RATIO_SHORT: f64 = 0.3;
const MIN_READABLE_RATIO: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityVerdict {
    Accept,
    Warn,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextQuality {
    pub verdict: QualityVerdict,
    pub weird_ratio: f64,
    pub readable_ratio: f64,
    pub char_count: usize,
}

impl TextQuality {
    /// User-facing explanation for a warn/reject verdict.
    pub fn message(&self) -> Option<String> {
        match self.verdict {
            QualityVerdict::Accept => None,
            QualityVerdict::Warn => Some(format!(
                "抽出テキストの可読率が低いため、結果を確認してください (readable {:.0}%)",
                self.readable_ratio * 100.0
            )),
            QualityVerdict::Reject => Some(
                "PDFから正しくテキストを抽出できませんでした。本文を手入力してください".to_string(),
            ),
        }
    }
}

fn is_weird(c: char) -> bool {
    let private_use = matches!(c as u32, 0xE000..=0xF8FF | 0xF0000..=0xFFFFD | 0x100000..=0x10FFFD);
    (c.is_control() && !matches!(c, '\n' | '\r' | '\t')) || c == '\u{FFFD}' || private_use
}

fn is_readable(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || c.is_ascii_punctuation()
        || matches!(c,
            '\u{3040}'..='\u{309F}'   // hiragana
            | '\u{30A0}'..='\u{30FF}' // katakana
            | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
            | '\u{3000}'..='\u{303F}' // CJK punctuation
            | '\u{FF01}'..='\u{FF5E}' // full-width forms
        )
}

/// Scores extracted text. Empty text is rejected.
pub fn assess_text_quality(text: &str) -> TextQuality {
    let char_count = text.chars().count();
    if char_count == 0 {
        return TextQuality {
            verdict: QualityVerdict::Reject,
            weird_ratio: 0.0,
            readable_ratio: 0.0,
            char_count,
        };
    }

    let weird = text.chars().filter(|c| is_weird(*c)).count();
    let readable = text.chars().filter(|c| is_readable(*c)).count();
    let weird_ratio = weird as f64 / char_count as f64;
    let readable_ratio = readable as f64 / char_count as f64;

    let short = char_count < SHORT_TEXT_CHARS;
    let verdict = if weird_ratio > MAX_WEIRD_RATIO || (short && weird_ratio > MAX_WEIRD_RATIO_SHORT)
    {
        QualityVerdict::Reject
    } else if !short && readable_ratio < MIN_READABLE_RATIO {
        QualityVerdict::Warn
    } else {
        QualityVerdict::Accept
    };

    TextQuality {
        verdict,
        weird_ratio,
        readable_ratio,
        char_count,
    }
}
