//! Axum route handlers for stateless posting extraction.

use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::extraction::{assess_text_quality, parse, QualityVerdict, TextQuality};
use crate::models::draft::ExtractedDraft;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ParsePostingRequest {
    pub raw_text: String,
}

#[derive(Debug, Serialize)]
pub struct ParsePostingResponse {
    pub draft: ExtractedDraft,
}

#[derive(Debug, Deserialize)]
pub struct PdfTextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PdfTextResponse {
    pub quality: TextQuality,
    pub draft: ExtractedDraft,
    pub warnings: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/postings/parse
///
/// Heuristic-only extraction of pasted posting text.
pub async fn handle_parse_posting(
    Json(request): Json<ParsePostingRequest>,
) -> Result<Json<ParsePostingResponse>, AppError> {
    if request.raw_text.trim().is_empty() {
        return Err(AppError::Validation("raw_text cannot be empty".to_string()));
    }

    Ok(Json(ParsePostingResponse {
        draft: parse(&request.raw_text),
    }))
}

/// POST /api/v1/postings/pdf-text
///
/// Text extracted from a PDF upstream. Garbled text is refused so the user
/// can paste the posting by hand; low-readability text proceeds with a warning.
pub async fn handle_pdf_text(
    Json(request): Json<PdfTextRequest>,
) -> Result<Json<PdfTextResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let quality = assess_text_quality(&request.text);
    let message = quality.message();
    if quality.verdict == QualityVerdict::Reject {
        warn!(
            weird_ratio = quality.weird_ratio,
            chars = quality.char_count,
            "pdf text rejected"
        );
        return Err(AppError::UnprocessableEntity(message.unwrap_or_default()));
    }

    Ok(Json(PdfTextResponse {
        draft: parse(&request.text),
        warnings: message.into_iter().collect(),
        quality,
    }))
}
